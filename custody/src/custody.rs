//! The custody capability consumed by the manager.

use valset_types::{Address, Amount};

/// Holds the manager's value and performs transfers on its behalf.
pub trait ValueCustody {
    /// Accept value that arrived attached to an accepted call.
    fn deposit(&mut self, from: &Address, amount: Amount);

    /// Move `amount` out of custody to `to`.
    ///
    /// Returns `false` on failure and never panics; the caller decides whether the
    /// failure is fatal.
    fn transfer(&mut self, to: &Address, amount: Amount) -> bool;
}
