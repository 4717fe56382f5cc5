//! Nullable custody: an in-memory value holder with injectable failures.

use std::collections::{HashMap, HashSet};
use valset_custody::ValueCustody;
use valset_types::{Address, Amount};

/// Tracks value held on behalf of the manager and everything paid out.
///
/// A transfer fails when the recipient has been marked failing or when custody
/// holds less than the requested amount.
#[derive(Debug, Default)]
pub struct NullCustody {
    held: Amount,
    received: HashMap<Address, Amount>,
    deposits: HashMap<Address, Amount>,
    failing: HashSet<Address>,
    transfers: Vec<(Address, Amount)>,
}

impl NullCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out already holding `amount`.
    pub fn with_balance(amount: Amount) -> Self {
        Self {
            held: amount,
            ..Self::default()
        }
    }

    /// Make every transfer to `to` fail until re-allowed.
    pub fn fail_transfers_to(&mut self, to: Address) {
        self.failing.insert(to);
    }

    pub fn allow_transfers_to(&mut self, to: Address) {
        self.failing.remove(&to);
    }

    /// Value currently in custody.
    pub fn held(&self) -> Amount {
        self.held
    }

    /// Total successfully paid out to `to`.
    pub fn received(&self, to: &Address) -> Amount {
        self.received.get(to).copied().unwrap_or(0)
    }

    /// Total deposited by `from`.
    pub fn deposited(&self, from: &Address) -> Amount {
        self.deposits.get(from).copied().unwrap_or(0)
    }

    /// Successful transfers, in order.
    pub fn transfers(&self) -> &[(Address, Amount)] {
        &self.transfers
    }
}

impl ValueCustody for NullCustody {
    fn deposit(&mut self, from: &Address, amount: Amount) {
        self.held += amount;
        *self.deposits.entry(*from).or_default() += amount;
    }

    fn transfer(&mut self, to: &Address, amount: Amount) -> bool {
        if self.failing.contains(to) || self.held < amount {
            return false;
        }
        self.held -= amount;
        *self.received.entry(*to).or_default() += amount;
        self.transfers.push((*to, amount));
        true
    }
}
