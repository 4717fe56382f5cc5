//! Validator lifecycle for a permissioned proof-of-stake network.
//!
//! A signer identity moves `None → Active → Leaving → None`:
//! - **Join**: a staker bonds exactly the fixed stake for a signer.
//! - **Exit**: the signer leaves the active set (voluntarily, or by prune/slash).
//! - **Withdraw**: after the withdrawal delay the staker reclaims the stake, and
//!   the signer identity is locked out for the signer cooldown.
//!
//! The staker (cold key, custody rights) and the signer (hot key, consensus and
//! votes) are separate identities. One staker may own many signers.
//!
//! The active set lives in a [`ValidatorRegistry`] whose size is kept within
//! `[min_validators, max_validators]` by every transition.

pub mod error;
pub mod lifecycle;
pub mod record;
pub mod registry;

pub use error::ValidatorError;
pub use lifecycle::ValidatorSet;
pub use record::{ValidatorRecord, ValidatorState};
pub use registry::ValidatorRegistry;
