//! Value custody: the only path by which the manager moves value.
//!
//! The manager never holds balances itself. Inbound value attached to a call is
//! handed to a [`ValueCustody`] implementation once the call is accepted, and every
//! outbound movement (stake withdrawal, bond refund, burn) is a `transfer` whose
//! success must be checked by the caller.
//!
//! Two failure disciplines exist and must not be unified:
//! - withdrawals treat a failed transfer as fatal to the enclosing call;
//! - burns are best-effort and only go through [`BurnLedger`], which absorbs
//!   failures and counts only what was actually destroyed.

pub mod burn;
pub mod custody;

pub use burn::BurnLedger;
pub use custody::ValueCustody;
