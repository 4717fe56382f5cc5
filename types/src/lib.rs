//! Fundamental types for the validator-set manager.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! identities, timestamps and the clock seam, and deployment constants.

pub mod address;
pub mod amount;
pub mod params;
pub mod time;

pub use address::{Address, AddressParseError};
pub use params::{ParamsError, ValidatorParams, BPS_DENOMINATOR, UNIT};
pub use time::{Clock, SystemClock, Timestamp};

/// Raw value amount. All stake, bond, and burn arithmetic is integer.
pub type Amount = u128;

/// Monotonic 1-based proposal identifier.
pub type ProposalId = u64;
