//! Lifecycle errors. One variant per guard.

use thiserror::Error;
use valset_types::{Address, Amount, Timestamp};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("wrong stake value: expected {expected}, got {provided}")]
    InsufficientStake { expected: Amount, provided: Amount },

    #[error("null identity is not allowed")]
    ZeroIdentity,

    #[error("signer {0} is already registered")]
    DuplicateSigner(Address),

    #[error("signer cooldown active until {until}")]
    CooldownActive { until: Timestamp },

    #[error("validator set is full ({max})")]
    RegistryFull { max: u32 },

    #[error("caller is not the staker of signer {0}")]
    NotStaker(Address),

    #[error("signer {0} is not an active validator")]
    NotActive(Address),

    #[error("signer {0} is not leaving")]
    NotLeaving(Address),

    #[error("withdrawal locked until {until}")]
    WithdrawalLocked { until: Timestamp },

    #[error("validator set would drop below the minimum ({min})")]
    BelowMinimum { min: u32 },

    #[error("stake transfer of {amount} failed")]
    TransferFailed { amount: Amount },

    #[error("genesis needs between {min} and {max} validators, got {count}")]
    GenesisSize { count: usize, min: u32, max: u32 },

    #[error("aggregate stake for {count} validators overflows")]
    StakeOverflow { count: usize },

    #[error("genesis signer and staker lists differ in length ({signers} vs {stakers})")]
    GenesisLengthMismatch { signers: usize, stakers: usize },

    #[error("inconsistent validator state: {0}")]
    Corrupt(String),
}
