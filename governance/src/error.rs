use thiserror::Error;
use valset_types::{Address, Amount, ProposalId, Timestamp};
use valset_validators::ValidatorError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GovernanceError {
    #[error("unknown proposal type {0}")]
    InvalidKind(u8),

    #[error("{0} is not an active validator")]
    NotActive(Address),

    #[error("governance warmup active until {until}")]
    WarmupActive { until: Timestamp },

    #[error("wrong bond: expected {expected}, got {provided}")]
    WrongBond { expected: Amount, provided: Amount },

    #[error("too many active proposals (max {max})")]
    TooManyProposals { max: u32 },

    #[error("removal proposals need a target")]
    MissingTarget,

    #[error("target {0} is not an active validator")]
    TargetNotActive(Address),

    #[error("target {target} already has pending removal proposal {proposal}")]
    RemovalPending { target: Address, proposal: ProposalId },

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("proposal {0} is already resolved")]
    AlreadyExecuted(ProposalId),

    #[error("voting on proposal {0} has closed")]
    VotingClosed(ProposalId),

    #[error("voter joined at {joined_at}, after the proposal snapshot at {start}")]
    JoinedAfterSnapshot { joined_at: Timestamp, start: Timestamp },

    #[error("{0} has already voted on this proposal")]
    AlreadyVoted(Address),

    #[error("proposal has not expired yet (voting open until {voting_ends})")]
    NotExpired { voting_ends: Timestamp },

    #[error("no bond to claim")]
    NothingToClaim,

    #[error("bond transfer of {amount} failed")]
    TransferFailed { amount: Amount },

    #[error("stake invariant violated for {target}: expected {expected}, found {actual}")]
    StakeInvariant {
        target: Address,
        expected: Amount,
        actual: Amount,
    },

    #[error("validator error: {0}")]
    Validator(#[from] ValidatorError),
}
