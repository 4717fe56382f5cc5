use thiserror::Error;
use valset_types::{Amount, ParamsError};

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("validator error: {0}")]
    Validator(#[from] valset_validators::ValidatorError),

    #[error("governance error: {0}")]
    Governance(#[from] valset_governance::GovernanceError),

    #[error("store error: {0}")]
    Store(#[from] valset_store::StoreError),

    #[error("operation takes no value, got {provided}")]
    UnexpectedValue { provided: Amount },

    #[error("re-entrant call rejected")]
    Reentrant,

    #[error("config error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for ManagerError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
