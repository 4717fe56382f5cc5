//! Validator-set governance.
//!
//! Active validators propose changes to the set and vote on them:
//! - **Rule** (1): informational; the payload hash is interpreted off-chain.
//! - **Prune** (2): non-punitive forced exit of a target validator.
//! - **Slash** (3): forced exit that also burns part of the target's stake.
//!
//! Key principles:
//! - Quorum is fixed to the registry size when the proposal is created
//!   (snapshot quorum); validators that join later cannot vote on it.
//! - Every proposal is bonded. A proposal that passes and takes effect refunds
//!   the bond as a claimable credit; anything else burns it.
//! - A proposal resolves exactly once, either by the vote that crosses quorum or
//!   by finalization after expiry.

pub mod bonds;
pub mod enforcement;
pub mod engine;
pub mod error;
pub mod proposal;

pub use bonds::BondBook;
pub use enforcement::{Enforcement, Enforcer};
pub use engine::{Execution, GovernanceEngine, VoteOutcome};
pub use error::GovernanceError;
pub use proposal::{Proposal, ProposalKind, ProposalOutcome, ProposalRecord, RuleHash};
