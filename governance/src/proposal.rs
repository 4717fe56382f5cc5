//! Governance proposals.

use crate::GovernanceError;
use serde::{Deserialize, Serialize};
use valset_types::{Address, Amount, ProposalId, Timestamp};

/// Opaque 32-byte payload of a rule proposal. Never interpreted here.
pub type RuleHash = [u8; 32];

/// What a proposal does when it passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalKind {
    /// Informational rule change; always succeeds.
    Rule = 1,
    /// Remove the target from the active set.
    Prune = 2,
    /// Remove the target and burn part of its stake.
    Slash = 3,
}

impl ProposalKind {
    /// Whether this kind removes a target validator.
    pub fn is_removal(&self) -> bool {
        !matches!(self, Self::Rule)
    }
}

impl TryFrom<u8> for ProposalKind {
    type Error = GovernanceError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(Self::Rule),
            2 => Ok(Self::Prune),
            3 => Ok(Self::Slash),
            other => Err(GovernanceError::InvalidKind(other)),
        }
    }
}

/// How a proposal was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalOutcome {
    /// Reached quorum. `success` is whether the enforcement took effect.
    Passed { success: bool },
    /// Finalized after the voting window closed without quorum.
    Expired,
}

/// A proposal. Immutable after creation except for `votes`, `executed` and `outcome`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// 1-based, assigned in creation order.
    pub id: ProposalId,
    pub kind: ProposalKind,
    /// Set only for removal kinds.
    pub target: Option<Address>,
    pub start_time: Timestamp,
    /// Unique active voters so far.
    pub votes: u32,
    /// Registry size when the proposal was created. Quorum is measured against this.
    pub snapshot_validator_count: u32,
    /// Terminal flag. Set exactly once, never cleared.
    pub executed: bool,
    /// Set only for rule proposals.
    pub rule_hash: Option<RuleHash>,
    /// Owed the bond refund if the proposal passes and takes effect.
    pub proposer: Address,
    pub outcome: Option<ProposalOutcome>,
}

impl Proposal {
    /// Last instant at which votes are accepted.
    pub fn voting_ends(&self, expiry_secs: u64) -> Timestamp {
        self.start_time.plus(expiry_secs)
    }

    /// Whether votes are still accepted at `now`.
    pub fn is_open(&self, expiry_secs: u64, now: Timestamp) -> bool {
        !self.executed && now <= self.voting_ends(expiry_secs)
    }
}

/// A proposal together with its voter list and escrowed bond, as persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub proposal: Proposal,
    pub voters: Vec<Address>,
    /// Bond still in escrow. Zero once the proposal is resolved.
    pub escrowed_bond: Amount,
}
