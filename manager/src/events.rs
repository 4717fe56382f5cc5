//! Events emitted by accepted write operations.

use valset_governance::ProposalKind;
use valset_types::{Address, Amount, ProposalId, Timestamp};

/// One observable state change. Appended in the order the changes happened
/// within a call, and drained with `ValidatorManager::take_events`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagerEvent {
    Joined {
        signer: Address,
        staker: Address,
    },
    ExitRequested {
        signer: Address,
        available_at: Timestamp,
    },
    Withdrawn {
        signer: Address,
        staker: Address,
        amount: Amount,
    },
    Proposed {
        id: ProposalId,
        kind: ProposalKind,
        proposer: Address,
        target: Option<Address>,
    },
    Voted {
        id: ProposalId,
        voter: Address,
        votes: u32,
    },
    ProposalExecuted {
        id: ProposalId,
        success: bool,
    },
    ProposalExpired {
        id: ProposalId,
        bond_forfeited: Amount,
    },
    Pruned {
        target: Address,
    },
    Slashed {
        target: Address,
        amount: Amount,
        burned: bool,
    },
    BondClaimed {
        claimant: Address,
        amount: Amount,
    },
}
