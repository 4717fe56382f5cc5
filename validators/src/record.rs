//! Per-signer validator state.

use serde::{Deserialize, Serialize};
use valset_types::{Address, Amount, Timestamp};

/// Where a signer is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidatorState {
    /// Not bonded. The signer identity may join once its cooldown has elapsed.
    #[default]
    None,
    /// In the registry, signing blocks and voting.
    Active,
    /// Out of the registry, stake locked until `withdrawal_available_at`.
    Leaving,
}

/// Everything the manager knows about one signer identity.
///
/// Records outlive a bonding cycle: after withdrawal the state returns to `None`
/// but `signer_cooldown` and `total_slashed` are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub state: ValidatorState,
    /// Owning identity. Set iff `state != None`.
    pub staker: Option<Address>,
    /// Bonded value. Equal to the fixed stake while Active; reduced only by a slash.
    pub stake_balance: Amount,
    pub joined_at: Timestamp,
    /// Meaningful only while Leaving.
    pub withdrawal_available_at: Timestamp,
    /// The signer may not join again before this instant.
    pub signer_cooldown: Timestamp,
    /// Cumulative amount slashed over the identity's lifetime.
    pub total_slashed: Amount,
}

impl ValidatorRecord {
    pub fn is_active(&self) -> bool {
        self.state == ValidatorState::Active
    }

    /// `staker` is set exactly when the signer is bonded.
    pub fn binding_consistent(&self) -> bool {
        self.staker.is_some() == (self.state != ValidatorState::None)
    }
}
