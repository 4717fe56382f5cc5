//! Prune and slash: the two effectful outcomes of a passed proposal.
//!
//! Neither action ever takes the active set below its minimum, and neither
//! touches a target that is no longer active. In both cases the action is
//! refused rather than failed: the proposal still resolves and its bond is
//! burned.

use crate::GovernanceError;
use valset_custody::{BurnLedger, ValueCustody};
use valset_types::{Address, Amount, Timestamp};
use valset_validators::ValidatorSet;

/// What an executed proposal did to the validator set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Enforcement {
    /// Rule proposals have no on-chain effect.
    None,
    /// Target moved to Leaving.
    Pruned { target: Address },
    /// Target moved to Leaving and `amount` was deducted. `burned` is whether the
    /// best-effort burn of that amount went through.
    Slashed {
        target: Address,
        amount: Amount,
        burned: bool,
    },
    /// The action was not applied.
    Refused { target: Address },
}

impl Enforcement {
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::Refused { .. })
    }
}

/// Mutable handles the enforcement actions need for the duration of one call.
pub struct Enforcer<'a> {
    pub validators: &'a mut ValidatorSet,
    pub burns: &'a mut BurnLedger,
    pub custody: &'a mut dyn ValueCustody,
}

impl<'a> Enforcer<'a> {
    pub fn new(
        validators: &'a mut ValidatorSet,
        burns: &'a mut BurnLedger,
        custody: &'a mut dyn ValueCustody,
    ) -> Self {
        Self {
            validators,
            burns,
            custody,
        }
    }

    /// Remove `target` from the active set without penalty.
    pub fn prune(&mut self, target: Address, now: Timestamp) -> Result<Enforcement, GovernanceError> {
        if let Some(refused) = self.refusal(target) {
            return Ok(refused);
        }
        self.validators.force_exit(target, now)?;
        tracing::info!(%target, size = self.validators.len(), "validator pruned");
        Ok(Enforcement::Pruned { target })
    }

    /// Remove `target` and burn `stake × slash_bps / 10000` of its stake.
    ///
    /// An active validator's balance always equals the fixed stake. If it does
    /// not, the state is corrupt and the call aborts with `StakeInvariant` before
    /// anything is changed.
    pub fn slash(&mut self, target: Address, now: Timestamp) -> Result<Enforcement, GovernanceError> {
        if let Some(refused) = self.refusal(target) {
            return Ok(refused);
        }
        let expected = self.validators.params().stake_amount;
        let actual = self
            .validators
            .record(&target)
            .map(|r| r.stake_balance)
            .unwrap_or(0);
        if actual != expected {
            tracing::error!(%target, expected, actual, "stake invariant violated; aborting slash");
            return Err(GovernanceError::StakeInvariant {
                target,
                expected,
                actual,
            });
        }

        let amount = self.validators.params().slash_amount();
        self.validators.slash(target, amount, now)?;
        let burned = self.burns.burn(&mut *self.custody, amount);
        tracing::info!(%target, amount, burned, size = self.validators.len(), "validator slashed");
        Ok(Enforcement::Slashed {
            target,
            amount,
            burned,
        })
    }

    fn refusal(&self, target: Address) -> Option<Enforcement> {
        match self.validators.ensure_removable(&target) {
            Ok(()) => None,
            Err(reason) => {
                tracing::warn!(%target, %reason, "enforcement refused");
                Some(Enforcement::Refused { target })
            }
        }
    }
}
