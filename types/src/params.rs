//! Deployment constants for the validator-set manager.
//!
//! These are fixed when a manager is constructed. Nothing in the workspace can
//! change them afterwards.

use crate::{Address, Amount};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One whole unit of value expressed in raw units.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Basis-point denominator (10000 = 100%).
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Every constant the lifecycle and governance rules consult.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorParams {
    // ── Staking ──────────────────────────────────────────────────────────
    /// Exact value a validator must bond to join. Default: 100_000 units.
    #[serde(with = "crate::amount::decimal")]
    pub stake_amount: Amount,

    /// Floor on the active set. Exits and removals never go below it.
    pub min_validators: u32,

    /// Ceiling on the active set. Joins are refused at this size.
    pub max_validators: u32,

    /// Seconds between leaving the active set and being able to withdraw.
    /// Default: 7 days.
    pub withdrawal_delay_secs: u64,

    /// Seconds after withdrawal before the signer identity may join again.
    /// Default: 1 day.
    pub signer_cooldown_secs: u64,

    // ── Governance ───────────────────────────────────────────────────────
    /// Seconds a validator must have been active before it may propose.
    /// Default: 1 day.
    pub governance_warmup_secs: u64,

    /// Exact bond attached to every proposal. Default: 1_000 units.
    #[serde(with = "crate::amount::decimal")]
    pub proposal_bond: Amount,

    /// Voting window in seconds, measured from proposal creation. Default: 7 days.
    pub proposal_expiry_secs: u64,

    /// Maximum number of unresolved proposals at any time.
    pub max_active_proposals: u32,

    /// Snapshot quorum in basis points (9000 = 90%).
    pub governance_bps: u32,

    /// Fraction of the stake destroyed by a slash, in basis points (50 = 0.5%).
    pub slash_bps: u32,

    /// Destination of every burn.
    pub burn_address: Address,
}

impl ValidatorParams {
    /// The canonical deployment.
    pub fn mainnet_defaults() -> Self {
        Self {
            stake_amount: 100_000 * UNIT,
            min_validators: 4,
            max_validators: 100,
            withdrawal_delay_secs: 7 * 24 * 3600, // 1 week
            signer_cooldown_secs: 24 * 3600,      // 1 day

            governance_warmup_secs: 24 * 3600,     // 1 day
            proposal_bond: 1_000 * UNIT,
            proposal_expiry_secs: 7 * 24 * 3600,   // 1 week
            max_active_proposals: 20,
            governance_bps: 9000,                  // 90%
            slash_bps: 50,                         // 0.5%
            burn_address: Address::from_low_u64(0xdead),
        }
    }

    /// Amount destroyed by one slash: `stake * slash_bps / 10000`, floored.
    ///
    /// Split into quotient and remainder so the product never overflows.
    pub fn slash_amount(&self) -> Amount {
        let bps = self.slash_bps as u128;
        let whole = (self.stake_amount / BPS_DENOMINATOR).saturating_mul(bps);
        let part = self.stake_amount % BPS_DENOMINATOR * bps / BPS_DENOMINATOR;
        whole.saturating_add(part)
    }

    /// Whether `votes` out of a snapshot of `snapshot` validators meets quorum.
    pub fn quorum_reached(&self, votes: u32, snapshot: u32) -> bool {
        votes as u128 * BPS_DENOMINATOR >= snapshot as u128 * self.governance_bps as u128
    }

    /// Reject constant sets that would make the state machine incoherent.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.stake_amount == 0 {
            return Err(ParamsError::ZeroStake);
        }
        if self.proposal_bond == 0 {
            return Err(ParamsError::ZeroBond);
        }
        if self.min_validators == 0 {
            return Err(ParamsError::ZeroMinimum);
        }
        if self.min_validators > self.max_validators {
            return Err(ParamsError::BoundsInverted {
                min: self.min_validators,
                max: self.max_validators,
            });
        }
        // Aggregate genesis deposits and basis-point products must fit an Amount.
        if self
            .stake_amount
            .checked_mul(self.max_validators as u128)
            .and_then(|_| self.stake_amount.checked_mul(BPS_DENOMINATOR))
            .is_none()
        {
            return Err(ParamsError::StakeTooLarge {
                stake: self.stake_amount,
            });
        }
        if self.governance_bps == 0 || self.governance_bps as u128 > BPS_DENOMINATOR {
            return Err(ParamsError::BpsOutOfRange {
                name: "governance_bps",
                value: self.governance_bps,
            });
        }
        if self.slash_bps as u128 > BPS_DENOMINATOR {
            return Err(ParamsError::BpsOutOfRange {
                name: "slash_bps",
                value: self.slash_bps,
            });
        }
        if self.burn_address.is_zero() {
            return Err(ParamsError::ZeroBurnAddress);
        }
        Ok(())
    }
}

impl Default for ValidatorParams {
    fn default() -> Self {
        Self::mainnet_defaults()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("stake amount must be non-zero")]
    ZeroStake,

    #[error("proposal bond must be non-zero")]
    ZeroBond,

    #[error("minimum validator count must be at least 1")]
    ZeroMinimum,

    #[error("minimum validators ({min}) exceeds maximum ({max})")]
    BoundsInverted { min: u32, max: u32 },

    #[error("stake amount {stake} overflows aggregate deposits")]
    StakeTooLarge { stake: Amount },

    #[error("{name} out of range: {value}")]
    BpsOutOfRange { name: &'static str, value: u32 },

    #[error("burn address must not be the null identity")]
    ZeroBurnAddress,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(ValidatorParams::default().validate(), Ok(()));
    }

    #[test]
    fn slash_amount_floors() {
        let params = ValidatorParams {
            stake_amount: 1_999,
            slash_bps: 50,
            ..ValidatorParams::default()
        };
        // 1999 * 50 / 10000 = 9.995
        assert_eq!(params.slash_amount(), 9);
    }

    #[test]
    fn slash_amount_near_overflow_is_exact() {
        let params = ValidatorParams {
            stake_amount: u128::MAX / BPS_DENOMINATOR + 1,
            slash_bps: 50,
            ..ValidatorParams::default()
        };
        // 50 / 10000 is exactly 1 / 200.
        assert_eq!(params.slash_amount(), params.stake_amount / 200);
        assert_eq!(
            params.validate(),
            Err(ParamsError::StakeTooLarge {
                stake: params.stake_amount
            })
        );
    }

    #[test]
    fn stake_overflowing_full_set_rejected() {
        let params = ValidatorParams {
            stake_amount: 1 << 126,
            max_validators: 5,
            ..ValidatorParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::StakeTooLarge { stake: 1 << 126 })
        );

        let largest = ValidatorParams {
            stake_amount: u128::MAX / BPS_DENOMINATOR,
            max_validators: 100,
            ..ValidatorParams::default()
        };
        assert_eq!(largest.validate(), Ok(()));
    }

    #[test]
    fn quorum_is_ninety_percent_of_snapshot() {
        let params = ValidatorParams::default();
        assert!(!params.quorum_reached(8, 10));
        assert!(params.quorum_reached(9, 10));
        // 90% of 4 is 3.6, so all four are needed.
        assert!(!params.quorum_reached(3, 4));
        assert!(params.quorum_reached(4, 4));
    }

    #[test]
    fn inverted_bounds_rejected() {
        let params = ValidatorParams {
            min_validators: 10,
            max_validators: 5,
            ..ValidatorParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ParamsError::BoundsInverted { min: 10, max: 5 })
        );
    }

    #[test]
    fn defaults_roundtrip_through_toml() {
        let params = ValidatorParams::default();
        let text = toml::to_string(&params).unwrap();
        assert_eq!(toml::from_str::<ValidatorParams>(&text).unwrap(), params);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let params: ValidatorParams = toml::from_str("min_validators = 2").unwrap();
        assert_eq!(params.min_validators, 2);
        assert_eq!(params.governance_bps, 9000);
    }
}
