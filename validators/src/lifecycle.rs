//! The validator state machine.
//!
//! | From    | Event       | To      |
//! |---------|-------------|---------|
//! | None    | join        | Active  |
//! | Active  | exit        | Leaving |
//! | Active  | prune/slash | Leaving |
//! | Leaving | withdraw    | None    |
//!
//! Every operation checks all of its guards before touching state, so a rejected
//! call leaves the set unchanged. `withdraw` is the one operation that talks to
//! custody; it applies its effects first and restores the previous record if the
//! transfer fails.

use crate::error::ValidatorError;
use crate::record::{ValidatorRecord, ValidatorState};
use crate::registry::ValidatorRegistry;
use std::collections::{HashMap, HashSet};
use valset_custody::ValueCustody;
use valset_types::{Address, Amount, Timestamp, ValidatorParams};
use valset_utils::format_duration;

/// Validator records plus the active registry, governed by fixed parameters.
#[derive(Clone, Debug)]
pub struct ValidatorSet {
    params: ValidatorParams,
    registry: ValidatorRegistry,
    records: HashMap<Address, ValidatorRecord>,
}

impl ValidatorSet {
    /// Bootstrap the initial validator set from parallel signer/staker lists.
    ///
    /// `value` is the aggregate deposit and must equal `len × stake` exactly. Either
    /// every validator is created or the call fails with nothing built.
    pub fn genesis(
        params: ValidatorParams,
        signers: &[Address],
        stakers: &[Address],
        value: Amount,
        now: Timestamp,
    ) -> Result<Self, ValidatorError> {
        if signers.len() != stakers.len() {
            return Err(ValidatorError::GenesisLengthMismatch {
                signers: signers.len(),
                stakers: stakers.len(),
            });
        }
        let count = signers.len();
        if count < params.min_validators as usize || count > params.max_validators as usize {
            return Err(ValidatorError::GenesisSize {
                count,
                min: params.min_validators,
                max: params.max_validators,
            });
        }
        let expected = params
            .stake_amount
            .checked_mul(count as u128)
            .ok_or(ValidatorError::StakeOverflow { count })?;
        if value != expected {
            return Err(ValidatorError::InsufficientStake {
                expected,
                provided: value,
            });
        }

        let mut seen = HashSet::with_capacity(count);
        for (signer, staker) in signers.iter().zip(stakers) {
            if signer.is_zero() || staker.is_zero() {
                return Err(ValidatorError::ZeroIdentity);
            }
            if !seen.insert(*signer) {
                return Err(ValidatorError::DuplicateSigner(*signer));
            }
        }

        let mut set = Self {
            registry: ValidatorRegistry::new(),
            records: HashMap::with_capacity(count),
            params,
        };
        for (signer, staker) in signers.iter().zip(stakers) {
            set.activate(*signer, *staker, now);
        }
        tracing::info!(validators = count, at = %now, "genesis validator set created");
        Ok(set)
    }

    /// Rebuild a set from persisted parts.
    ///
    /// Checks that the registry and the record states agree and that every staker
    /// binding is coherent. Stake balances are taken as stored.
    pub fn restore(
        params: ValidatorParams,
        members: Vec<Address>,
        records: HashMap<Address, ValidatorRecord>,
    ) -> Result<Self, ValidatorError> {
        let registry = ValidatorRegistry::from_members(members)
            .ok_or_else(|| ValidatorError::Corrupt("duplicate registry member".into()))?;
        for (signer, record) in &records {
            if record.is_active() != registry.contains(signer) {
                return Err(ValidatorError::Corrupt(format!(
                    "{signer} is {:?} but registry membership is {}",
                    record.state,
                    registry.contains(signer)
                )));
            }
            if !record.binding_consistent() {
                return Err(ValidatorError::Corrupt(format!(
                    "{signer} has staker binding inconsistent with {:?}",
                    record.state
                )));
            }
        }
        if let Some(missing) = registry.list().iter().find(|s| !records.contains_key(s)) {
            return Err(ValidatorError::Corrupt(format!(
                "registry member {missing} has no record"
            )));
        }
        Ok(Self {
            params,
            registry,
            records,
        })
    }

    pub fn params(&self) -> &ValidatorParams {
        &self.params
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    /// Current active signers, in registry order.
    pub fn validators(&self) -> &[Address] {
        self.registry.list()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn record(&self, signer: &Address) -> Option<&ValidatorRecord> {
        self.records.get(signer)
    }

    pub fn records(&self) -> impl Iterator<Item = (&Address, &ValidatorRecord)> {
        self.records.iter()
    }

    pub fn state(&self, signer: &Address) -> ValidatorState {
        self.records
            .get(signer)
            .map(|r| r.state)
            .unwrap_or_default()
    }

    pub fn is_active(&self, signer: &Address) -> bool {
        self.registry.contains(signer)
    }

    /// Signers currently bonded by `staker`, sorted.
    pub fn signers_of(&self, staker: &Address) -> Vec<Address> {
        let mut signers: Vec<Address> = self
            .records
            .iter()
            .filter(|(_, r)| r.staker.as_ref() == Some(staker))
            .map(|(s, _)| *s)
            .collect();
        signers.sort();
        signers
    }

    /// Bond `signer` on behalf of `staker` with exactly the fixed stake.
    pub fn join(
        &mut self,
        signer: Address,
        staker: Address,
        value: Amount,
        now: Timestamp,
    ) -> Result<(), ValidatorError> {
        if signer.is_zero() || staker.is_zero() {
            return Err(ValidatorError::ZeroIdentity);
        }
        if value != self.params.stake_amount {
            return Err(ValidatorError::InsufficientStake {
                expected: self.params.stake_amount,
                provided: value,
            });
        }
        let (state, cooldown) = self
            .records
            .get(&signer)
            .map(|r| (r.state, r.signer_cooldown))
            .unwrap_or_default();
        if state != ValidatorState::None {
            return Err(ValidatorError::DuplicateSigner(signer));
        }
        if now < cooldown {
            return Err(ValidatorError::CooldownActive { until: cooldown });
        }
        if self.registry.len() >= self.params.max_validators as usize {
            return Err(ValidatorError::RegistryFull {
                max: self.params.max_validators,
            });
        }

        self.activate(signer, staker, now);
        tracing::info!(%signer, %staker, size = self.registry.len(), "validator joined");
        Ok(())
    }

    /// Voluntary exit. `caller` must be the active signer itself.
    ///
    /// Returns the instant the stake becomes withdrawable.
    pub fn request_exit(
        &mut self,
        caller: Address,
        now: Timestamp,
    ) -> Result<Timestamp, ValidatorError> {
        self.ensure_removable(&caller)?;
        let available_at = self.deactivate(caller, now)?;
        tracing::info!(
            signer = %caller,
            delay = %format_duration(self.params.withdrawal_delay_secs),
            "validator exit requested"
        );
        Ok(available_at)
    }

    /// Check whether `signer` could leave the active set right now.
    pub fn ensure_removable(&self, signer: &Address) -> Result<(), ValidatorError> {
        if !self.registry.contains(signer) {
            return Err(ValidatorError::NotActive(*signer));
        }
        if self.registry.len() <= self.params.min_validators as usize {
            return Err(ValidatorError::BelowMinimum {
                min: self.params.min_validators,
            });
        }
        Ok(())
    }

    /// Governance-driven removal without a penalty.
    pub fn force_exit(
        &mut self,
        signer: Address,
        now: Timestamp,
    ) -> Result<Timestamp, ValidatorError> {
        self.ensure_removable(&signer)?;
        self.deactivate(signer, now)
    }

    /// Governance-driven removal that first deducts `amount` from the stake.
    ///
    /// The caller is responsible for burning the deducted value.
    pub fn slash(
        &mut self,
        signer: Address,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Timestamp, ValidatorError> {
        self.ensure_removable(&signer)?;
        let record = self
            .records
            .get(&signer)
            .ok_or(ValidatorError::NotActive(signer))?;
        let remaining = record.stake_balance.checked_sub(amount).ok_or_else(|| {
            ValidatorError::Corrupt(format!(
                "slash of {amount} exceeds stake {} of {signer}",
                record.stake_balance
            ))
        })?;
        let total_slashed = record.total_slashed.saturating_add(amount);

        let available_at = self.deactivate(signer, now)?;
        if let Some(record) = self.records.get_mut(&signer) {
            record.stake_balance = remaining;
            record.total_slashed = total_slashed;
        }
        Ok(available_at)
    }

    /// Return a leaving signer's stake to its staker.
    ///
    /// The record is reset before the transfer. If custody reports failure the
    /// previous record is put back and the signer stays Leaving, free to retry.
    pub fn withdraw(
        &mut self,
        signer: Address,
        caller: Address,
        now: Timestamp,
        custody: &mut dyn ValueCustody,
    ) -> Result<Amount, ValidatorError> {
        let record = self
            .records
            .get_mut(&signer)
            .filter(|r| r.state == ValidatorState::Leaving)
            .ok_or(ValidatorError::NotLeaving(signer))?;
        if record.staker != Some(caller) {
            return Err(ValidatorError::NotStaker(signer));
        }
        if now < record.withdrawal_available_at {
            return Err(ValidatorError::WithdrawalLocked {
                until: record.withdrawal_available_at,
            });
        }

        let previous = record.clone();
        let amount = record.stake_balance;
        record.stake_balance = 0;
        record.staker = None;
        record.state = ValidatorState::None;
        record.signer_cooldown = now.plus(self.params.signer_cooldown_secs);

        if !custody.transfer(&caller, amount) {
            self.records.insert(signer, previous);
            tracing::warn!(%signer, staker = %caller, amount, "stake withdrawal transfer failed");
            return Err(ValidatorError::TransferFailed { amount });
        }

        tracing::info!(%signer, staker = %caller, amount, "stake withdrawn");
        Ok(amount)
    }

    fn activate(&mut self, signer: Address, staker: Address, now: Timestamp) {
        let record = self.records.entry(signer).or_default();
        record.state = ValidatorState::Active;
        record.staker = Some(staker);
        record.stake_balance = self.params.stake_amount;
        record.joined_at = now;
        record.withdrawal_available_at = Timestamp::EPOCH;
        self.registry.add(signer);
    }

    fn deactivate(&mut self, signer: Address, now: Timestamp) -> Result<Timestamp, ValidatorError> {
        let record = self
            .records
            .get_mut(&signer)
            .ok_or(ValidatorError::NotActive(signer))?;
        let available_at = now.plus(self.params.withdrawal_delay_secs);
        record.state = ValidatorState::Leaving;
        record.withdrawal_available_at = available_at;
        self.registry.remove(&signer);
        Ok(available_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valset_nullables::NullCustody;

    const STAKE: Amount = 1_000;

    fn params() -> ValidatorParams {
        ValidatorParams {
            stake_amount: STAKE,
            min_validators: 4,
            max_validators: 6,
            withdrawal_delay_secs: 100,
            signer_cooldown_secs: 50,
            ..ValidatorParams::default()
        }
    }

    fn signer(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn staker(n: u64) -> Address {
        Address::from_low_u64(1_000 + n)
    }

    fn genesis_set(count: u64) -> ValidatorSet {
        let signers: Vec<_> = (1..=count).map(signer).collect();
        let stakers: Vec<_> = (1..=count).map(staker).collect();
        ValidatorSet::genesis(
            params(),
            &signers,
            &stakers,
            STAKE * count as u128,
            Timestamp::new(10),
        )
        .unwrap()
    }

    #[test]
    fn genesis_binds_every_signer() {
        let set = genesis_set(4);
        assert_eq!(set.len(), 4);
        for n in 1..=4 {
            let record = set.record(&signer(n)).unwrap();
            assert_eq!(record.state, ValidatorState::Active);
            assert_eq!(record.staker, Some(staker(n)));
            assert_eq!(record.stake_balance, STAKE);
            assert_eq!(record.joined_at, Timestamp::new(10));
        }
    }

    #[test]
    fn genesis_short_value_rejected() {
        let signers: Vec<_> = (1..=4).map(signer).collect();
        let stakers: Vec<_> = (1..=4).map(staker).collect();
        let err = ValidatorSet::genesis(params(), &signers, &stakers, 4 * STAKE - 1, Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(
            err,
            ValidatorError::InsufficientStake {
                expected: 4 * STAKE,
                provided: 4 * STAKE - 1
            }
        );
    }

    #[test]
    fn genesis_overflowing_total_rejected() {
        let params = ValidatorParams {
            stake_amount: 1 << 126,
            min_validators: 4,
            max_validators: 6,
            ..ValidatorParams::default()
        };
        let signers: Vec<_> = (1..=5).map(signer).collect();
        let stakers: Vec<_> = (1..=5).map(staker).collect();
        let err = ValidatorSet::genesis(params, &signers, &stakers, u128::MAX, Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(err, ValidatorError::StakeOverflow { count: 5 });
    }

    #[test]
    fn genesis_duplicate_signer_rejected() {
        let signers = vec![signer(1), signer(2), signer(3), signer(1)];
        let stakers: Vec<_> = (1..=4).map(staker).collect();
        let err = ValidatorSet::genesis(params(), &signers, &stakers, 4 * STAKE, Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(err, ValidatorError::DuplicateSigner(signer(1)));
    }

    #[test]
    fn genesis_size_bounds_enforced() {
        let signers: Vec<_> = (1..=3).map(signer).collect();
        let stakers: Vec<_> = (1..=3).map(staker).collect();
        let err = ValidatorSet::genesis(params(), &signers, &stakers, 3 * STAKE, Timestamp::EPOCH)
            .unwrap_err();
        assert!(matches!(err, ValidatorError::GenesisSize { count: 3, .. }));
    }

    #[test]
    fn genesis_zero_identity_rejected() {
        let signers = vec![signer(1), signer(2), signer(3), signer(4)];
        let stakers = vec![staker(1), Address::ZERO, staker(3), staker(4)];
        let err = ValidatorSet::genesis(params(), &signers, &stakers, 4 * STAKE, Timestamp::EPOCH)
            .unwrap_err();
        assert_eq!(err, ValidatorError::ZeroIdentity);
    }

    #[test]
    fn join_requires_exact_stake() {
        let mut set = genesis_set(4);
        let err = set
            .join(signer(9), staker(9), STAKE + 1, Timestamp::new(20))
            .unwrap_err();
        assert!(matches!(err, ValidatorError::InsufficientStake { .. }));
        assert_eq!(set.state(&signer(9)), ValidatorState::None);
    }

    #[test]
    fn join_refused_when_full() {
        let mut set = genesis_set(6);
        let err = set
            .join(signer(9), staker(9), STAKE, Timestamp::new(20))
            .unwrap_err();
        assert_eq!(err, ValidatorError::RegistryFull { max: 6 });
    }

    #[test]
    fn join_twice_is_duplicate() {
        let mut set = genesis_set(4);
        set.join(signer(9), staker(9), STAKE, Timestamp::new(20)).unwrap();
        let err = set
            .join(signer(9), staker(9), STAKE, Timestamp::new(21))
            .unwrap_err();
        assert_eq!(err, ValidatorError::DuplicateSigner(signer(9)));
    }

    #[test]
    fn one_staker_many_signers() {
        let mut set = genesis_set(4);
        set.join(signer(8), staker(0), STAKE, Timestamp::new(20)).unwrap();
        set.join(signer(9), staker(0), STAKE, Timestamp::new(20)).unwrap();
        assert_eq!(set.signers_of(&staker(0)), vec![signer(8), signer(9)]);
    }

    #[test]
    fn exit_blocked_at_minimum() {
        let mut set = genesis_set(5);
        let available = set.request_exit(signer(1), Timestamp::new(20)).unwrap();
        assert_eq!(available, Timestamp::new(120));
        assert_eq!(set.len(), 4);
        assert_eq!(set.state(&signer(1)), ValidatorState::Leaving);

        let err = set.request_exit(signer(2), Timestamp::new(21)).unwrap_err();
        assert_eq!(err, ValidatorError::BelowMinimum { min: 4 });
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn exit_by_non_validator_rejected() {
        let mut set = genesis_set(5);
        let err = set.request_exit(staker(1), Timestamp::new(20)).unwrap_err();
        assert_eq!(err, ValidatorError::NotActive(staker(1)));
    }

    #[test]
    fn withdraw_round_trip_returns_stake_and_sets_cooldown() {
        let mut set = genesis_set(5);
        let mut custody = NullCustody::with_balance(5 * STAKE);
        set.request_exit(signer(1), Timestamp::new(20)).unwrap();

        let err = set
            .withdraw(signer(1), staker(1), Timestamp::new(119), &mut custody)
            .unwrap_err();
        assert_eq!(err, ValidatorError::WithdrawalLocked { until: Timestamp::new(120) });

        let amount = set
            .withdraw(signer(1), staker(1), Timestamp::new(120), &mut custody)
            .unwrap();
        assert_eq!(amount, STAKE);
        assert_eq!(custody.received(&staker(1)), STAKE);

        let record = set.record(&signer(1)).unwrap();
        assert_eq!(record.state, ValidatorState::None);
        assert_eq!(record.staker, None);
        assert_eq!(record.stake_balance, 0);
        assert_eq!(record.signer_cooldown, Timestamp::new(170));
    }

    #[test]
    fn withdraw_by_signer_is_not_staker() {
        let mut set = genesis_set(5);
        let mut custody = NullCustody::with_balance(5 * STAKE);
        set.request_exit(signer(1), Timestamp::new(20)).unwrap();
        let err = set
            .withdraw(signer(1), signer(1), Timestamp::new(200), &mut custody)
            .unwrap_err();
        assert_eq!(err, ValidatorError::NotStaker(signer(1)));
    }

    #[test]
    fn withdraw_of_active_signer_is_not_leaving() {
        let mut set = genesis_set(5);
        let mut custody = NullCustody::with_balance(5 * STAKE);
        let err = set
            .withdraw(signer(1), staker(1), Timestamp::new(200), &mut custody)
            .unwrap_err();
        assert_eq!(err, ValidatorError::NotLeaving(signer(1)));
    }

    #[test]
    fn failed_withdraw_transfer_restores_record() {
        let mut set = genesis_set(5);
        let mut custody = NullCustody::with_balance(5 * STAKE);
        custody.fail_transfers_to(staker(1));
        set.request_exit(signer(1), Timestamp::new(20)).unwrap();
        let before = set.record(&signer(1)).cloned();

        let err = set
            .withdraw(signer(1), staker(1), Timestamp::new(200), &mut custody)
            .unwrap_err();
        assert_eq!(err, ValidatorError::TransferFailed { amount: STAKE });
        assert_eq!(set.record(&signer(1)).cloned(), before);

        custody.allow_transfers_to(staker(1));
        assert_eq!(
            set.withdraw(signer(1), staker(1), Timestamp::new(201), &mut custody),
            Ok(STAKE)
        );
    }

    #[test]
    fn rejoin_waits_for_cooldown() {
        let mut set = genesis_set(5);
        let mut custody = NullCustody::with_balance(5 * STAKE);
        set.request_exit(signer(1), Timestamp::new(20)).unwrap();
        set.withdraw(signer(1), staker(1), Timestamp::new(120), &mut custody)
            .unwrap();

        let err = set
            .join(signer(1), staker(7), STAKE, Timestamp::new(169))
            .unwrap_err();
        assert_eq!(err, ValidatorError::CooldownActive { until: Timestamp::new(170) });

        set.join(signer(1), staker(7), STAKE, Timestamp::new(170)).unwrap();
        assert_eq!(set.record(&signer(1)).unwrap().staker, Some(staker(7)));
    }

    #[test]
    fn slash_deducts_and_accumulates() {
        let mut set = genesis_set(5);
        set.slash(signer(2), 5, Timestamp::new(30)).unwrap();
        let record = set.record(&signer(2)).unwrap();
        assert_eq!(record.state, ValidatorState::Leaving);
        assert_eq!(record.stake_balance, STAKE - 5);
        assert_eq!(record.total_slashed, 5);
        assert!(!set.is_active(&signer(2)));
    }

    #[test]
    fn force_exit_respects_minimum() {
        let mut set = genesis_set(4);
        assert_eq!(
            set.force_exit(signer(1), Timestamp::new(30)),
            Err(ValidatorError::BelowMinimum { min: 4 })
        );
        assert_eq!(set.state(&signer(1)), ValidatorState::Active);
    }

    #[test]
    fn restore_rejects_registry_state_mismatch() {
        let set = genesis_set(4);
        let records: HashMap<_, _> = set.records().map(|(a, r)| (*a, r.clone())).collect();
        let members = vec![signer(1), signer(2), signer(3)];
        let err = ValidatorSet::restore(params(), members, records).unwrap_err();
        assert!(matches!(err, ValidatorError::Corrupt(_)));
    }

    #[test]
    fn binding_invariant_holds_across_lifecycle() {
        let mut set = genesis_set(5);
        let mut custody = NullCustody::with_balance(5 * STAKE);
        set.request_exit(signer(3), Timestamp::new(20)).unwrap();
        set.withdraw(signer(3), staker(3), Timestamp::new(500), &mut custody)
            .unwrap();
        set.join(signer(9), staker(9), STAKE, Timestamp::new(501)).unwrap();
        for (_, record) in set.records() {
            assert!(record.binding_consistent());
        }
    }
}
