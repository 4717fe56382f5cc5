//! The validator-set manager: the public read/write surface.
//!
//! Every write reads the clock once, checks all guards, mutates, and only then
//! takes custody of any attached value. A rejected call therefore changes
//! nothing and keeps no value. Operations that pay value out hold the
//! [`CallLock`] for their whole body.

use crate::config::ManagerConfig;
use crate::events::ManagerEvent;
use crate::lock::CallLock;
use crate::ManagerError;
use valset_custody::{BurnLedger, ValueCustody};
use valset_governance::{
    Enforcement, Enforcer, GovernanceEngine, Proposal, ProposalKind, RuleHash, VoteOutcome,
};
use valset_types::{Address, Amount, Clock, ProposalId, Timestamp, ValidatorParams};
use valset_validators::{ValidatorRecord, ValidatorSet, ValidatorState};

pub struct ValidatorManager<C: ValueCustody, K: Clock> {
    pub(crate) validators: ValidatorSet,
    pub(crate) governance: GovernanceEngine,
    pub(crate) burns: BurnLedger,
    pub(crate) custody: C,
    pub(crate) clock: K,
    pub(crate) lock: CallLock,
    pub(crate) events: Vec<ManagerEvent>,
}

impl<C: ValueCustody, K: Clock> ValidatorManager<C, K> {
    /// Deploy a manager with its initial validator set.
    ///
    /// `value` is the aggregate stake attached by `deployer` and must equal
    /// `signers.len() × stake` exactly. Nothing is built and no value is taken
    /// if any check fails.
    pub fn genesis(
        params: ValidatorParams,
        signers: &[Address],
        stakers: &[Address],
        deployer: Address,
        value: Amount,
        mut custody: C,
        clock: K,
    ) -> Result<Self, ManagerError> {
        params.validate()?;
        let now = clock.now();
        let burns = BurnLedger::new(params.burn_address);
        let validators = ValidatorSet::genesis(params, signers, stakers, value, now)?;
        custody.deposit(&deployer, value);

        let events = signers
            .iter()
            .zip(stakers)
            .map(|(signer, staker)| ManagerEvent::Joined {
                signer: *signer,
                staker: *staker,
            })
            .collect();
        Ok(Self {
            validators,
            governance: GovernanceEngine::new(),
            burns,
            custody,
            clock,
            lock: CallLock::new(),
            events,
        })
    }

    /// Deploy from a loaded configuration.
    pub fn from_config(
        config: &ManagerConfig,
        deployer: Address,
        value: Amount,
        custody: C,
        clock: K,
    ) -> Result<Self, ManagerError> {
        Self::genesis(
            config.params.clone(),
            &config.genesis_signers(),
            &config.genesis_stakers(),
            deployer,
            value,
            custody,
            clock,
        )
    }

    // ── Writes ───────────────────────────────────────────────────────────

    /// Bond `signer` with the caller as its staker. Attach exactly the stake.
    pub fn join_request(
        &mut self,
        caller: Address,
        signer: Address,
        value: Amount,
    ) -> Result<(), ManagerError> {
        let now = self.clock.now();
        self.validators.join(signer, caller, value, now)?;
        self.custody.deposit(&caller, value);
        self.events.push(ManagerEvent::Joined {
            signer,
            staker: caller,
        });
        Ok(())
    }

    /// Leave the active set. The caller is the signer. Returns when the stake unlocks.
    pub fn request_exit(&mut self, caller: Address, value: Amount) -> Result<Timestamp, ManagerError> {
        no_value(value)?;
        let now = self.clock.now();
        let available_at = self.validators.request_exit(caller, now)?;
        self.events.push(ManagerEvent::ExitRequested {
            signer: caller,
            available_at,
        });
        Ok(available_at)
    }

    /// Return a leaving signer's stake to its staker, who must be the caller.
    pub fn withdraw_stake(
        &mut self,
        caller: Address,
        signer: Address,
        value: Amount,
    ) -> Result<Amount, ManagerError> {
        no_value(value)?;
        let _guard = self.lock.acquire()?;
        let now = self.clock.now();
        let amount = self
            .validators
            .withdraw(signer, caller, now, &mut self.custody)?;
        self.events.push(ManagerEvent::Withdrawn {
            signer,
            staker: caller,
            amount,
        });
        Ok(amount)
    }

    /// Open a proposal. `kind` is the raw type code (1 rule, 2 prune, 3 slash).
    /// Attach exactly the bond.
    pub fn propose(
        &mut self,
        caller: Address,
        kind: u8,
        target: Option<Address>,
        rule_hash: RuleHash,
        value: Amount,
    ) -> Result<ProposalId, ManagerError> {
        let kind = ProposalKind::try_from(kind)?;
        let now = self.clock.now();
        let id = self.governance.propose(
            &self.validators,
            caller,
            kind,
            target,
            rule_hash,
            value,
            now,
        )?;
        self.custody.deposit(&caller, value);
        let target = self.governance.proposal(id).and_then(|p| p.target);
        self.events.push(ManagerEvent::Proposed {
            id,
            kind,
            proposer: caller,
            target,
        });
        Ok(id)
    }

    /// Vote for proposal `id`. Executes the proposal if this vote reaches quorum.
    pub fn vote(
        &mut self,
        caller: Address,
        id: ProposalId,
        value: Amount,
    ) -> Result<VoteOutcome, ManagerError> {
        no_value(value)?;
        let now = self.clock.now();
        let mut enforcer = Enforcer::new(&mut self.validators, &mut self.burns, &mut self.custody);
        let outcome = self.governance.vote(&mut enforcer, caller, id, now)?;

        self.events.push(ManagerEvent::Voted {
            id,
            voter: caller,
            votes: outcome.votes,
        });
        if let Some(execution) = outcome.execution {
            match execution.enforcement {
                Enforcement::Pruned { target } => {
                    self.events.push(ManagerEvent::Pruned { target });
                }
                Enforcement::Slashed {
                    target,
                    amount,
                    burned,
                } => {
                    self.events.push(ManagerEvent::Slashed {
                        target,
                        amount,
                        burned,
                    });
                }
                Enforcement::None | Enforcement::Refused { .. } => {}
            }
            self.events.push(ManagerEvent::ProposalExecuted {
                id,
                success: execution.success,
            });
        }
        Ok(outcome)
    }

    /// Forfeit the bond of a proposal whose voting window has closed. Anyone may call.
    pub fn finalize_expired(
        &mut self,
        id: ProposalId,
        value: Amount,
    ) -> Result<Amount, ManagerError> {
        no_value(value)?;
        let now = self.clock.now();
        let forfeited = self.governance.finalize_expired(
            self.validators.params(),
            id,
            now,
            &mut self.burns,
            &mut self.custody,
        )?;
        self.events.push(ManagerEvent::ProposalExpired {
            id,
            bond_forfeited: forfeited,
        });
        Ok(forfeited)
    }

    /// Pay out the caller's refunded bonds.
    pub fn claim_bond(&mut self, caller: Address, value: Amount) -> Result<Amount, ManagerError> {
        no_value(value)?;
        let _guard = self.lock.acquire()?;
        let amount = self.governance.claim_bond(caller, &mut self.custody)?;
        self.events.push(ManagerEvent::BondClaimed {
            claimant: caller,
            amount,
        });
        Ok(amount)
    }

    /// Drain the event log.
    pub fn take_events(&mut self) -> Vec<ManagerEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Reads ────────────────────────────────────────────────────────────

    /// Current active signers, for the consensus client.
    pub fn validators(&self) -> &[Address] {
        self.validators.validators()
    }

    pub fn validator(&self, signer: &Address) -> Option<&ValidatorRecord> {
        self.validators.record(signer)
    }

    pub fn validator_state(&self, signer: &Address) -> ValidatorState {
        self.validators.state(signer)
    }

    pub fn is_active(&self, signer: &Address) -> bool {
        self.validators.is_active(signer)
    }

    pub fn staker_of(&self, signer: &Address) -> Option<Address> {
        self.validator(signer).and_then(|r| r.staker)
    }

    pub fn stake_balance(&self, signer: &Address) -> Amount {
        self.validator(signer).map(|r| r.stake_balance).unwrap_or(0)
    }

    pub fn joined_at(&self, signer: &Address) -> Timestamp {
        self.validator(signer).map(|r| r.joined_at).unwrap_or_default()
    }

    pub fn withdrawal_available_at(&self, signer: &Address) -> Timestamp {
        self.validator(signer)
            .map(|r| r.withdrawal_available_at)
            .unwrap_or_default()
    }

    pub fn signer_cooldown(&self, signer: &Address) -> Timestamp {
        self.validator(signer)
            .map(|r| r.signer_cooldown)
            .unwrap_or_default()
    }

    pub fn total_slashed(&self, signer: &Address) -> Amount {
        self.validator(signer).map(|r| r.total_slashed).unwrap_or(0)
    }

    /// Every signer currently bound to `staker`, sorted.
    pub fn signers_of(&self, staker: &Address) -> Vec<Address> {
        self.validators.signers_of(staker)
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.governance.proposal(id)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.governance.has_voted(id, voter)
    }

    pub fn pending_removal(&self, target: &Address) -> Option<ProposalId> {
        self.governance.pending_removal(target)
    }

    pub fn claimable(&self, who: &Address) -> Amount {
        self.governance.claimable(who)
    }

    pub fn proposal_count(&self) -> u64 {
        self.governance.proposal_count()
    }

    pub fn active_proposal_count(&self) -> usize {
        self.governance.active_proposal_count()
    }

    pub fn total_burned(&self) -> Amount {
        self.burns.total_burned()
    }

    pub fn params(&self) -> &ValidatorParams {
        self.validators.params()
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    pub fn clock(&self) -> &K {
        &self.clock
    }
}

fn no_value(value: Amount) -> Result<(), ManagerError> {
    if value != 0 {
        return Err(ManagerError::UnexpectedValue { provided: value });
    }
    Ok(())
}
