//! Core governance engine: proposal creation, snapshot voting, execution, expiry.
//!
//! A proposal resolves exactly once. The vote that crosses quorum executes it in
//! the same call; otherwise anyone may finalize it after the voting window. Both
//! paths check and set `executed`, so whichever comes first wins and the other
//! is rejected without effect.
//!
//! The set of unresolved proposals is tracked as a set of ids rather than a
//! counter, so resolving twice cannot underflow anything.

use crate::bonds::BondBook;
use crate::enforcement::{Enforcement, Enforcer};
use crate::error::GovernanceError;
use crate::proposal::{Proposal, ProposalKind, ProposalOutcome, ProposalRecord, RuleHash};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use valset_custody::{BurnLedger, ValueCustody};
use valset_types::{Address, Amount, ProposalId, Timestamp, ValidatorParams};
use valset_validators::ValidatorSet;

/// Result of an accepted vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    pub votes: u32,
    /// Present when this vote carried the proposal to quorum.
    pub execution: Option<Execution>,
}

/// What happened when a proposal executed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Execution {
    pub enforcement: Enforcement,
    pub success: bool,
    pub bond: Amount,
    /// `true` if the bond went to the proposer's claimable balance, `false` if it was burned.
    pub bond_refunded: bool,
}

#[derive(Clone, Debug, Default)]
pub struct GovernanceEngine {
    proposals: BTreeMap<ProposalId, Proposal>,
    voters: HashMap<ProposalId, HashSet<Address>>,
    /// Unresolved proposal ids.
    open: BTreeSet<ProposalId>,
    /// Removal target → the one unresolved proposal against it.
    removal_locks: HashMap<Address, ProposalId>,
    bonds: BondBook,
    proposal_count: u64,
}

impl GovernanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an engine from persisted proposals.
    ///
    /// The open set and the removal locks are derived from the proposals
    /// themselves, so they cannot disagree with them.
    pub fn restore(
        records: Vec<ProposalRecord>,
        claimable: HashMap<Address, Amount>,
        proposal_count: u64,
    ) -> Self {
        let mut engine = Self {
            proposal_count,
            ..Self::default()
        };
        let mut escrow = HashMap::new();
        for record in records {
            let proposal = record.proposal;
            let id = proposal.id;
            if !proposal.executed {
                engine.open.insert(id);
                escrow.insert(id, record.escrowed_bond);
                if let (true, Some(target)) = (proposal.kind.is_removal(), proposal.target) {
                    engine.removal_locks.insert(target, id);
                }
            }
            engine.voters.insert(id, record.voters.into_iter().collect());
            engine.proposal_count = engine.proposal_count.max(id);
            engine.proposals.insert(id, proposal);
        }
        engine.bonds = BondBook::restore(escrow, claimable);
        engine
    }

    /// Open a bonded proposal on behalf of an active validator.
    ///
    /// `target` is required for prune and slash and ignored for rules; `rule_hash`
    /// is kept only for rules. The proposal snapshots the registry size now.
    #[allow(clippy::too_many_arguments)]
    pub fn propose(
        &mut self,
        validators: &ValidatorSet,
        proposer: Address,
        kind: ProposalKind,
        target: Option<Address>,
        rule_hash: RuleHash,
        bond: Amount,
        now: Timestamp,
    ) -> Result<ProposalId, GovernanceError> {
        let params = validators.params();
        let record = validators
            .record(&proposer)
            .filter(|r| r.is_active())
            .ok_or(GovernanceError::NotActive(proposer))?;
        let warm_at = record.joined_at.plus(params.governance_warmup_secs);
        if now < warm_at {
            return Err(GovernanceError::WarmupActive { until: warm_at });
        }
        if bond != params.proposal_bond {
            return Err(GovernanceError::WrongBond {
                expected: params.proposal_bond,
                provided: bond,
            });
        }
        if self.open.len() >= params.max_active_proposals as usize {
            return Err(GovernanceError::TooManyProposals {
                max: params.max_active_proposals,
            });
        }

        let target = if kind.is_removal() {
            let target = target
                .filter(|t| !t.is_zero())
                .ok_or(GovernanceError::MissingTarget)?;
            if !validators.is_active(&target) {
                return Err(GovernanceError::TargetNotActive(target));
            }
            if let Some(&pending) = self.removal_locks.get(&target) {
                return Err(GovernanceError::RemovalPending {
                    target,
                    proposal: pending,
                });
            }
            Some(target)
        } else {
            None
        };

        self.proposal_count += 1;
        let id = self.proposal_count;
        let proposal = Proposal {
            id,
            kind,
            target,
            start_time: now,
            votes: 0,
            snapshot_validator_count: validators.len() as u32,
            executed: false,
            rule_hash: (kind == ProposalKind::Rule).then_some(rule_hash),
            proposer,
            outcome: None,
        };
        if let Some(target) = target {
            self.removal_locks.insert(target, id);
        }
        self.bonds.hold(id, bond);
        self.open.insert(id);
        tracing::info!(
            proposal = id,
            ?kind,
            %proposer,
            target = ?target,
            snapshot = proposal.snapshot_validator_count,
            "proposal created"
        );
        self.proposals.insert(id, proposal);
        Ok(id)
    }

    /// Record `voter`'s vote and execute the proposal if this vote reaches quorum.
    ///
    /// Enforcement runs before the vote is recorded. If it fails fatally the whole
    /// call is rejected and nothing (vote, bond, lock) has changed.
    pub fn vote(
        &mut self,
        enforcer: &mut Enforcer<'_>,
        voter: Address,
        id: ProposalId,
        now: Timestamp,
    ) -> Result<VoteOutcome, GovernanceError> {
        let params = enforcer.validators.params().clone();
        let proposal = self
            .proposals
            .get(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        let record = enforcer
            .validators
            .record(&voter)
            .filter(|r| r.is_active())
            .ok_or(GovernanceError::NotActive(voter))?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if !proposal.is_open(params.proposal_expiry_secs, now) {
            return Err(GovernanceError::VotingClosed(id));
        }
        if record.joined_at > proposal.start_time {
            return Err(GovernanceError::JoinedAfterSnapshot {
                joined_at: record.joined_at,
                start: proposal.start_time,
            });
        }
        if self
            .voters
            .get(&id)
            .is_some_and(|voters| voters.contains(&voter))
        {
            return Err(GovernanceError::AlreadyVoted(voter));
        }

        let votes = proposal.votes + 1;
        let (kind, target) = (proposal.kind, proposal.target);
        let enforcement = if params.quorum_reached(votes, proposal.snapshot_validator_count) {
            Some(Self::dispatch(enforcer, kind, target, now)?)
        } else {
            None
        };

        self.voters.entry(id).or_default().insert(voter);
        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.votes = votes;
        }
        tracing::debug!(proposal = id, %voter, votes, "vote recorded");

        let execution = enforcement
            .map(|enforcement| self.settle_execution(id, enforcement, enforcer));
        Ok(VoteOutcome { votes, execution })
    }

    /// Resolve a proposal whose voting window closed without quorum.
    ///
    /// Never runs enforcement. The whole bond is burned (best-effort) and the
    /// amount forfeited is returned.
    pub fn finalize_expired(
        &mut self,
        params: &ValidatorParams,
        id: ProposalId,
        now: Timestamp,
        burns: &mut BurnLedger,
        custody: &mut dyn ValueCustody,
    ) -> Result<Amount, GovernanceError> {
        let proposal = self
            .proposals
            .get_mut(&id)
            .ok_or(GovernanceError::ProposalNotFound(id))?;
        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        let voting_ends = proposal.voting_ends(params.proposal_expiry_secs);
        if now <= voting_ends {
            return Err(GovernanceError::NotExpired { voting_ends });
        }

        proposal.executed = true;
        proposal.outcome = Some(ProposalOutcome::Expired);
        let target = proposal.target;
        let bond = self.bonds.release(id);
        burns.burn(custody, bond);
        self.release(id, target);
        tracing::info!(proposal = id, bond, "proposal expired; bond forfeited");
        Ok(bond)
    }

    /// Pay out `caller`'s claimable refunds.
    ///
    /// The balance is zeroed before the transfer. A failed transfer restores it.
    pub fn claim_bond(
        &mut self,
        caller: Address,
        custody: &mut dyn ValueCustody,
    ) -> Result<Amount, GovernanceError> {
        let amount = self
            .bonds
            .drain(&caller)
            .ok_or(GovernanceError::NothingToClaim)?;
        if !custody.transfer(&caller, amount) {
            self.bonds.credit(caller, amount);
            tracing::warn!(%caller, amount, "bond claim transfer failed");
            return Err(GovernanceError::TransferFailed { amount });
        }
        tracing::info!(%caller, amount, "bond claimed");
        Ok(amount)
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn has_voted(&self, id: ProposalId, voter: &Address) -> bool {
        self.voters
            .get(&id)
            .is_some_and(|voters| voters.contains(voter))
    }

    /// The unresolved removal proposal against `target`, if any.
    pub fn pending_removal(&self, target: &Address) -> Option<ProposalId> {
        self.removal_locks.get(target).copied()
    }

    pub fn proposal_count(&self) -> u64 {
        self.proposal_count
    }

    pub fn active_proposal_count(&self) -> usize {
        self.open.len()
    }

    pub fn claimable(&self, who: &Address) -> Amount {
        self.bonds.claimable(who)
    }

    pub fn claimable_balances(&self) -> &HashMap<Address, Amount> {
        self.bonds.claimable_balances()
    }

    /// Every proposal with its voters and escrow, in id order.
    pub fn records(&self) -> Vec<ProposalRecord> {
        self.proposals
            .values()
            .map(|proposal| {
                let mut voters: Vec<Address> = self
                    .voters
                    .get(&proposal.id)
                    .map(|v| v.iter().copied().collect())
                    .unwrap_or_default();
                voters.sort();
                ProposalRecord {
                    proposal: proposal.clone(),
                    voters,
                    escrowed_bond: self.bonds.escrowed(proposal.id),
                }
            })
            .collect()
    }

    fn dispatch(
        enforcer: &mut Enforcer<'_>,
        kind: ProposalKind,
        target: Option<Address>,
        now: Timestamp,
    ) -> Result<Enforcement, GovernanceError> {
        match (kind, target) {
            (ProposalKind::Rule, _) => Ok(Enforcement::None),
            (ProposalKind::Prune, Some(target)) => enforcer.prune(target, now),
            (ProposalKind::Slash, Some(target)) => enforcer.slash(target, now),
            (_, None) => Err(GovernanceError::MissingTarget),
        }
    }

    fn settle_execution(
        &mut self,
        id: ProposalId,
        enforcement: Enforcement,
        enforcer: &mut Enforcer<'_>,
    ) -> Execution {
        let success = enforcement.succeeded();
        let bond = self.bonds.release(id);
        let mut proposer = None;
        let mut target = None;
        if let Some(proposal) = self.proposals.get_mut(&id) {
            proposal.executed = true;
            proposal.outcome = Some(ProposalOutcome::Passed { success });
            proposer = Some(proposal.proposer);
            target = proposal.target;
        }
        let bond_refunded = match (success, proposer) {
            (true, Some(proposer)) => {
                self.bonds.credit(proposer, bond);
                true
            }
            _ => {
                enforcer.burns.burn(&mut *enforcer.custody, bond);
                false
            }
        };
        self.release(id, target);
        tracing::info!(proposal = id, success, bond, bond_refunded, "proposal executed");
        Execution {
            enforcement,
            success,
            bond,
            bond_refunded,
        }
    }

    fn release(&mut self, id: ProposalId, target: Option<Address>) {
        if let Some(target) = target {
            if self.removal_locks.get(&target) == Some(&id) {
                self.removal_locks.remove(&target);
            }
        }
        self.open.remove(&id);
    }
}
