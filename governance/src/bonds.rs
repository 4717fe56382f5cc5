//! Proposal bond escrow and claimable refunds.

use std::collections::HashMap;
use valset_types::{Address, Amount, ProposalId};

/// Bonds held per unresolved proposal, and refunds owed per identity.
///
/// Value never leaves custody through here: the book only records who is owed
/// what. Burning and paying out are the engine's job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BondBook {
    escrow: HashMap<ProposalId, Amount>,
    claimable: HashMap<Address, Amount>,
}

impl BondBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restore(escrow: HashMap<ProposalId, Amount>, claimable: HashMap<Address, Amount>) -> Self {
        Self { escrow, claimable }
    }

    /// Place a proposal's bond in escrow.
    pub fn hold(&mut self, id: ProposalId, amount: Amount) {
        self.escrow.insert(id, amount);
    }

    /// Bond currently escrowed for `id`.
    pub fn escrowed(&self, id: ProposalId) -> Amount {
        self.escrow.get(&id).copied().unwrap_or(0)
    }

    /// Remove and return a proposal's escrow. A second call returns zero.
    pub fn release(&mut self, id: ProposalId) -> Amount {
        self.escrow.remove(&id).unwrap_or(0)
    }

    /// Add `amount` to `to`'s claimable balance.
    pub fn credit(&mut self, to: Address, amount: Amount) {
        if amount == 0 {
            return;
        }
        let balance = self.claimable.entry(to).or_default();
        *balance = balance.saturating_add(amount);
    }

    pub fn claimable(&self, who: &Address) -> Amount {
        self.claimable.get(who).copied().unwrap_or(0)
    }

    /// Zero `who`'s claimable balance and return what it was, `None` if nothing is owed.
    pub fn drain(&mut self, who: &Address) -> Option<Amount> {
        self.claimable.remove(who).filter(|amount| *amount > 0)
    }

    pub fn claimable_balances(&self) -> &HashMap<Address, Amount> {
        &self.claimable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_is_single_shot() {
        let mut book = BondBook::new();
        book.hold(1, 500);
        assert_eq!(book.escrowed(1), 500);
        assert_eq!(book.release(1), 500);
        assert_eq!(book.release(1), 0);
        assert_eq!(book.escrowed(1), 0);
    }

    #[test]
    fn credits_accumulate_and_drain_to_zero() {
        let mut book = BondBook::new();
        let who = Address::from_low_u64(9);
        book.credit(who, 100);
        book.credit(who, 50);
        assert_eq!(book.claimable(&who), 150);
        assert_eq!(book.drain(&who), Some(150));
        assert_eq!(book.claimable(&who), 0);
        assert_eq!(book.drain(&who), None);
    }

    #[test]
    fn zero_credit_creates_no_entry() {
        let mut book = BondBook::new();
        let who = Address::from_low_u64(9);
        book.credit(who, 0);
        assert!(book.claimable_balances().is_empty());
    }
}
