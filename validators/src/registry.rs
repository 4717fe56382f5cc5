//! The authoritative set of active signers.
//!
//! Dense vector plus identity → position index. Insertion, membership and removal
//! are all O(1). Removal moves the last member into the freed slot, so the order
//! of the remaining members is not preserved.

use std::collections::HashMap;
use valset_types::Address;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidatorRegistry {
    members: Vec<Address>,
    index: HashMap<Address, usize>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from a persisted member list.
    ///
    /// Returns `None` if the list contains a duplicate.
    pub fn from_members(members: Vec<Address>) -> Option<Self> {
        let mut index = HashMap::with_capacity(members.len());
        for (pos, id) in members.iter().enumerate() {
            if index.insert(*id, pos).is_some() {
                return None;
            }
        }
        Some(Self { members, index })
    }

    /// Append `id`. The caller guarantees it is not already present.
    pub fn add(&mut self, id: Address) {
        debug_assert!(!self.index.contains_key(&id), "{id} already registered");
        self.index.insert(id, self.members.len());
        self.members.push(id);
    }

    /// Remove `id` by swapping the last member into its slot.
    ///
    /// Returns `false` if `id` was not a member.
    pub fn remove(&mut self, id: &Address) -> bool {
        let Some(pos) = self.index.remove(id) else {
            return false;
        };
        self.members.swap_remove(pos);
        if let Some(moved) = self.members.get(pos) {
            self.index.insert(*moved, pos);
        }
        true
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &Address) -> bool {
        self.index.contains_key(id)
    }

    /// Current members, in registry order. This is what the consensus client reads.
    pub fn list(&self) -> &[Address] {
        &self.members
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn registry_of(ids: &[u64]) -> ValidatorRegistry {
        let mut reg = ValidatorRegistry::new();
        for &n in ids {
            reg.add(addr(n));
        }
        reg
    }

    fn assert_index_consistent(reg: &ValidatorRegistry) {
        assert_eq!(reg.index.len(), reg.members.len());
        for (pos, id) in reg.members.iter().enumerate() {
            assert_eq!(reg.index[id], pos);
        }
    }

    #[test]
    fn add_appends_in_order() {
        let reg = registry_of(&[1, 2, 3]);
        assert_eq!(reg.list(), &[addr(1), addr(2), addr(3)]);
        assert_eq!(reg.len(), 3);
        assert!(reg.contains(&addr(2)));
        assert!(!reg.contains(&addr(4)));
        assert_index_consistent(&reg);
    }

    #[test]
    fn remove_middle_moves_last_into_slot() {
        let mut reg = registry_of(&[1, 2, 3, 4]);
        assert!(reg.remove(&addr(2)));
        assert_eq!(reg.list(), &[addr(1), addr(4), addr(3)]);
        assert!(!reg.contains(&addr(2)));
        assert_index_consistent(&reg);
    }

    #[test]
    fn remove_last_leaves_others_in_place() {
        let mut reg = registry_of(&[1, 2, 3]);
        assert!(reg.remove(&addr(3)));
        assert_eq!(reg.list(), &[addr(1), addr(2)]);
        assert_index_consistent(&reg);
    }

    #[test]
    fn remove_only_member_empties_registry() {
        let mut reg = registry_of(&[7]);
        assert!(reg.remove(&addr(7)));
        assert!(reg.is_empty());
        assert_index_consistent(&reg);
    }

    #[test]
    fn remove_unknown_is_noop() {
        let mut reg = registry_of(&[1, 2]);
        assert!(!reg.remove(&addr(9)));
        assert_eq!(reg.list(), &[addr(1), addr(2)]);
    }

    #[test]
    fn readd_after_remove() {
        let mut reg = registry_of(&[1, 2, 3]);
        reg.remove(&addr(1));
        reg.add(addr(1));
        assert_eq!(reg.len(), 3);
        assert_eq!(reg.list().last(), Some(&addr(1)));
        assert_index_consistent(&reg);
    }

    #[test]
    fn from_members_rejects_duplicates() {
        assert!(ValidatorRegistry::from_members(vec![addr(1), addr(2), addr(1)]).is_none());
        let reg = ValidatorRegistry::from_members(vec![addr(3), addr(1)]).unwrap();
        assert_index_consistent(&reg);
        assert_eq!(reg.list(), &[addr(3), addr(1)]);
    }
}
