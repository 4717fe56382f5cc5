//! Nullable store: thread-safe in-memory storage for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use valset_store::{MetaStore, ProposalStore, StoreError, ValidatorStore};
use valset_types::{Address, ProposalId};

/// An in-memory implementation of every manager storage table.
/// Thread-safe so it can be shared behind an `Arc` in tests.
pub struct NullStore {
    validators: Mutex<HashMap<Address, Vec<u8>>>,
    proposals: Mutex<HashMap<ProposalId, Vec<u8>>>,
    meta: Mutex<HashMap<String, Vec<u8>>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            validators: Mutex::new(HashMap::new()),
            proposals: Mutex::new(HashMap::new()),
            meta: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Backend("lock poisoned".into())
}

impl ValidatorStore for NullStore {
    fn put_validator(&self, signer: &Address, record: &[u8]) -> Result<(), StoreError> {
        self.validators
            .lock()
            .map_err(poisoned)?
            .insert(*signer, record.to_vec());
        Ok(())
    }

    fn get_validator(&self, signer: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.validators.lock().map_err(poisoned)?.get(signer).cloned())
    }

    fn iter_validators(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError> {
        Ok(self
            .validators
            .lock()
            .map_err(poisoned)?
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }
}

impl ProposalStore for NullStore {
    fn put_proposal(&self, id: ProposalId, data: &[u8]) -> Result<(), StoreError> {
        self.proposals
            .lock()
            .map_err(poisoned)?
            .insert(id, data.to_vec());
        Ok(())
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.proposals.lock().map_err(poisoned)?.get(&id).cloned())
    }

    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .map_err(poisoned)?
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }
}

impl MetaStore for NullStore {
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.meta
            .lock()
            .map_err(poisoned)?
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.meta.lock().map_err(poisoned)?.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_independent() {
        let store = NullStore::new();
        let signer = Address::from_low_u64(3);
        store.put_validator(&signer, b"record").unwrap();
        store.put_proposal(1, b"proposal").unwrap();
        store.put_meta("counter", b"7").unwrap();

        assert_eq!(store.get_validator(&signer).unwrap(), Some(b"record".to_vec()));
        assert_eq!(store.get_proposal(1).unwrap(), Some(b"proposal".to_vec()));
        assert_eq!(store.get_proposal(2).unwrap(), None);
        assert_eq!(store.get_meta("counter").unwrap(), Some(b"7".to_vec()));
        assert_eq!(store.iter_validators().unwrap().len(), 1);
    }

    #[test]
    fn put_overwrites() {
        let store = NullStore::new();
        store.put_meta("k", b"a").unwrap();
        store.put_meta("k", b"b").unwrap();
        assert_eq!(store.get_meta("k").unwrap(), Some(b"b".to_vec()));
    }
}
