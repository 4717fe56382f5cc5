//! Save and restore a manager through a [`ManagerStore`].
//!
//! Records are bincode blobs in flat keyed tables: validators by signer,
//! proposals by id, and singletons in the metadata table. Derived state (the
//! registry index, removal locks, the unresolved-proposal set) is rebuilt on
//! load and never stored.

use crate::manager::ValidatorManager;
use crate::ManagerError;
use std::collections::HashMap;
use valset_custody::{BurnLedger, ValueCustody};
use valset_governance::{GovernanceEngine, ProposalRecord};
use valset_store::{ManagerStore, StoreError};
use valset_types::{Address, Amount, Clock, ValidatorParams};
use valset_validators::{ValidatorRecord, ValidatorSet};

const PARAMS_KEY: &str = "params";
const REGISTRY_KEY: &str = "registry";
const CLAIMABLE_KEY: &str = "claimable";
const BURNS_KEY: &str = "burns";
const PROPOSAL_COUNT_KEY: &str = "proposal_count";

impl<C: ValueCustody, K: Clock> ValidatorManager<C, K> {
    /// Write the full manager state to `store`.
    pub fn save_to_store(&self, store: &dyn ManagerStore) -> Result<(), ManagerError> {
        store.put_meta(PARAMS_KEY, &bincode::serialize(self.validators.params())?)?;
        store.put_meta(REGISTRY_KEY, &bincode::serialize(self.validators.validators())?)?;
        store.put_meta(
            CLAIMABLE_KEY,
            &bincode::serialize(self.governance.claimable_balances())?,
        )?;
        store.put_meta(BURNS_KEY, &bincode::serialize(&self.burns)?)?;
        store.put_meta(
            PROPOSAL_COUNT_KEY,
            &self.governance.proposal_count().to_be_bytes(),
        )?;

        for (signer, record) in self.validators.records() {
            store.put_validator(signer, &bincode::serialize(record)?)?;
        }
        let records = self.governance.records();
        for record in &records {
            store.put_proposal(record.proposal.id, &bincode::serialize(record)?)?;
        }
        tracing::debug!(
            validators = self.validators.len(),
            proposals = records.len(),
            "manager state saved"
        );
        Ok(())
    }

    /// Rebuild a manager from `store`, attaching the given custody and clock.
    ///
    /// Fails with a store or validator error if the stored state is missing or
    /// inconsistent. Parameters and registry size are held to the same rules
    /// genesis enforces.
    pub fn load_from_store(
        store: &dyn ManagerStore,
        custody: C,
        clock: K,
    ) -> Result<Self, ManagerError> {
        let params: ValidatorParams = bincode::deserialize(&required(store, PARAMS_KEY)?)?;
        params
            .validate()
            .map_err(|e| StoreError::Corruption(format!("stored params: {e}")))?;
        let members: Vec<Address> = bincode::deserialize(&required(store, REGISTRY_KEY)?)?;
        let (min, max) = (params.min_validators as usize, params.max_validators as usize);
        if members.len() < min || members.len() > max {
            return Err(StoreError::Corruption(format!(
                "registry holds {} validators, bounds are [{min}, {max}]",
                members.len()
            ))
            .into());
        }
        let claimable: HashMap<Address, Amount> = match store.get_meta(CLAIMABLE_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => HashMap::new(),
        };
        let burns: BurnLedger = match store.get_meta(BURNS_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => BurnLedger::new(params.burn_address),
        };
        let proposal_count = match store.get_meta(PROPOSAL_COUNT_KEY)? {
            Some(bytes) => {
                let raw: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StoreError::Corruption(format!("proposal_count has {} bytes", bytes.len()))
                })?;
                u64::from_be_bytes(raw)
            }
            None => 0,
        };

        let mut records = HashMap::new();
        for (signer, bytes) in store.iter_validators()? {
            let record: ValidatorRecord = bincode::deserialize(&bytes)?;
            records.insert(signer, record);
        }
        let mut proposals = Vec::new();
        for (id, bytes) in store.iter_proposals()? {
            let record: ProposalRecord = bincode::deserialize(&bytes)?;
            if record.proposal.id != id {
                return Err(StoreError::Corruption(format!(
                    "proposal stored under {id} has id {}",
                    record.proposal.id
                ))
                .into());
            }
            proposals.push(record);
        }

        let proposal_total = proposals.len();
        let validators = ValidatorSet::restore(params, members, records)?;
        let governance = GovernanceEngine::restore(proposals, claimable, proposal_count);
        tracing::info!(
            validators = validators.len(),
            proposals = proposal_total,
            open = governance.active_proposal_count(),
            "manager state loaded"
        );
        Ok(Self {
            validators,
            governance,
            burns,
            custody,
            clock,
            lock: Default::default(),
            events: Vec::new(),
        })
    }
}

fn required(store: &dyn ManagerStore, key: &str) -> Result<Vec<u8>, StoreError> {
    store
        .get_meta(key)?
        .ok_or_else(|| StoreError::NotFound(key.to_string()))
}
