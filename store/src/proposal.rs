//! Proposal storage trait.

use crate::StoreError;
use valset_types::ProposalId;

/// Proposals keyed by id. Proposals are never deleted.
pub trait ProposalStore {
    fn put_proposal(&self, id: ProposalId, data: &[u8]) -> Result<(), StoreError>;

    fn get_proposal(&self, id: ProposalId) -> Result<Option<Vec<u8>>, StoreError>;

    /// Every stored proposal, in no particular order.
    fn iter_proposals(&self) -> Result<Vec<(ProposalId, Vec<u8>)>, StoreError>;
}
