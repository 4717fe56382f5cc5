//! Validator record storage trait.

use crate::StoreError;
use valset_types::Address;

/// Validator records keyed by signer identity.
pub trait ValidatorStore {
    fn put_validator(&self, signer: &Address, record: &[u8]) -> Result<(), StoreError>;

    fn get_validator(&self, signer: &Address) -> Result<Option<Vec<u8>>, StoreError>;

    /// Every stored record, in no particular order.
    fn iter_validators(&self) -> Result<Vec<(Address, Vec<u8>)>, StoreError>;
}
