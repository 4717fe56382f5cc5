//! Metadata storage trait.

use crate::StoreError;

/// Generic key-value table for counters and singleton blobs (registry order,
/// burn totals, claimable credits) that don't belong in a keyed domain table.
pub trait MetaStore {
    /// Store a metadata value, replacing any previous one.
    fn put_meta(&self, key: &str, value: &[u8]) -> Result<(), StoreError>;

    /// Retrieve a metadata value, `None` if it was never written.
    fn get_meta(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
}
