//! Abstract storage traits for the validator-set manager.
//!
//! Every storage backend (embedded KV, in-memory for testing) implements these
//! traits. Values are opaque bytes: the manager serializes its own records, so
//! this crate never depends on the domain crates.
//!
//! Layout is a set of flat keyed tables with no schema versioning:
//! validators by signer, proposals by id, and a small metadata table for
//! counters and singleton blobs.

pub mod error;
pub mod meta;
pub mod proposal;
pub mod validator;

pub use error::StoreError;
pub use meta::MetaStore;
pub use proposal::ProposalStore;
pub use validator::ValidatorStore;

/// Everything the manager needs to persist and restore itself.
pub trait ManagerStore: ValidatorStore + ProposalStore + MetaStore {}

impl<T: ValidatorStore + ProposalStore + MetaStore + ?Sized> ManagerStore for T {}
