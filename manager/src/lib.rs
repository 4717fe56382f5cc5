//! Validator-set manager for a permissioned proof-of-stake network.
//!
//! [`ValidatorManager`] is the single entry point a host drives: it owns the
//! validator lifecycle, the governance engine, the burn ledger and the value
//! custody, and exposes the read/write interface consumed by callers and by
//! the consensus client (`validators()`).
//!
//! Calls are serialized: each one runs to completion against a clock reading
//! taken once at entry, and a rejected call leaves all state unchanged.

pub mod config;
pub mod error;
pub mod events;
pub mod lock;
pub mod logging;
pub mod manager;
pub mod persistence;

pub use config::{GenesisEntry, ManagerConfig};
pub use error::ManagerError;
pub use events::ManagerEvent;
pub use lock::{CallGuard, CallLock};
pub use logging::{init_logging, LogFormat};
pub use manager::ValidatorManager;
