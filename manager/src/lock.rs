//! Call-scoped exclusive lock.
//!
//! Operations that move value out of custody hold a [`CallGuard`] for their
//! whole body. The guard releases the lock when dropped, so every return path
//! (including `?` and failed transfers) unlocks.

use crate::ManagerError;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct CallLock {
    held: AtomicBool,
}

impl CallLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock, or fail with `Reentrant` if it is already held.
    pub fn acquire(&self) -> Result<CallGuard<'_>, ManagerError> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .map_err(|_| ManagerError::Reentrant)?;
        Ok(CallGuard { lock: self })
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

/// Proof that the lock is held. Releases on drop.
#[derive(Debug)]
pub struct CallGuard<'a> {
    lock: &'a CallLock,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_rejected_while_held() {
        let lock = CallLock::new();
        let guard = lock.acquire().unwrap();
        assert!(lock.is_held());
        assert!(matches!(lock.acquire(), Err(ManagerError::Reentrant)));
        drop(guard);
        assert!(!lock.is_held());
        assert!(lock.acquire().is_ok());
    }

    #[test]
    fn released_on_early_return() {
        fn failing(lock: &CallLock) -> Result<(), ManagerError> {
            let _guard = lock.acquire()?;
            Err(ManagerError::Config("boom".into()))
        }
        let lock = CallLock::new();
        assert!(failing(&lock).is_err());
        assert!(!lock.is_held());
    }
}
