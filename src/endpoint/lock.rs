//! Concurrency guard for the endpoint record.
//!
//! Two access modes are exposed as distinct operations:
//!
//! | Operation         | Blocks on writers | Can fail            |
//! |-------------------|-------------------|---------------------|
//! | `read()`          | yes               | no                  |
//! | `write()`         | yes               | no                  |
//! | `read_if_alive()` | yes               | `EndpointNotAlive`  |
//!
//! `read_if_alive()` never waits for the endpoint to become alive: liveness
//! is checked before the lock is touched, and checked again once the lock is
//! held so a deletion racing with acquisition is still reported.
//!
//! ## Reentrancy
//!
//! `std::sync::RwLock` is not reentrant. Code already holding a guard must
//! use the `*_locked` accessors and pass the guarded state along; calling a
//! locking accessor from under a guard can deadlock.

use super::state::{EndpointMutableState, EndpointState};
use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Shared guard over an endpoint's mutable state.
pub type EndpointReadGuard<'a> = RwLockReadGuard<'a, EndpointMutableState>;

/// Exclusive guard over an endpoint's mutable state.
pub type EndpointWriteGuard<'a> = RwLockWriteGuard<'a, EndpointMutableState>;

/// Read/write lock plus liveness cell for one endpoint.
#[derive(Debug)]
pub struct EndpointLock {
    id: u16,
    liveness: AtomicU8,
    state: RwLock<EndpointMutableState>,
}

impl EndpointLock {
    pub(crate) fn new(id: u16, state: EndpointMutableState) -> Self {
        Self {
            id,
            liveness: AtomicU8::new(EndpointState::Alive as u8),
            state: RwLock::new(state),
        }
    }

    /// Current liveness, observed without taking the lock.
    #[must_use]
    pub fn liveness(&self) -> EndpointState {
        EndpointState::from_u8(self.liveness.load(Ordering::Acquire))
    }

    /// Acquires shared access regardless of liveness.
    ///
    /// The guarded data is plain values with no cross-field invariant, so a
    /// poisoned lock is recovered rather than surfaced.
    pub fn read(&self) -> EndpointReadGuard<'_> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires exclusive access regardless of liveness.
    pub fn write(&self) -> EndpointWriteGuard<'_> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires shared access only while the endpoint is alive.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndpointNotAlive` immediately if the endpoint has been
    /// deleted, without reading any guarded field.
    pub fn read_if_alive(&self) -> Result<EndpointReadGuard<'_>> {
        if !self.liveness().is_alive() {
            debug!("endpoint {} not alive, refusing shared access", self.id);
            return Err(Error::EndpointNotAlive { id: self.id });
        }

        let guard = self.read();
        if !self.liveness().is_alive() {
            drop(guard);
            debug!("endpoint {} deleted during acquisition", self.id);
            return Err(Error::EndpointNotAlive { id: self.id });
        }

        Ok(guard)
    }

    /// Moves the endpoint to `Deleted`.
    ///
    /// Taken under the exclusive lock, so it returns only after every
    /// in-flight shared holder has released. Returns `false` if the endpoint
    /// was already deleted.
    pub(crate) fn mark_deleted(&self) -> bool {
        let _guard = self.write();
        let previous = self
            .liveness
            .swap(EndpointState::Deleted as u8, Ordering::AcqRel);
        EndpointState::from_u8(previous).is_alive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_if_alive_on_alive_endpoint() {
        let lock = EndpointLock::new(7, EndpointMutableState::default());
        assert!(lock.read_if_alive().is_ok());
    }

    #[test]
    fn test_read_if_alive_after_delete() {
        let lock = EndpointLock::new(7, EndpointMutableState::default());
        assert!(lock.mark_deleted());
        assert!(matches!(
            lock.read_if_alive(),
            Err(Error::EndpointNotAlive { id: 7 })
        ));
    }

    #[test]
    fn test_mark_deleted_is_one_way() {
        let lock = EndpointLock::new(1, EndpointMutableState::default());
        assert!(lock.mark_deleted());
        assert!(!lock.mark_deleted());
        assert_eq!(lock.liveness(), EndpointState::Deleted);
    }

    #[test]
    fn test_unconditional_read_ignores_liveness() {
        let lock = EndpointLock::new(1, EndpointMutableState::default());
        lock.mark_deleted();
        let guard = lock.read();
        assert!(guard.ipv4.is_none());
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let lock = std::sync::Arc::new(EndpointLock::new(1, EndpointMutableState::default()));
        let poisoner = std::sync::Arc::clone(&lock);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.write();
            panic!("poison the lock");
        })
        .join();

        lock.write().ipv4 = Some(std::net::Ipv4Addr::LOCALHOST);
        assert_eq!(lock.read().ipv4, Some(std::net::Ipv4Addr::LOCALHOST));
    }
}
