//! Per-resource mutual exclusion
//!
//! Each mutating lifecycle operation holds the exclusive lock for its
//! resource key (controller, array id, or device path) for the duration of
//! the call. Acquisition is fail-fast: a second mutation against a busy
//! resource is refused instead of queued, so a destructive command can
//! never run twice concurrently against the same target. Guards release on
//! drop, covering every exit path including cancellation and timeout.

use crate::error::{Error, Result};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-resource-key locks
#[derive(Default)]
pub struct ResourceLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for the duration of one mutating operation; releasing is dropping
#[derive(Debug)]
pub struct ResourceGuard {
    _guard: OwnedMutexGuard<()>,
}

impl ResourceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for `key`, or refuse with `OperationInProgress`
    /// if another mutation currently holds it.
    pub fn try_acquire(&self, key: &str) -> Result<ResourceGuard> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_default()
            .value()
            .clone();

        match lock.try_lock_owned() {
            Ok(guard) => Ok(ResourceGuard { _guard: guard }),
            Err(_) => Err(Error::OperationInProgress {
                resource: key.to_string(),
            }),
        }
    }

    /// Whether a mutation currently holds the lock for `key`. Used by the
    /// read side to avoid reporting a resource that is mid-mutation.
    pub fn is_busy(&self, key: &str) -> bool {
        match self.locks.get(key) {
            Some(lock) => lock.try_lock().is_err(),
            None => false,
        }
    }
}

/// Lock key for controller-scoped mutations (array creation)
pub fn controller_key(controller_index: u32) -> String {
    format!("controller:{}", controller_index)
}

/// Lock key for one array, by its controller-local numeric id
pub fn array_key(vd_number: &str) -> String {
    format!("vd:{}", vd_number)
}

/// Lock key for one OS block device
pub fn device_key(device: &str) -> String {
    format!("dev:{}", device)
}
