//! Per-instance snapshot storage with drop-coupled cleanup.
//!
//! Each observed instance gets a fresh [`InstanceHandle`] and one stored
//! [`Snapshot`]. The host keeps the returned [`SnapshotGuard`] next to its
//! instance; when the instance (and so the guard) is dropped, the snapshot
//! is released. Without this, snapshot memory would grow with total object
//! churn over the life of the process.
//!
//! Release is best-effort and idempotent. It tolerates handles that were
//! never captured, handles already released, and a store that no longer
//! exists.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use subtp_types::{InstanceHandle, Snapshot};
use tracing::{debug, warn};

type SnapshotMap = HashMap<InstanceHandle, Snapshot>;

/// Holds the last-known attribute state of every live observed instance.
#[derive(Debug)]
pub struct SnapshotStore {
    entries: Arc<Mutex<SnapshotMap>>,
    next_handle: AtomicU64,
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore {
    /// Creates an empty store. The first issued handle is `#1`.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Issues a handle no other instance of this store has held.
    pub fn issue_handle(&self) -> InstanceHandle {
        InstanceHandle::from_raw(self.next_handle.fetch_add(1, Ordering::Relaxed))
    }

    /// Stores `attributes` under `handle`, replacing any previous snapshot.
    pub fn capture(&self, handle: InstanceHandle, attributes: Snapshot) {
        self.lock().insert(handle, attributes);
    }

    /// Replaces the snapshot under `handle` only if one is already stored.
    ///
    /// Returns false, storing nothing, for handles that were released or
    /// never captured: no guard exists to free such an entry.
    pub fn replace(&self, handle: InstanceHandle, attributes: Snapshot) -> bool {
        match self.lock().get_mut(&handle) {
            Some(entry) => {
                *entry = attributes;
                true
            }
            None => false,
        }
    }

    /// Returns a copy of the snapshot stored under `handle`.
    pub fn get(&self, handle: InstanceHandle) -> Option<Snapshot> {
        self.lock().get(&handle).cloned()
    }

    /// Removes the snapshot for `handle`. Returns false if there was none.
    pub fn release(&self, handle: InstanceHandle) -> bool {
        self.lock().remove(&handle).is_some()
    }

    pub fn contains(&self, handle: InstanceHandle) -> bool {
        self.lock().contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Creates the drop guard that releases `handle` when dropped.
    ///
    /// The guard holds only a weak reference, so it never keeps the store
    /// alive on its own.
    pub fn guard(&self, handle: InstanceHandle) -> SnapshotGuard {
        SnapshotGuard {
            handle,
            entries: Arc::downgrade(&self.entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SnapshotMap> {
        // A panic elsewhere cannot leave a half-written snapshot behind, so
        // a poisoned map is still usable.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases one instance's snapshot when dropped.
///
/// Hosts store the guard alongside the ORM instance it was issued for, so
/// the snapshot lives exactly as long as the instance does.
#[must_use = "dropping the guard immediately releases the snapshot"]
#[derive(Debug)]
pub struct SnapshotGuard {
    handle: InstanceHandle,
    entries: Weak<Mutex<SnapshotMap>>,
}

impl SnapshotGuard {
    /// The handle this guard releases.
    pub fn handle(&self) -> InstanceHandle {
        self.handle
    }

    /// Releases the snapshot now instead of at drop.
    pub fn release_now(self) {
        drop(self);
    }
}

impl Drop for SnapshotGuard {
    fn drop(&mut self) {
        let Some(entries) = self.entries.upgrade() else {
            debug!("Snapshot store gone before release of {}", self.handle);
            return;
        };
        let mut map = match entries.lock() {
            Ok(map) => map,
            Err(poisoned) => {
                warn!("Snapshot store lock poisoned while releasing {}", self.handle);
                poisoned.into_inner()
            }
        };
        if map.remove(&self.handle).is_some() {
            debug!("Released snapshot {}", self.handle);
        }
    }
}
