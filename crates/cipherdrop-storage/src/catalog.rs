//! Single point of serialization for the registry + file store pair.
//!
//! An upload first takes a [`Claim`] on its name. The claim is granted only if
//! the name is neither registered nor claimed by another in-flight upload, and
//! both checks happen under one lock, so at most one writer ever exists per
//! name. Committing the claim records the name in the registry; dropping it
//! uncommitted (write failed, request aborted) just releases the name.
//!
//! A claim owns a handle on its catalog, so an async caller can move it onto
//! the blocking pool for the registry write.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::info;

use crate::error::{StorageError, StorageResult};
use crate::file_store::FileStore;
use crate::registry::{ReconcileReport, Registry};

struct CatalogState {
    registry: Registry,
    in_flight: HashSet<String>,
}

pub struct Catalog {
    state: Mutex<CatalogState>,
}

impl Catalog {
    pub fn new(registry: Registry) -> Self {
        Self {
            state: Mutex::new(CatalogState {
                registry,
                in_flight: HashSet::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CatalogState> {
        // Every critical section leaves the state consistent, so a panic in
        // another holder does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rebuild the registry from what is actually in `store`.
    pub fn reconcile_with(&self, store: &FileStore) -> StorageResult<ReconcileReport> {
        let actual = store.list_names()?;
        let report = self.lock().registry.reconcile(actual)?;
        info!(
            added = report.added.len(),
            removed = report.removed.len(),
            "registry reconciled with file store"
        );
        Ok(report)
    }

    /// Reserve `name` for one upload.
    pub fn claim(self: &Arc<Self>, name: &str) -> StorageResult<Claim> {
        let mut state = self.lock();
        if state.registry.exists(name) || !state.in_flight.insert(name.to_string()) {
            return Err(StorageError::Duplicate(name.to_string()));
        }
        Ok(Claim {
            catalog: Arc::clone(self),
            name: name.to_string(),
            settled: false,
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.lock().registry.exists(name)
    }

    pub fn list_all(&self) -> Vec<String> {
        self.lock().registry.list_all()
    }

    pub fn len(&self) -> usize {
        self.lock().registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().registry.is_empty()
    }
}

/// Exclusive right to write and register one name. Released on drop.
pub struct Claim {
    catalog: Arc<Catalog>,
    name: String,
    settled: bool,
}

impl Claim {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record the name in the registry and release the reservation.
    ///
    /// Persists the registry synchronously; async callers should run this
    /// under `spawn_blocking`.
    pub fn commit(mut self) -> StorageResult<()> {
        let mut state = self.catalog.lock();
        state.in_flight.remove(&self.name);
        self.settled = true;
        state.registry.insert(&self.name)
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        if !self.settled {
            self.catalog.lock().in_flight.remove(&self.name);
        }
    }
}
