//! Resource storage seam and its in-memory implementation.
//!
//! `InMemoryStore` keeps one `StoredResource` per kind in a `HashMap`
//! protected by a `Mutex`. It stands in for both the backend and the cache
//! in tests and demos.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::info;

use warden_contracts::{
    access::ResourceKind,
    error::{WardenError, WardenResult},
};

use crate::resource::StoredResource;

/// Persistence for auto-update singletons.
pub trait ResourceStore: Send + Sync {
    /// Return the resource, or `NotFound`.
    fn get(&self, kind: ResourceKind) -> WardenResult<StoredResource>;

    /// Insert the resource, or `AlreadyExists`.
    fn create(&self, kind: ResourceKind, spec: serde_json::Value) -> WardenResult<StoredResource>;

    /// Replace an existing resource, or `NotFound`.
    fn update(&self, kind: ResourceKind, spec: serde_json::Value) -> WardenResult<StoredResource>;

    /// Insert or replace the resource.
    fn upsert(&self, kind: ResourceKind, spec: serde_json::Value) -> WardenResult<StoredResource>;

    /// Remove the resource, or `NotFound`.
    fn delete(&self, kind: ResourceKind) -> WardenResult<()>;
}

/// An in-memory `ResourceStore`.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    resources: Arc<Mutex<HashMap<ResourceKind, StoredResource>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources currently held.
    pub fn len(&self) -> WardenResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> WardenResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> WardenResult<MutexGuard<'_, HashMap<ResourceKind, StoredResource>>> {
        self.resources.lock().map_err(|e| WardenError::Storage {
            reason: format!("resource store lock poisoned: {}", e),
        })
    }
}

fn not_found(kind: ResourceKind) -> WardenError {
    WardenError::NotFound {
        kind: kind.as_str().to_string(),
    }
}

impl ResourceStore for InMemoryStore {
    fn get(&self, kind: ResourceKind) -> WardenResult<StoredResource> {
        self.lock()?.get(&kind).cloned().ok_or_else(|| not_found(kind))
    }

    fn create(&self, kind: ResourceKind, spec: serde_json::Value) -> WardenResult<StoredResource> {
        let mut resources = self.lock()?;
        if resources.contains_key(&kind) {
            return Err(WardenError::AlreadyExists {
                kind: kind.as_str().to_string(),
            });
        }
        let resource = StoredResource::new(kind, spec);
        resources.insert(kind, resource.clone());
        info!(kind = %kind, revision = %resource.revision, "resource created");
        Ok(resource)
    }

    fn update(&self, kind: ResourceKind, spec: serde_json::Value) -> WardenResult<StoredResource> {
        let mut resources = self.lock()?;
        if !resources.contains_key(&kind) {
            return Err(not_found(kind));
        }
        let resource = StoredResource::new(kind, spec);
        resources.insert(kind, resource.clone());
        info!(kind = %kind, revision = %resource.revision, "resource updated");
        Ok(resource)
    }

    fn upsert(&self, kind: ResourceKind, spec: serde_json::Value) -> WardenResult<StoredResource> {
        let resource = StoredResource::new(kind, spec);
        self.lock()?.insert(kind, resource.clone());
        info!(kind = %kind, revision = %resource.revision, "resource upserted");
        Ok(resource)
    }

    fn delete(&self, kind: ResourceKind) -> WardenResult<()> {
        self.lock()?.remove(&kind).ok_or_else(|| not_found(kind))?;
        info!(kind = %kind, "resource deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use warden_contracts::{access::ResourceKind, error::WardenError};

    use super::{InMemoryStore, ResourceStore};

    #[test]
    fn test_clones_share_resources() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store
            .create(ResourceKind::AutoUpdateConfig, json!({ "mode": "enabled" }))
            .unwrap();
        assert_eq!(other.len().unwrap(), 1);
        assert!(!other.is_empty().unwrap());
        other.delete(ResourceKind::AutoUpdateConfig).unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_lock_surfaces_as_storage_error() {
        let store = InMemoryStore::new();
        let resources = Arc::clone(&store.resources);
        let _ = std::thread::spawn(move || {
            let _guard = resources.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        for result in [store.len().map(|_| ()), store.is_empty().map(|_| ())] {
            match result {
                Err(WardenError::Storage { reason }) => assert!(reason.contains("poisoned")),
                other => panic!("expected Storage, got {:?}", other),
            }
        }
        assert!(matches!(
            store.get(ResourceKind::AutoUpdateVersion),
            Err(WardenError::Storage { .. })
        ));
    }
}
