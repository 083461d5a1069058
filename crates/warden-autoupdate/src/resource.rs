//! Stored auto-update resources.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_contracts::access::ResourceKind;

/// One auto-update resource as held by a store.
///
/// Auto-update resources are cluster singletons, so a store holds at most
/// one per kind. `spec` is opaque to the service; only the envelope is
/// interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResource {
    pub kind: ResourceKind,
    pub spec: serde_json::Value,
    /// Changes on every write.
    pub revision: Uuid,
    pub updated_at: DateTime<Utc>,
}

impl StoredResource {
    pub fn new(kind: ResourceKind, spec: serde_json::Value) -> Self {
        Self {
            kind,
            spec,
            revision: Uuid::new_v4(),
            updated_at: Utc::now(),
        }
    }
}
