//! # warden-autoupdate
//!
//! Reference auto-update management service guarded by the WARDEN access
//! engine.
//!
//! The service exposes Get/Create/Update/Upsert/Delete for the three
//! auto-update singletons (config, version, agent rollout). Each method is
//! declared once in [`registry::METHODS`] and paired with its access policy
//! when the service is built; construction fails if any method lacks a
//! policy or any policy lacks a method.
//!
//! Gets read from the cache store, every mutation goes to the backend store.

pub mod registry;
pub mod resource;
pub mod service;
pub mod store;

pub use registry::{method_name, MethodEntry, Operation, Registry, METHODS};
pub use resource::StoredResource;
pub use service::{AutoUpdateService, Request, Response, ServiceConfig};
pub use store::{InMemoryStore, ResourceStore};

// ── Tests ─────────────────────────────────────────────────────────────────────
