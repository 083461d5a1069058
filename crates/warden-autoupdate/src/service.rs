//! The auto-update management service.
//!
//! Every call follows the same path:
//!
//!   registry lookup → authorizer → paired policy → store operation
//!
//! No store is touched until the engine allows the call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use warden_contracts::error::{WardenError, WardenResult};
use warden_core::{engine::evaluate, traits::Authorizer, DecisionEngine};

use crate::{
    registry::{MethodEntry, Operation, Registry},
    resource::StoredResource,
    store::ResourceStore,
};

/// The payload of one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Gets and deletes carry no body.
    Empty,
    Resource { spec: serde_json::Value },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    Resource(StoredResource),
    Deleted,
}

impl Response {
    pub fn resource(&self) -> Option<&StoredResource> {
        match self {
            Response::Resource(r) => Some(r),
            Response::Deleted => None,
        }
    }
}

/// Collaborators for an `AutoUpdateService`.
pub struct ServiceConfig {
    pub authorizer: Arc<dyn Authorizer>,
    /// Authoritative store. All writes go here.
    pub backend: Arc<dyn ResourceStore>,
    /// Read path for gets.
    pub cache: Arc<dyn ResourceStore>,
    pub engine: DecisionEngine,
}

/// Serves the fifteen auto-update methods, each guarded by its policy.
pub struct AutoUpdateService {
    authorizer: Arc<dyn Authorizer>,
    backend: Arc<dyn ResourceStore>,
    cache: Arc<dyn ResourceStore>,
    engine: DecisionEngine,
    registry: Registry,
}

impl AutoUpdateService {
    /// Build the service, pairing every served method with its policy.
    ///
    /// Fails with `ConfigError` when the engine's policy source and the
    /// served methods disagree.
    pub fn new(config: ServiceConfig) -> WardenResult<Self> {
        let registry = Registry::bind(config.engine.policies())?;
        info!(
            methods = registry.len(),
            namespace = %config.engine.config().namespace,
            "auto-update service ready"
        );
        Ok(Self {
            authorizer: config.authorizer,
            backend: config.backend,
            cache: config.cache,
            engine: config.engine,
            registry,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Invoke `method` with `request`.
    ///
    /// Errors:
    /// - `UndeclaredMethod` if the method is not served
    /// - whatever the authorizer returns, unchanged
    /// - `AccessDenied` if the paired policy denies the caller
    /// - store errors and `InvalidRequest` once the call is allowed
    pub fn call(&self, method: &str, request: Request) -> WardenResult<Response> {
        let Some((entry, policy)) = self.registry.get(method) else {
            error!(method, "call to undeclared method, denying");
            return Err(WardenError::UndeclaredMethod {
                method: method.to_string(),
            });
        };

        let ctx = self.authorizer.authorize(method)?;
        let decision = evaluate(policy, &ctx, &self.engine.config().namespace)?;
        decision.into_result()?;

        debug!(method, identity = %ctx.identity, "call authorized");
        self.execute(entry, request)
    }

    fn execute(&self, entry: &MethodEntry, request: Request) -> WardenResult<Response> {
        let kind = entry.kind;
        let stored = match entry.operation {
            Operation::Get => self.cache.get(kind)?,
            Operation::Delete => {
                self.backend.delete(kind)?;
                return Ok(Response::Deleted);
            }
            Operation::Create => self.backend.create(kind, body(entry, request)?)?,
            Operation::Update => self.backend.update(kind, body(entry, request)?)?,
            Operation::Upsert => self.backend.upsert(kind, body(entry, request)?)?,
        };
        Ok(Response::Resource(stored))
    }
}

/// The resource body of a write, or `InvalidRequest`.
fn body(entry: &MethodEntry, request: Request) -> WardenResult<serde_json::Value> {
    match request {
        Request::Resource { spec } => Ok(spec),
        Request::Empty => Err(WardenError::InvalidRequest {
            reason: format!("{} requires a resource body", entry.name),
        }),
    }
}
