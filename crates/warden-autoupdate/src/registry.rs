//! The compile-time method registry.
//!
//! `METHODS` lists every method the service exposes, each with the typed
//! operation that handles it. `Registry::bind` pairs each entry with exactly
//! one policy and refuses to build if the two sides disagree, so a method can
//! never be served without a declared policy.

use std::{collections::BTreeMap, fmt};

use tracing::error;

use warden_contracts::{
    access::ResourceKind,
    error::{WardenError, WardenResult},
    policy::MethodPolicy,
};
use warden_core::traits::PolicySource;

use Operation::{Create, Delete, Get, Update, Upsert};
use ResourceKind::{
    AutoUpdateAgentRollout as AgentRollout, AutoUpdateConfig, AutoUpdateVersion,
};

/// What a method does to its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Get,
    Create,
    Update,
    Upsert,
    Delete,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operation::Get => "Get",
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Upsert => "Upsert",
            Operation::Delete => "Delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One served method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodEntry {
    pub name: &'static str,
    pub kind: ResourceKind,
    pub operation: Operation,
}

const fn entry(name: &'static str, kind: ResourceKind, operation: Operation) -> MethodEntry {
    MethodEntry {
        name,
        kind,
        operation,
    }
}

/// Every method the auto-update service exposes.
pub const METHODS: [MethodEntry; 15] = [
    entry("GetAutoUpdateConfig", AutoUpdateConfig, Get),
    entry("CreateAutoUpdateConfig", AutoUpdateConfig, Create),
    entry("UpdateAutoUpdateConfig", AutoUpdateConfig, Update),
    entry("UpsertAutoUpdateConfig", AutoUpdateConfig, Upsert),
    entry("DeleteAutoUpdateConfig", AutoUpdateConfig, Delete),
    entry("GetAutoUpdateVersion", AutoUpdateVersion, Get),
    entry("CreateAutoUpdateVersion", AutoUpdateVersion, Create),
    entry("UpdateAutoUpdateVersion", AutoUpdateVersion, Update),
    entry("UpsertAutoUpdateVersion", AutoUpdateVersion, Upsert),
    entry("DeleteAutoUpdateVersion", AutoUpdateVersion, Delete),
    entry("GetAutoUpdateAgentRollout", AgentRollout, Get),
    entry("CreateAutoUpdateAgentRollout", AgentRollout, Create),
    entry("UpdateAutoUpdateAgentRollout", AgentRollout, Update),
    entry("UpsertAutoUpdateAgentRollout", AgentRollout, Upsert),
    entry("DeleteAutoUpdateAgentRollout", AgentRollout, Delete),
];

/// The registry name for `operation` on `kind`, e.g. `"UpsertAutoUpdateVersion"`.
pub fn method_name(operation: Operation, kind: ResourceKind) -> String {
    format!("{}{}", operation.as_str(), kind.display_name())
}

/// Served methods, each paired with its policy.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: BTreeMap<&'static str, (MethodEntry, MethodPolicy)>,
}

impl Registry {
    /// Pair every entry in `METHODS` with its policy from `source`.
    ///
    /// Returns `WardenError::ConfigError` if any method lacks a policy, any
    /// policy names a method that is not served, a method is listed twice,
    /// or a policy's resource kind differs from the method's.
    pub fn bind(source: &dyn PolicySource) -> WardenResult<Self> {
        Self::bind_entries(&METHODS, source)
    }

    pub(crate) fn bind_entries(
        methods: &[MethodEntry],
        source: &dyn PolicySource,
    ) -> WardenResult<Self> {
        let mut entries = BTreeMap::new();
        for method in methods {
            let Some(policy) = source.lookup(method.name) else {
                error!(method = %method.name, "served method has no access policy");
                return Err(WardenError::ConfigError {
                    reason: format!(
                        "method '{}' is served but has no access policy",
                        method.name
                    ),
                });
            };
            if policy.resource != method.kind {
                error!(
                    method = %method.name,
                    served = %method.kind,
                    declared = %policy.resource,
                    "access policy names a different resource kind"
                );
                return Err(WardenError::ConfigError {
                    reason: format!(
                        "method '{}' acts on {} but its policy names {}",
                        method.name, method.kind, policy.resource
                    ),
                });
            }
            if entries.insert(method.name, (*method, policy.clone())).is_some() {
                return Err(WardenError::ConfigError {
                    reason: format!("method '{}' is registered more than once", method.name),
                });
            }
        }

        for policy in source.policies() {
            if !entries.contains_key(policy.method.as_str()) {
                error!(
                    method = %policy.method,
                    "access policy names a method that is not served"
                );
                return Err(WardenError::ConfigError {
                    reason: format!(
                        "policy for '{}' does not match any served method",
                        policy.method
                    ),
                });
            }
        }

        Ok(Self { entries })
    }

    pub fn get(&self, method: &str) -> Option<&(MethodEntry, MethodPolicy)> {
        self.entries.get(method)
    }

    /// Served method names in sorted order.
    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
