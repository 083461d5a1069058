//! The immutable method → policy table.
//!
//! `PolicyTable` is built once, validated as a whole, and read-only
//! thereafter. It implements `PolicySource` so a `DecisionEngine` can be
//! constructed directly on top of it.
//!
//! Construction rejects:
//!
//! 1. Any policy that fails `MethodPolicy::validate` (empty verbs, blank
//!    method name, bypass flag without a role).
//! 2. Two policies for the same method name.

use std::{collections::BTreeMap, path::Path};

use tracing::debug;

use warden_contracts::{
    error::{WardenError, WardenResult},
    policy::MethodPolicy,
};
use warden_core::traits::PolicySource;

use crate::{builtin::autoupdate_policies, config::PolicyConfig};

/// A validated, total map from method name to `MethodPolicy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    namespace: String,
    policies: BTreeMap<String, MethodPolicy>,
}

impl PolicyTable {
    /// Build a table from individual policies.
    ///
    /// Returns `WardenError::ConfigError` on the first invalid or duplicate
    /// entry.
    pub fn new(
        namespace: impl Into<String>,
        policies: impl IntoIterator<Item = MethodPolicy>,
    ) -> WardenResult<Self> {
        let mut map = BTreeMap::new();
        for policy in policies {
            policy.validate()?;
            if map.contains_key(&policy.method) {
                return Err(WardenError::ConfigError {
                    reason: format!("method '{}' is declared more than once", policy.method),
                });
            }
            map.insert(policy.method.clone(), policy);
        }
        debug!(methods = map.len(), "policy table built");
        Ok(Self {
            namespace: namespace.into(),
            policies: map,
        })
    }

    /// The built-in auto-update policy table in the default namespace.
    pub fn builtin() -> WardenResult<Self> {
        Self::new(warden_core::DEFAULT_NAMESPACE, autoupdate_policies())
    }

    /// Parse `s` as a TOML policy file and build a table.
    ///
    /// Returns `WardenError::ConfigError` if the TOML is malformed, does not
    /// match `PolicyConfig`, or declares an invalid policy.
    pub fn from_toml_str(s: &str) -> WardenResult<Self> {
        let config: PolicyConfig = toml::from_str(s).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read the file at `path` and parse it as a TOML policy file.
    pub fn from_file(path: &Path) -> WardenResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| WardenError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_config(config: PolicyConfig) -> WardenResult<Self> {
        Self::new(config.namespace, config.methods)
    }

    /// Namespace verb checks should be evaluated in.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Declared method names in sorted order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.policies.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodPolicy> {
        self.policies.values()
    }
}

impl PolicySource for PolicyTable {
    fn lookup(&self, method: &str) -> Option<&MethodPolicy> {
        self.policies.get(method)
    }

    fn policies(&self) -> Vec<&MethodPolicy> {
        self.policies.values().collect()
    }
}
