//! Policy file schema.
//!
//! A `PolicyConfig` is deserialized from TOML and holds one `MethodPolicy`
//! per `[[methods]]` table. Order in the file does not matter; the table is
//! keyed by method name and duplicates are rejected at load time.

use serde::{Deserialize, Serialize};

use warden_contracts::policy::MethodPolicy;
use warden_core::DEFAULT_NAMESPACE;

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// The top-level structure of a TOML policy file.
///
/// Example:
/// ```toml
/// namespace = "default"
///
/// [[methods]]
/// method = "GetAutoUpdateConfig"
/// resource = "autoupdate_config"
/// verbs = ["read"]
/// requires_confirmation = false
///
/// [[methods]]
/// method = "DeleteAutoUpdateConfig"
/// resource = "autoupdate_config"
/// verbs = ["delete"]
/// allow_reused_confirmation = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Namespace verb checks are evaluated in.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// One entry per method the service exposes.
    #[serde(default)]
    pub methods: Vec<MethodPolicy>,
}
