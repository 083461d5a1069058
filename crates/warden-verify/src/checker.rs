//! A synthetic capability checker for harness scenarios.

use warden_contracts::{
    access::{ResourceKind, SystemRole, Verb},
    error::{WardenError, WardenResult},
};
use warden_core::traits::CapabilityChecker;

/// Grants exactly `granted` on every resource kind and, optionally, one
/// builtin role.
///
/// Implements the whole `CapabilityChecker` surface directly so a scenario
/// never depends on a real role compiler.
#[derive(Debug, Clone, Default)]
pub struct ScenarioChecker {
    granted: Vec<Verb>,
    role: Option<SystemRole>,
}

impl ScenarioChecker {
    pub fn new(granted: &[Verb], role: Option<SystemRole>) -> Self {
        Self {
            granted: granted.to_vec(),
            role,
        }
    }
}

impl CapabilityChecker for ScenarioChecker {
    fn check_verb(&self, _namespace: &str, resource: ResourceKind, verb: Verb) -> WardenResult<()> {
        if self.granted.contains(&verb) {
            return Ok(());
        }
        Err(WardenError::access_denied(format!(
            "access denied to rule={resource}/verb={verb}"
        )))
    }

    fn has_system_role(&self, role: SystemRole) -> bool {
        self.role == Some(role)
    }

    fn role_names(&self) -> Vec<String> {
        match self.role {
            Some(role) => vec![role.as_str().to_string()],
            None => Vec::new(),
        }
    }
}
