//! Per-method authorization policy.
//!
//! A `MethodPolicy` is the immutable record the decision engine evaluates a
//! call against. The policy table is the total map from method name to
//! `MethodPolicy`; a method with no entry is a defect and is always denied.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    access::{AdminActionAuthState, ResourceKind, SystemRole, Verb},
    error::{WardenError, WardenResult},
};

fn yes() -> bool {
    true
}

/// The authorization policy for one management method.
///
/// Deserializes from a `[[methods]]` TOML table:
///
/// ```toml
/// [[methods]]
/// method = "UpsertAutoUpdateVersion"
/// resource = "autoupdate_version"
/// verbs = ["create", "update"]
/// requires_confirmation = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodPolicy {
    /// The RPC method name, e.g. `"GetAutoUpdateConfig"`.
    pub method: String,

    /// The resource kind every verb is checked against.
    pub resource: ResourceKind,

    /// Verbs the caller must hold, all of them. Never empty.
    pub verbs: BTreeSet<Verb>,

    /// When true, an `Unauthorized` admin action state denies the call
    /// regardless of verb grants. Read-only methods set this to false.
    #[serde(default = "yes")]
    pub requires_confirmation: bool,

    /// When false, a reused MFA confirmation does not satisfy a method that
    /// requires confirmation.
    #[serde(default = "yes")]
    pub allow_reused_confirmation: bool,

    /// A builtin role that service-to-service callers present.
    #[serde(default)]
    pub system_role: Option<SystemRole>,

    /// How `system_role` combines with `verbs`.
    ///
    /// - `true`: a caller carrying the role is allowed without verb checks;
    ///   other callers fall through to the verb check.
    /// - `false`: the role is required in addition to every verb.
    #[serde(default)]
    pub system_role_bypasses_verbs: bool,
}

impl MethodPolicy {
    /// A policy requiring confirmation (reuse allowed) and no system role.
    pub fn new(
        method: impl Into<String>,
        resource: ResourceKind,
        verbs: impl IntoIterator<Item = Verb>,
    ) -> Self {
        Self {
            method: method.into(),
            resource,
            verbs: verbs.into_iter().collect(),
            requires_confirmation: true,
            allow_reused_confirmation: true,
            system_role: None,
            system_role_bypasses_verbs: false,
        }
    }

    /// Mark the method read-only: any admin action state is acceptable.
    pub fn read_only(mut self) -> Self {
        self.requires_confirmation = false;
        self
    }

    /// Reject reused MFA confirmations.
    pub fn without_confirmation_reuse(mut self) -> Self {
        self.allow_reused_confirmation = false;
        self
    }

    /// Attach a system role and choose how it combines with the verb check.
    pub fn with_system_role(mut self, role: SystemRole, bypasses_verbs: bool) -> Self {
        self.system_role = Some(role);
        self.system_role_bypasses_verbs = bypasses_verbs;
        self
    }

    /// Return true if `state` satisfies this method's confirmation requirement.
    pub fn admits(&self, state: AdminActionAuthState) -> bool {
        if !self.requires_confirmation {
            return true;
        }
        match state {
            AdminActionAuthState::Unauthorized => false,
            AdminActionAuthState::NotRequired | AdminActionAuthState::MfaVerified => true,
            AdminActionAuthState::MfaVerifiedWithReuse => self.allow_reused_confirmation,
        }
    }

    /// The admin action states this policy admits, in declaration order.
    pub fn admitted_states(&self) -> Vec<AdminActionAuthState> {
        AdminActionAuthState::ALL
            .into_iter()
            .filter(|s| self.admits(*s))
            .collect()
    }

    /// Check structural invariants.
    ///
    /// Returns `WardenError::ConfigError` when the method name is blank, the
    /// verb set is empty, or `system_role_bypasses_verbs` is set without a
    /// `system_role`.
    pub fn validate(&self) -> WardenResult<()> {
        if self.method.trim().is_empty() {
            return Err(WardenError::ConfigError {
                reason: "method policy has an empty method name".to_string(),
            });
        }
        if self.verbs.is_empty() {
            return Err(WardenError::ConfigError {
                reason: format!("method '{}' declares no required verbs", self.method),
            });
        }
        if self.system_role_bypasses_verbs && self.system_role.is_none() {
            return Err(WardenError::ConfigError {
                reason: format!(
                    "method '{}' sets system_role_bypasses_verbs without a system_role",
                    self.method
                ),
            });
        }
        Ok(())
    }
}
