//! Declared access expectations.
//!
//! An `AccessCase` states, independently of any policy table, which verbs a
//! method needs, which admin action states it accepts, and which builtin
//! role may stand in for verbs. The harness checks the engine's verdicts
//! against these declarations.

use serde::{Deserialize, Serialize};

use warden_contracts::{
    access::{AdminActionAuthState, SystemRole, Verb},
    policy::MethodPolicy,
};

use AdminActionAuthState::{MfaVerified, MfaVerifiedWithReuse, NotRequired};

/// The expected access behaviour of one method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCase {
    pub method: String,
    /// Every verb the method needs. Subsets of these are enumerated.
    pub verbs: Vec<Verb>,
    /// States in which the full verb set is accepted.
    pub allowed_states: Vec<AdminActionAuthState>,
    pub system_role: Option<SystemRole>,
    /// True when carrying `system_role` replaces the verb check, false when
    /// it is required alongside it.
    pub system_role_bypasses_verbs: bool,
}

impl AccessCase {
    pub fn new(method: &str, verbs: &[Verb], allowed_states: &[AdminActionAuthState]) -> Self {
        Self {
            method: method.to_string(),
            verbs: verbs.to_vec(),
            allowed_states: allowed_states.to_vec(),
            system_role: None,
            system_role_bypasses_verbs: false,
        }
    }

    pub fn with_builtin_role(mut self, role: SystemRole) -> Self {
        self.system_role = Some(role);
        self.system_role_bypasses_verbs = true;
        self
    }

    /// Derive a case from a policy, for tables with no hand-written cases.
    pub fn from_policy(policy: &MethodPolicy) -> Self {
        Self {
            method: policy.method.clone(),
            verbs: policy.verbs.iter().copied().collect(),
            allowed_states: policy.admitted_states(),
            system_role: policy.system_role,
            system_role_bypasses_verbs: policy.system_role_bypasses_verbs,
        }
    }

    /// The verdict this case predicts for a caller in `state` holding
    /// exactly `granted`, optionally carrying the builtin role.
    pub fn expects_allow(
        &self,
        state: AdminActionAuthState,
        granted: &[Verb],
        carries_role: bool,
    ) -> bool {
        if !self.allowed_states.contains(&state) {
            return false;
        }
        let all_verbs = self.verbs.iter().all(|v| granted.contains(v));
        match self.system_role {
            None => all_verbs,
            Some(_) if self.system_role_bypasses_verbs => carries_role || all_verbs,
            Some(_) => carries_role && all_verbs,
        }
    }
}

const READS: &[AdminActionAuthState] = &AdminActionAuthState::ALL;
const WRITES: &[AdminActionAuthState] = &[NotRequired, MfaVerified, MfaVerifiedWithReuse];
const DELETES: &[AdminActionAuthState] = &[NotRequired, MfaVerified];

/// Hand-declared cases for every auto-update management method.
pub fn autoupdate_cases() -> Vec<AccessCase> {
    use Verb::{Create, Delete, Read, Update};

    vec![
        // AutoUpdate config.
        AccessCase::new("CreateAutoUpdateConfig", &[Create], WRITES),
        AccessCase::new("UpdateAutoUpdateConfig", &[Update], WRITES),
        AccessCase::new("UpsertAutoUpdateConfig", &[Update, Create], WRITES),
        AccessCase::new("GetAutoUpdateConfig", &[Read], READS),
        AccessCase::new("DeleteAutoUpdateConfig", &[Delete], DELETES),
        // AutoUpdate version.
        AccessCase::new("CreateAutoUpdateVersion", &[Create], WRITES),
        AccessCase::new("UpdateAutoUpdateVersion", &[Update], WRITES),
        AccessCase::new("UpsertAutoUpdateVersion", &[Update, Create], WRITES),
        AccessCase::new("GetAutoUpdateVersion", &[Read], READS),
        AccessCase::new("DeleteAutoUpdateVersion", &[Delete], DELETES),
        // AutoUpdate agent rollout.
        AccessCase::new("GetAutoUpdateAgentRollout", &[Read], READS),
        AccessCase::new("CreateAutoUpdateAgentRollout", &[Create], WRITES)
            .with_builtin_role(SystemRole::Auth),
        AccessCase::new("UpdateAutoUpdateAgentRollout", &[Update], WRITES)
            .with_builtin_role(SystemRole::Auth),
        AccessCase::new("UpsertAutoUpdateAgentRollout", &[Update, Create], WRITES)
            .with_builtin_role(SystemRole::Auth),
        AccessCase::new("DeleteAutoUpdateAgentRollout", &[Delete], DELETES)
            .with_builtin_role(SystemRole::Auth),
    ]
}
