//! The access decision engine.
//!
//! For one `(method, CallerContext)` pair the engine evaluates, in order:
//!
//!   Policy lookup → Confirmation → System role → Verbs → Allow
//!
//! Each stage can only deny. `Allow` is reachable only after every stage
//! passes, and an undeclared method never reaches the verb stage at all.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use warden_contracts::{
    decision::{Decision, DenyReason},
    error::{WardenError, WardenResult},
    policy::MethodPolicy,
};

use crate::{context::CallerContext, traits::PolicySource};

/// Namespace used for verb checks when no other is configured.
pub const DEFAULT_NAMESPACE: &str = "default";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Namespace passed to `CapabilityChecker::check_verb`.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

/// Stateless, fail-closed evaluator of method policies.
///
/// Cheap to clone; clones share the same immutable policy source and may be
/// used from any number of threads concurrently.
#[derive(Clone)]
pub struct DecisionEngine {
    policies: Arc<dyn PolicySource>,
    config: EngineConfig,
}

impl DecisionEngine {
    pub fn new(policies: Arc<dyn PolicySource>, config: EngineConfig) -> Self {
        Self { policies, config }
    }

    /// The policy source this engine evaluates against.
    pub fn policies(&self) -> &dyn PolicySource {
        self.policies.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decide whether the caller may invoke `method`.
    ///
    /// Denials are returned as `Ok(Decision::Deny { .. })`. `Err` is reserved
    /// for capability-checker failures other than a refusal, which are
    /// propagated unchanged.
    pub fn decide(&self, method: &str, ctx: &CallerContext) -> WardenResult<Decision> {
        let Some(policy) = self.policies.lookup(method) else {
            error!(method = %method, "no access policy declared for method, denying");
            return Ok(Decision::deny(DenyReason::UndeclaredMethod {
                method: method.to_string(),
            }));
        };
        evaluate(policy, ctx, &self.config.namespace)
    }

    /// Decide and collapse the verdict into a caller-facing result.
    ///
    /// Returns `WardenError::AccessDenied` for any denial,
    /// `WardenError::UndeclaredMethod` for a method with no policy, and
    /// propagates checker failures.
    pub fn authorize(&self, method: &str, ctx: &CallerContext) -> WardenResult<()> {
        self.decide(method, ctx)?.into_result()
    }
}

/// Evaluate one policy against one caller.
///
/// 1. If the admin action state does not satisfy the policy's confirmation
///    requirement → `Deny`, whatever verbs the caller holds.
/// 2. If the policy names a system role:
///    a. caller carries it and the role bypasses verbs → `Allow`.
///    b. caller lacks it and the role is conjunctive → `Deny`.
///    c. otherwise fall through to the verb check.
/// 3. Every required verb must be granted on the policy's resource kind.
///    The first refusal → `Deny` naming the resource/verb pair.
/// 4. `Allow`.
pub fn evaluate(
    policy: &MethodPolicy,
    ctx: &CallerContext,
    namespace: &str,
) -> WardenResult<Decision> {
    debug!(
        method = %policy.method,
        identity = %ctx.identity,
        state = %ctx.admin_action_state,
        "evaluating method policy"
    );

    if !policy.admits(ctx.admin_action_state) {
        warn!(
            method = %policy.method,
            state = %ctx.admin_action_state,
            "admin action confirmation insufficient, denying"
        );
        return Ok(Decision::deny(DenyReason::ConfirmationRequired {
            method: policy.method.clone(),
            state: ctx.admin_action_state,
        }));
    }

    if let Some(role) = policy.system_role {
        let carries_role = ctx.carries_system_role(role);
        if carries_role && policy.system_role_bypasses_verbs {
            debug!(method = %policy.method, role = %role, "builtin role satisfies policy");
            return Ok(Decision::Allow);
        }
        if !carries_role && !policy.system_role_bypasses_verbs {
            warn!(method = %policy.method, role = %role, "required builtin role missing, denying");
            return Ok(Decision::deny(DenyReason::MissingSystemRole {
                method: policy.method.clone(),
                role,
            }));
        }
    }

    for verb in &policy.verbs {
        match ctx.checker.check_verb(namespace, policy.resource, *verb) {
            Ok(()) => {}
            Err(WardenError::AccessDenied { reason }) => {
                warn!(
                    method = %policy.method,
                    resource = %policy.resource,
                    verb = %verb,
                    "required verb not granted, denying"
                );
                return Ok(Decision::deny(DenyReason::MissingVerb {
                    resource: policy.resource,
                    verb: *verb,
                    detail: reason,
                }));
            }
            Err(other) => return Err(other),
        }
    }

    debug!(method = %policy.method, "access allowed");
    Ok(Decision::Allow)
}
