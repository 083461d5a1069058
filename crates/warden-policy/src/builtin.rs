//! The built-in policy set for the auto-update management surface.
//!
//! Every resource kind exposes Get, Create, Update, Upsert and Delete:
//!
//! - Get needs `read` and accepts any admin action state.
//! - Create, Update and Upsert need fresh confirmation; Upsert needs both
//!   `create` and `update`.
//! - Delete needs `delete` and rejects reused MFA confirmations.
//! - Agent rollout mutators also accept the builtin Auth service identity in
//!   place of verb grants.

use warden_contracts::{
    access::{ResourceKind, SystemRole, Verb},
    policy::MethodPolicy,
};

/// Method policies for one resource kind.
fn crud_policies(kind: ResourceKind, system_role: Option<SystemRole>) -> Vec<MethodPolicy> {
    let policy = |op: &str, verbs: &[Verb]| {
        let method = format!("{op}{}", kind.display_name());
        MethodPolicy::new(method, kind, verbs.iter().copied())
    };
    let mutating = |p: MethodPolicy| match system_role {
        Some(role) => p.with_system_role(role, true),
        None => p,
    };

    vec![
        policy("Get", &[Verb::Read]).read_only(),
        mutating(policy("Create", &[Verb::Create])),
        mutating(policy("Update", &[Verb::Update])),
        mutating(policy("Upsert", &[Verb::Create, Verb::Update])),
        mutating(
            policy("Delete", &[Verb::Delete])
                .without_confirmation_reuse(),
        ),
    ]
}

/// All fifteen auto-update method policies.
pub fn autoupdate_policies() -> Vec<MethodPolicy> {
    let mut policies = crud_policies(ResourceKind::AutoUpdateConfig, None);
    policies.extend(crud_policies(ResourceKind::AutoUpdateVersion, None));
    policies.extend(crud_policies(
        ResourceKind::AutoUpdateAgentRollout,
        Some(SystemRole::Auth),
    ));
    policies
}
