//! Seams between the decision engine and its collaborators.
//!
//! - `CapabilityChecker`: external, answers verb and role questions per call
//! - `Authorizer`: external, builds a `CallerContext` per call
//! - `PolicySource`: trusted, the immutable method → policy map
//!
//! The engine never mutates or caches a checker and never writes to a policy
//! source.

use warden_contracts::{
    access::{ResourceKind, SystemRole, Verb},
    error::WardenResult,
    policy::MethodPolicy,
};

use crate::context::CallerContext;

/// The caller's permission oracle, supplied per call by the authorizer.
///
/// Implementations must be side-effect free from the engine's point of view.
/// If they perform I/O they are responsible for honoring cancellation.
pub trait CapabilityChecker: Send + Sync {
    /// Decide whether the caller holds `verb` on `resource` in `namespace`.
    ///
    /// Return `Ok(())` to grant, `Err(WardenError::AccessDenied { .. })` to
    /// refuse. Any other error is an infrastructure failure and is propagated
    /// to the engine's caller unchanged.
    fn check_verb(&self, namespace: &str, resource: ResourceKind, verb: Verb) -> WardenResult<()>;

    /// Return true if the caller's role set includes the builtin `role`.
    fn has_system_role(&self, role: SystemRole) -> bool;

    /// Names of every role the caller holds, for diagnostics.
    fn role_names(&self) -> Vec<String>;
}

/// Produces the per-call `CallerContext` for an inbound invocation.
///
/// How the admin action auth state is derived (MFA ceremony, reuse window)
/// is the authorizer's concern.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, method: &str) -> WardenResult<CallerContext>;
}

impl<F> Authorizer for F
where
    F: Fn(&str) -> WardenResult<CallerContext> + Send + Sync,
{
    fn authorize(&self, method: &str) -> WardenResult<CallerContext> {
        self(method)
    }
}

/// Read-only access to the method → policy map.
///
/// Built once at service initialization. Implementations must be safe for
/// concurrent reads without locking.
pub trait PolicySource: Send + Sync {
    /// The policy for `method`, or `None` if the method is undeclared.
    fn lookup(&self, method: &str) -> Option<&MethodPolicy>;

    /// Every declared policy, ordered by method name.
    fn policies(&self) -> Vec<&MethodPolicy>;
}
