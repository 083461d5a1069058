//! The per-call caller context.

use std::{fmt, sync::Arc};

use warden_contracts::access::{AdminActionAuthState, Identity, SystemRole};

use crate::traits::CapabilityChecker;

/// Everything the engine knows about one caller for one call.
///
/// Constructed fresh by the authorizer, consumed once by the engine, then
/// discarded. Never shared across calls.
#[derive(Clone)]
pub struct CallerContext {
    pub identity: Identity,
    pub checker: Arc<dyn CapabilityChecker>,
    pub admin_action_state: AdminActionAuthState,
}

impl CallerContext {
    pub fn new(
        identity: Identity,
        checker: Arc<dyn CapabilityChecker>,
        admin_action_state: AdminActionAuthState,
    ) -> Self {
        Self {
            identity,
            checker,
            admin_action_state,
        }
    }

    /// Return true if the caller is the builtin identity for `role` and the
    /// checker confirms it holds that role. Both must agree.
    pub fn carries_system_role(&self, role: SystemRole) -> bool {
        self.identity.is_builtin(role) && self.checker.has_system_role(role)
    }
}

impl fmt::Debug for CallerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerContext")
            .field("identity", &self.identity)
            .field("roles", &self.checker.role_names())
            .field("admin_action_state", &self.admin_action_state)
            .finish()
    }
}
