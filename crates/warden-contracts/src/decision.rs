//! Decision types emitted by the access decision engine.
//!
//! The engine is deny-by-default: anything other than `Decision::Allow`
//! blocks the call. `DenyReason` exists for logs and telemetry. Callers
//! treat every denial uniformly.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    access::{AdminActionAuthState, ResourceKind, SystemRole, Verb},
    error::WardenError,
};

/// Why a call was denied. Diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DenyReason {
    /// No policy is declared for the method.
    UndeclaredMethod { method: String },

    /// The session's admin action state does not satisfy the method.
    ConfirmationRequired {
        method: String,
        state: AdminActionAuthState,
    },

    /// The policy requires a system role in addition to verbs and the caller
    /// does not carry it.
    MissingSystemRole { method: String, role: SystemRole },

    /// The capability checker refused a required verb.
    MissingVerb {
        resource: ResourceKind,
        verb: Verb,
        detail: String,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::UndeclaredMethod { method } => {
                write!(f, "method '{method}' has no declared access policy")
            }
            DenyReason::ConfirmationRequired { method, state } => write!(
                f,
                "method '{method}' requires a fresh admin action confirmation, state is {state}"
            ),
            DenyReason::MissingSystemRole { method, role } => {
                write!(f, "method '{method}' requires the builtin {role} role")
            }
            DenyReason::MissingVerb {
                resource,
                verb,
                detail,
            } => write!(f, "access denied to rule={resource}/verb={verb}: {detail}"),
        }
    }
}

/// The verdict for one `(method, caller)` evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny { reason: DenyReason },
}

impl Decision {
    pub fn deny(reason: DenyReason) -> Self {
        Decision::Deny { reason }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Collapse the decision into the caller-facing result.
    ///
    /// An undeclared method becomes `WardenError::UndeclaredMethod` so the
    /// defect stays visible; every other denial becomes `AccessDenied`.
    pub fn into_result(self) -> Result<(), WardenError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny {
                reason: DenyReason::UndeclaredMethod { method },
            } => Err(WardenError::UndeclaredMethod { method }),
            Decision::Deny { reason } => Err(WardenError::access_denied(reason.to_string())),
        }
    }
}
