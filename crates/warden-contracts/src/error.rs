//! Error types for the WARDEN access engine.
//!
//! All fallible operations across the workspace return `WardenResult<T>`.
//! Authorization failures surface as exactly one variant, `AccessDenied`;
//! callers branch on it through `WardenError::is_access_denied()` and never
//! by parsing the reason string.

use thiserror::Error;

/// The unified error type for the WARDEN workspace.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WardenError {
    /// The caller may not invoke the method.
    ///
    /// `reason` is a human diagnostic (missing resource/verb pair or an
    /// insufficient confirmation state). It must not drive control flow.
    #[error("access denied: {reason}")]
    AccessDenied { reason: String },

    /// A method was invoked that has no declared access policy.
    ///
    /// This is a defect, not a runtime denial. It always fails closed.
    #[error("method '{method}' has no declared access policy")]
    UndeclaredMethod { method: String },

    /// The capability checker could not answer (e.g. a transient storage
    /// error during a permission lookup). Propagated unchanged.
    #[error("capability check failed: {reason}")]
    CheckerFailed { reason: String },

    /// The requested resource does not exist.
    #[error("{kind} not found")]
    NotFound { kind: String },

    /// A create was attempted for a resource that already exists.
    #[error("{kind} already exists")]
    AlreadyExists { kind: String },

    /// The request payload is missing or malformed.
    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The backing store failed.
    #[error("storage error: {reason}")]
    Storage { reason: String },

    /// A policy file or registry is malformed or inconsistent.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A vocabulary string did not name any known value.
    #[error("unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },

    /// The policy table and the harness cases do not cover the same methods.
    #[error("coverage gap: {reason}")]
    CoverageGap { reason: String },

    /// One or more harness scenarios produced an unexpected verdict.
    #[error("{failures} access scenario(s) failed; first: {first}")]
    HarnessFailed { failures: usize, first: String },
}

impl WardenError {
    /// Build an `AccessDenied` error from any displayable reason.
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    /// Return true for `AccessDenied`, the only authorization failure kind.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }
}

/// Convenience alias used throughout the WARDEN crates.
pub type WardenResult<T> = Result<T, WardenError>;
