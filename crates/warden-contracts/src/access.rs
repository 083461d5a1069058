//! Closed vocabularies shared by every crate in the workspace.
//!
//! Each enum carries a pure `as_str()` formatting function and a `FromStr`
//! parser. Parsing is case-insensitive and ignores `_` and `-`, so
//! `"MFAVerified"`, `"mfa_verified"` and `"mfa-verified"` are equivalent.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::WardenError;

/// Lowercase `s` and strip separators so display names and snake/kebab case
/// forms compare equal.
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── Verb ─────────────────────────────────────────────────────────────────────

/// An atomic CRUD permission unit.
///
/// Ordering follows declaration order, which keeps verb sets and the subsets
/// enumerated from them deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl Verb {
    /// Every verb, in declaration order.
    pub const ALL: [Verb; 4] = [Verb::Create, Verb::Read, Verb::Update, Verb::Delete];

    /// The lowercase verb name checkers receive, e.g. `"create"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Read => "read",
            Verb::Update => "update",
            Verb::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        Verb::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| WardenError::UnknownValue {
                kind: "verb",
                value: s.to_string(),
            })
    }
}

// ── ResourceKind ─────────────────────────────────────────────────────────────

/// The object class a management method acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "autoupdate_config")]
    AutoUpdateConfig,
    #[serde(rename = "autoupdate_version")]
    AutoUpdateVersion,
    #[serde(rename = "autoupdate_agent_rollout")]
    AutoUpdateAgentRollout,
}

impl ResourceKind {
    /// Every resource kind, in declaration order.
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::AutoUpdateConfig,
        ResourceKind::AutoUpdateVersion,
        ResourceKind::AutoUpdateAgentRollout,
    ];

    /// The kind string used in permission rules, e.g. `"autoupdate_config"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::AutoUpdateConfig => "autoupdate_config",
            ResourceKind::AutoUpdateVersion => "autoupdate_version",
            ResourceKind::AutoUpdateAgentRollout => "autoupdate_agent_rollout",
        }
    }

    /// The CamelCase name used to form method names, e.g. `"AutoUpdateConfig"`.
    pub const fn display_name(self) -> &'static str {
        match self {
            ResourceKind::AutoUpdateConfig => "AutoUpdateConfig",
            ResourceKind::AutoUpdateVersion => "AutoUpdateVersion",
            ResourceKind::AutoUpdateAgentRollout => "AutoUpdateAgentRollout",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        ResourceKind::ALL
            .into_iter()
            .find(|k| normalize(k.as_str()) == wanted || normalize(k.display_name()) == wanted)
            .ok_or_else(|| WardenError::UnknownValue {
                kind: "resource kind",
                value: s.to_string(),
            })
    }
}

// ── AdminActionAuthState ─────────────────────────────────────────────────────

/// How recently and how strongly the caller's session confirmed an
/// administrative action.
///
/// The states are not linearly ordered. `NotRequired` means the deployment
/// does not enforce reconfirmation. The two MFA states both represent a fresh
/// confirmation and differ only in whether it may be reused across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminActionAuthState {
    Unauthorized,
    NotRequired,
    MfaVerified,
    MfaVerifiedWithReuse,
}

impl AdminActionAuthState {
    /// Every state, in declaration order.
    pub const ALL: [AdminActionAuthState; 4] = [
        AdminActionAuthState::Unauthorized,
        AdminActionAuthState::NotRequired,
        AdminActionAuthState::MfaVerified,
        AdminActionAuthState::MfaVerifiedWithReuse,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AdminActionAuthState::Unauthorized => "Unauthorized",
            AdminActionAuthState::NotRequired => "NotRequired",
            AdminActionAuthState::MfaVerified => "MFAVerified",
            AdminActionAuthState::MfaVerifiedWithReuse => "MFAVerifiedWithReuse",
        }
    }
}

impl fmt::Display for AdminActionAuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminActionAuthState {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        AdminActionAuthState::ALL
            .into_iter()
            .find(|st| normalize(st.as_str()) == wanted)
            .ok_or_else(|| WardenError::UnknownValue {
                kind: "admin action auth state",
                value: s.to_string(),
            })
    }
}

// ── SystemRole ───────────────────────────────────────────────────────────────

/// A fixed identity tag reserved for internal service-to-service callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemRole {
    Auth,
    Proxy,
    Node,
}

impl SystemRole {
    pub const ALL: [SystemRole; 3] = [SystemRole::Auth, SystemRole::Proxy, SystemRole::Node];

    /// The role name checkers compare against, e.g. `"Auth"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            SystemRole::Auth => "Auth",
            SystemRole::Proxy => "Proxy",
            SystemRole::Node => "Node",
        }
    }
}

impl fmt::Display for SystemRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SystemRole {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        SystemRole::ALL
            .into_iter()
            .find(|r| normalize(r.as_str()) == wanted)
            .ok_or_else(|| WardenError::UnknownValue {
                kind: "system role",
                value: s.to_string(),
            })
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// Who is calling.
///
/// Human and bot users hold resource verbs through their roles. Builtin
/// identities are internal services tagged with a `SystemRole`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Identity {
    User { name: String },
    Builtin { role: SystemRole },
}

impl Identity {
    pub fn user(name: impl Into<String>) -> Self {
        Identity::User { name: name.into() }
    }

    /// Return true if this identity is the builtin identity for `role`.
    pub fn is_builtin(&self, role: SystemRole) -> bool {
        matches!(self, Identity::Builtin { role: r } if *r == role)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::User { name } => write!(f, "user:{name}"),
            Identity::Builtin { role } => write!(f, "builtin:{role}"),
        }
    }
}
