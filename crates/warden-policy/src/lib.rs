//! # warden-policy
//!
//! The immutable method policy table for the WARDEN access engine.
//!
//! ## Overview
//!
//! This crate provides [`PolicyTable`], which implements the
//! [`PolicySource`](warden_core::traits::PolicySource) trait. Tables come
//! from the built-in auto-update policy set or from a TOML file, are
//! validated as a whole, and never change after construction.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use warden_policy::PolicyTable;
//!
//! let table = PolicyTable::from_file(Path::new("policies/autoupdate.toml"))?;
//! let engine = warden_policy::engine_for(table);
//! ```

use std::sync::Arc;

use warden_core::{DecisionEngine, EngineConfig};

pub mod builtin;
pub mod config;
pub mod table;

pub use builtin::autoupdate_policies;
pub use config::PolicyConfig;
pub use table::PolicyTable;

/// The bundled auto-update policy file.
pub const AUTOUPDATE_POLICY_TOML: &str = include_str!("../policies/autoupdate.toml");

/// Build a decision engine over `table`, checking verbs in the table's
/// namespace.
pub fn engine_for(table: PolicyTable) -> DecisionEngine {
    let config = EngineConfig {
        namespace: table.namespace().to_string(),
    };
    DecisionEngine::new(Arc::new(table), config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
