//! # warden-verify
//!
//! Exhaustive verification of the WARDEN access decision engine.
//!
//! This crate provides [`harness::Harness`], which expands declared
//! [`case::AccessCase`]s into every combination of admin action state,
//! granted verb subset, and builtin role presence, evaluates each one, and
//! compares the verdict with the declared expectation. Before any scenario
//! runs it checks that the policy table and the cases name exactly the same
//! methods, so a method added without a matching policy or case fails loudly.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use warden_verify::{autoupdate_cases, Harness};
//!
//! let engine = warden_policy::engine_for(PolicyTable::builtin()?);
//! let report = Harness::new(engine, autoupdate_cases()).run()?.into_result()?;
//! println!("{} scenarios passed", report.scenarios_run);
//! ```

pub mod case;
pub mod checker;
pub mod harness;

pub use case::{autoupdate_cases, AccessCase};
pub use checker::ScenarioChecker;
pub use harness::{coverage, CoverageReport, Harness, HarnessReport, Outcome, Scenario};

// ── Tests ─────────────────────────────────────────────────────────────────────
