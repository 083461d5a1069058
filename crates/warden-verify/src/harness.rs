//! The exhaustive access-scenario harness.
//!
//! `Harness` drives a `DecisionEngine` through the full cross product of
//!
//!   declared case × admin action state × granted verb subset × role presence
//!
//! and compares every verdict with what the case predicts. It runs in two
//! phases:
//!
//! 1. **Coverage**: the methods in the policy table must equal the methods
//!    with a declared case. Any gap stops the run before a single scenario
//!    executes.
//! 2. **Scenarios**: every scenario is evaluated and all mismatches are
//!    collected so the full failure set is visible in one report.

use std::{collections::BTreeSet, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use warden_contracts::{
    access::{AdminActionAuthState, Identity, SystemRole, Verb},
    error::{WardenError, WardenResult},
};
use warden_core::{combinations, CallerContext, DecisionEngine};

use crate::{case::AccessCase, checker::ScenarioChecker};

/// The observable result of one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Allowed,
    Denied,
}

impl Outcome {
    pub fn from_allowed(allowed: bool) -> Self {
        if allowed {
            Outcome::Allowed
        } else {
            Outcome::Denied
        }
    }
}

/// One point in the cross product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub method: String,
    pub state: AdminActionAuthState,
    /// Exactly the verbs the synthetic checker grants.
    pub granted: Vec<Verb>,
    /// The builtin role the caller carries, if any.
    pub role: Option<SystemRole>,
    pub expected: Outcome,
}

impl Scenario {
    /// Build the caller context this scenario describes.
    ///
    /// A caller carrying a role is the builtin identity for that role; any
    /// other caller is a plain user.
    pub fn caller(&self) -> CallerContext {
        let identity = match self.role {
            Some(role) => Identity::Builtin { role },
            None => Identity::user("alice"),
        };
        CallerContext::new(
            identity,
            Arc::new(ScenarioChecker::new(&self.granted, self.role)),
            self.state,
        )
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verbs: Vec<&str> = self.granted.iter().map(|v| v.as_str()).collect();
        let verbs = verbs.join(",");
        write!(f, "{}/{}/verbs=[{verbs}]", self.method, self.state)?;
        if let Some(role) = self.role {
            write!(f, "/role={role}")?;
        }
        Ok(())
    }
}

/// A scenario whose verdict differed from the prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioFailure {
    pub scenario: String,
    pub expected: Outcome,
    pub actual: Outcome,
}

/// Symmetric difference between declared policies and declared cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Methods in the policy table with no case.
    pub untested_methods: Vec<String>,
    /// Cases naming a method the policy table does not declare.
    pub unknown_cases: Vec<String>,
    /// Methods declared by more than one case.
    pub duplicate_cases: Vec<String>,
}

impl CoverageReport {
    pub fn is_complete(&self) -> bool {
        self.untested_methods.is_empty()
            && self.unknown_cases.is_empty()
            && self.duplicate_cases.is_empty()
    }
}

/// Compare two method name sets.
pub fn coverage<'a>(
    declared: impl IntoIterator<Item = &'a str>,
    covered: impl IntoIterator<Item = &'a str>,
) -> CoverageReport {
    let declared: BTreeSet<&str> = declared.into_iter().collect();
    let mut seen = BTreeSet::new();
    let mut duplicates = BTreeSet::new();
    for method in covered {
        if !seen.insert(method) {
            duplicates.insert(method);
        }
    }
    CoverageReport {
        untested_methods: declared.difference(&seen).map(|m| m.to_string()).collect(),
        unknown_cases: seen.difference(&declared).map(|m| m.to_string()).collect(),
        duplicate_cases: duplicates.into_iter().map(str::to_string).collect(),
    }
}

/// The outcome of a harness run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessReport {
    pub scenarios_run: usize,
    pub failures: Vec<ScenarioFailure>,
    pub coverage: CoverageReport,
}

impl HarnessReport {
    /// True only when coverage is complete and every scenario matched.
    pub fn passed(&self) -> bool {
        self.coverage.is_complete() && self.failures.is_empty()
    }

    /// Convert a failing report into an error.
    ///
    /// Coverage gaps take precedence over scenario failures.
    pub fn into_result(self) -> WardenResult<HarnessReport> {
        if !self.coverage.is_complete() {
            let c = &self.coverage;
            return Err(WardenError::CoverageGap {
                reason: format!(
                    "untested methods {:?}, cases for undeclared methods {:?}, \
                     duplicate cases {:?}",
                    c.untested_methods, c.unknown_cases, c.duplicate_cases
                ),
            });
        }
        if let Some(first) = self.failures.first() {
            return Err(WardenError::HarnessFailed {
                failures: self.failures.len(),
                first: format!(
                    "{} expected {:?}, got {:?}",
                    first.scenario, first.expected, first.actual
                ),
            });
        }
        Ok(self)
    }
}

/// Drives a decision engine through every declared scenario.
pub struct Harness {
    engine: DecisionEngine,
    cases: Vec<AccessCase>,
}

impl Harness {
    pub fn new(engine: DecisionEngine, cases: Vec<AccessCase>) -> Self {
        Self { engine, cases }
    }

    /// A harness whose cases are derived from the engine's own policies.
    ///
    /// Only checks that the engine follows its own table: coverage is
    /// complete by construction and every expectation restates a policy.
    /// Prefer `with_known_cases` when hand-written cases exist.
    pub fn derived(engine: DecisionEngine) -> Self {
        let cases = engine
            .policies()
            .policies()
            .into_iter()
            .map(AccessCase::from_policy)
            .collect();
        Self::new(engine, cases)
    }

    /// Check the engine against `known` whenever its table declares any of
    /// the known methods, so a table that drops or weakens one of them
    /// fails. A table sharing no method with `known` falls back to
    /// `derived`.
    pub fn with_known_cases(engine: DecisionEngine, known: Vec<AccessCase>) -> Self {
        let overlaps = known
            .iter()
            .any(|c| engine.policies().lookup(&c.method).is_some());
        if overlaps {
            Self::new(engine, known)
        } else {
            warn!("no known case matches the policy table, deriving");
            Self::derived(engine)
        }
    }

    pub fn cases(&self) -> &[AccessCase] {
        &self.cases
    }

    pub fn coverage(&self) -> CoverageReport {
        let declared: Vec<&str> = self
            .engine
            .policies()
            .policies()
            .into_iter()
            .map(|p| p.method.as_str())
            .collect();
        coverage(declared, self.cases.iter().map(|c| c.method.as_str()))
    }

    /// Expand every case into its scenarios.
    ///
    /// The role axis covers the role the case declares and the role the
    /// policy under test names, so a role the table grants by mistake is
    /// still exercised by a builtin caller.
    pub fn scenarios(&self) -> Vec<Scenario> {
        let mut scenarios = Vec::new();
        for case in &self.cases {
            let policy_role = self
                .engine
                .policies()
                .lookup(&case.method)
                .and_then(|p| p.system_role);
            let mut roles: Vec<Option<SystemRole>> = vec![None];
            for role in [case.system_role, policy_role].into_iter().flatten() {
                if !roles.contains(&Some(role)) {
                    roles.push(Some(role));
                }
            }

            for state in AdminActionAuthState::ALL {
                for granted in combinations(&case.verbs) {
                    for role in &roles {
                        let carries_role = role.is_some() && *role == case.system_role;
                        let allowed = case.expects_allow(state, &granted, carries_role);
                        let expected = Outcome::from_allowed(allowed);
                        scenarios.push(Scenario {
                            method: case.method.clone(),
                            state,
                            granted: granted.clone(),
                            role: *role,
                            expected,
                        });
                    }
                }
            }
        }
        scenarios
    }

    /// Run every scenario against the engine directly.
    pub fn run(&self) -> WardenResult<HarnessReport> {
        let engine = self.engine.clone();
        self.run_with(move |scenario, ctx| {
            let decision = engine.decide(&scenario.method, &ctx)?;
            Ok(Outcome::from_allowed(decision.is_allowed()))
        })
    }

    /// Run every scenario through `call`, which performs the invocation
    /// however the caller chooses (engine, service dispatch, ...) and reports
    /// whether it was allowed.
    ///
    /// Errors from `call` abort the run and are returned unchanged.
    pub fn run_with<F>(&self, call: F) -> WardenResult<HarnessReport>
    where
        F: Fn(&Scenario, CallerContext) -> WardenResult<Outcome>,
    {
        let coverage = self.coverage();
        if !coverage.is_complete() {
            error!(
                untested = ?coverage.untested_methods,
                unknown = ?coverage.unknown_cases,
                duplicates = ?coverage.duplicate_cases,
                "policy table and access cases disagree, not running scenarios"
            );
            return Ok(HarnessReport {
                scenarios_run: 0,
                failures: Vec::new(),
                coverage,
            });
        }

        let scenarios = self.scenarios();
        let mut failures = Vec::new();
        for scenario in &scenarios {
            let actual = call(scenario, scenario.caller())?;
            debug!(scenario = %scenario, ?actual, "scenario evaluated");
            if actual != scenario.expected {
                warn!(
                    scenario = %scenario,
                    expected = ?scenario.expected,
                    ?actual,
                    "scenario verdict mismatch"
                );
                failures.push(ScenarioFailure {
                    scenario: scenario.to_string(),
                    expected: scenario.expected,
                    actual,
                });
            }
        }

        info!(
            cases = self.cases.len(),
            scenarios = scenarios.len(),
            failures = failures.len(),
            "access harness complete"
        );

        Ok(HarnessReport {
            scenarios_run: scenarios.len(),
            failures,
            coverage,
        })
    }

    /// Run every scenario against the engine, spread over `workers` threads.
    ///
    /// Scenarios are independent; the report lists failures in scenario
    /// order regardless of which worker evaluated them.
    pub fn run_concurrent(&self, workers: usize) -> WardenResult<HarnessReport> {
        let coverage = self.coverage();
        if !coverage.is_complete() {
            return self.run();
        }

        let scenarios = self.scenarios();
        let chunk_size = scenarios.len().div_ceil(workers.max(1)).max(1);

        let chunk_results: Vec<WardenResult<Vec<ScenarioFailure>>> = std::thread::scope(|scope| {
            let handles: Vec<_> = scenarios
                .chunks(chunk_size)
                .map(|chunk| {
                    let engine = self.engine.clone();
                    scope.spawn(move || -> WardenResult<Vec<ScenarioFailure>> {
                        let mut failures = Vec::new();
                        for scenario in chunk {
                            let decision = engine.decide(&scenario.method, &scenario.caller())?;
                            let actual = Outcome::from_allowed(decision.is_allowed());
                            if actual != scenario.expected {
                                failures.push(ScenarioFailure {
                                    scenario: scenario.to_string(),
                                    expected: scenario.expected,
                                    actual,
                                });
                            }
                        }
                        Ok(failures)
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(WardenError::HarnessFailed {
                            failures: 1,
                            first: "scenario worker panicked".to_string(),
                        })
                    })
                })
                .collect()
        });

        let mut failures = Vec::new();
        for result in chunk_results {
            failures.extend(result?);
        }

        info!(
            workers,
            scenarios = scenarios.len(),
            failures = failures.len(),
            "concurrent access harness complete"
        );

        Ok(HarnessReport {
            scenarios_run: scenarios.len(),
            failures,
            coverage,
        })
    }
}
