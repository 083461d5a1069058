//! WARDEN command line.
//!
//! Inspects a method policy table, evaluates a single call against it with a
//! synthetic capability checker, or runs the exhaustive access harness.
//!
//! Usage:
//!   warden methods
//!   warden check --method DeleteAutoUpdateVersion --state mfa_verified --verbs delete
//!   warden check --method CreateAutoUpdateAgentRollout --state not_required --system-role auth
//!   warden verify --policy policies/autoupdate.toml --json
//!
//! Exit codes: 0 success or allow, 1 error or harness failure, 2 deny.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use warden_contracts::{
    access::{AdminActionAuthState, Identity, SystemRole, Verb},
    decision::Decision,
    error::{WardenError, WardenResult},
};
use warden_core::{CallerContext, DecisionEngine, EngineConfig};
use warden_policy::PolicyTable;
use warden_verify::{autoupdate_cases, Harness, ScenarioChecker};

// ── CLI definition ────────────────────────────────────────────────────────────

/// WARDEN: per-method access decisions for administrative RPCs.
#[derive(Parser)]
#[command(
    name = "warden",
    about = "Inspect and verify WARDEN method access policies",
    long_about = "Lists method policies, evaluates a single call against a policy table,\n\
                  and runs the exhaustive access harness over every confirmation state,\n\
                  verb subset, and builtin role."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every method in the policy table.
    Methods {
        /// Policy TOML file. Defaults to the built-in auto-update table.
        #[arg(long)]
        policy: Option<PathBuf>,
    },
    /// Evaluate one call with a caller holding exactly the given verbs.
    Check {
        #[arg(long)]
        method: String,
        /// Admin action auth state, e.g. `mfa_verified` or `MFAVerifiedWithReuse`.
        #[arg(long)]
        state: AdminActionAuthState,
        /// Granted verbs, comma separated.
        #[arg(long, value_delimiter = ',')]
        verbs: Vec<Verb>,
        /// Call as the builtin identity for this role.
        #[arg(long)]
        system_role: Option<SystemRole>,
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Namespace passed to the verb checks. Defaults to the table's.
        #[arg(long)]
        namespace: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Run the exhaustive access harness.
    ///
    /// Any table declaring auto-update methods is checked against the
    /// hand-declared auto-update cases, so a dropped or weakened method
    /// fails. Other tables are checked against cases derived from
    /// themselves.
    Verify {
        #[arg(long)]
        policy: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    // RUST_LOG=debug shows every evaluation step.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Methods { policy } => run_methods(policy),
        Command::Check {
            method,
            state,
            verbs,
            system_role,
            policy,
            namespace,
            json,
        } => run_check(&method, state, &verbs, system_role, policy, namespace, json),
        Command::Verify { policy, json } => run_verify(policy, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("warden: {}", e);
            ExitCode::from(1)
        }
    }
}

fn load_table(policy: Option<PathBuf>) -> WardenResult<PolicyTable> {
    match policy {
        Some(path) => {
            debug!(path = %path.display(), "loading policy file");
            PolicyTable::from_file(&path)
        }
        None => PolicyTable::builtin(),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> WardenResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| WardenError::ConfigError {
        reason: format!("failed to serialize output: {}", e),
    })
}

// ── Subcommands ───────────────────────────────────────────────────────────────

fn run_methods(policy: Option<PathBuf>) -> WardenResult<ExitCode> {
    let table = load_table(policy)?;
    println!("namespace: {}", table.namespace());
    println!(
        "{:<32} {:<26} {:<22} {:<14} {}",
        "METHOD", "RESOURCE", "VERBS", "CONFIRMATION", "ROLE"
    );
    for p in table.iter() {
        let verbs: Vec<&str> = p.verbs.iter().map(|v| v.as_str()).collect();
        let confirmation = match (p.requires_confirmation, p.allow_reused_confirmation) {
            (false, _) => "none",
            (true, true) => "mfa",
            (true, false) => "fresh mfa",
        };
        let role = match p.system_role {
            Some(role) if p.system_role_bypasses_verbs => format!("{role} (or verbs)"),
            Some(role) => format!("{role} (and verbs)"),
            None => "-".to_string(),
        };
        println!(
            "{:<32} {:<26} {:<22} {:<14} {}",
            p.method,
            p.resource.as_str(),
            verbs.join(","),
            confirmation,
            role
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn run_check(
    method: &str,
    state: AdminActionAuthState,
    verbs: &[Verb],
    system_role: Option<SystemRole>,
    policy: Option<PathBuf>,
    namespace: Option<String>,
    json: bool,
) -> WardenResult<ExitCode> {
    let table = load_table(policy)?;
    let config = EngineConfig {
        namespace: namespace.unwrap_or_else(|| table.namespace().to_string()),
    };
    let engine = DecisionEngine::new(Arc::new(table), config);

    let identity = match system_role {
        Some(role) => Identity::Builtin { role },
        None => Identity::user("cli"),
    };
    let ctx = CallerContext::new(
        identity,
        Arc::new(ScenarioChecker::new(verbs, system_role)),
        state,
    );

    let decision = engine.decide(method, &ctx)?;
    if json {
        println!("{}", to_json(&decision)?);
    } else {
        match &decision {
            Decision::Allow => println!("ALLOW {method}"),
            Decision::Deny { reason } => println!("DENY  {method}: {reason}"),
        }
    }

    Ok(if decision.is_allowed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Tables declaring any auto-update method are held to the hand-written
/// auto-update cases; anything else is checked against itself.
fn verify_harness(table: PolicyTable) -> Harness {
    Harness::with_known_cases(warden_policy::engine_for(table), autoupdate_cases())
}

fn run_verify(policy: Option<PathBuf>, json: bool) -> WardenResult<ExitCode> {
    let harness = verify_harness(load_table(policy)?);

    let report = harness.run()?;
    if json {
        println!("{}", to_json(&report)?);
    } else {
        println!(
            "{} cases, {} scenarios, {} failures",
            harness.cases().len(),
            report.scenarios_run,
            report.failures.len()
        );
        for failure in &report.failures {
            println!(
                "  FAIL {}: expected {:?}, got {:?}",
                failure.scenario, failure.expected, failure.actual
            );
        }
    }

    match report.into_result() {
        Ok(_) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("warden: {}", e);
            Ok(ExitCode::from(1))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
