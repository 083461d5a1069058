//! # warden-core
//!
//! The fail-closed access decision engine for administrative configuration
//! methods.
//!
//! This crate provides:
//! - The collaborator traits (`CapabilityChecker`, `Authorizer`, `PolicySource`)
//! - `CallerContext`, the per-call input to a decision
//! - `DecisionEngine`, which evaluates a method policy against a caller
//! - `combinations`, the powerset enumerator used for exhaustive coverage
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_core::{DecisionEngine, EngineConfig};
//!
//! let engine = DecisionEngine::new(policies, EngineConfig::default());
//! engine.authorize("GetAutoUpdateConfig", &ctx)?;
//! ```

pub mod combinations;
pub mod context;
pub mod engine;
pub mod traits;

pub use combinations::combinations;
pub use context::CallerContext;
pub use engine::{DecisionEngine, EngineConfig, DEFAULT_NAMESPACE};

#[cfg(test)]
mod tests {
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    use warden_contracts::{
        access::{AdminActionAuthState, Identity, ResourceKind, SystemRole, Verb},
        decision::{Decision, DenyReason},
        error::{WardenError, WardenResult},
        policy::MethodPolicy,
    };

    use crate::{
        context::CallerContext,
        engine::{DecisionEngine, EngineConfig},
        traits::{Authorizer, CapabilityChecker, PolicySource},
    };

    // ── Mock collaborators ───────────────────────────────────────────────────

    struct MapPolicies(BTreeMap<String, MethodPolicy>);

    impl PolicySource for MapPolicies {
        fn lookup(&self, method: &str) -> Option<&MethodPolicy> {
            self.0.get(method)
        }

        fn policies(&self) -> Vec<&MethodPolicy> {
            self.0.values().collect()
        }
    }

    /// A checker that grants a fixed verb set and records every query.
    struct MockChecker {
        granted: Vec<Verb>,
        role: Option<SystemRole>,
        fail_with: Option<WardenError>,
        queries: Arc<Mutex<Vec<(String, ResourceKind, Verb)>>>,
    }

    impl MockChecker {
        fn granting(granted: &[Verb]) -> Self {
            Self {
                granted: granted.to_vec(),
                role: None,
                fail_with: None,
                queries: Arc::new(Mutex::new(vec![])),
            }
        }

        fn with_role(mut self, role: SystemRole) -> Self {
            self.role = Some(role);
            self
        }
    }

    impl CapabilityChecker for MockChecker {
        fn check_verb(
            &self,
            namespace: &str,
            resource: ResourceKind,
            verb: Verb,
        ) -> WardenResult<()> {
            self.queries
                .lock()
                .unwrap()
                .push((namespace.to_string(), resource, verb));
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            if self.granted.contains(&verb) {
                Ok(())
            } else {
                Err(WardenError::access_denied(format!(
                    "access denied to rule={resource}/verb={verb}"
                )))
            }
        }

        fn has_system_role(&self, role: SystemRole) -> bool {
            self.role == Some(role)
        }

        fn role_names(&self) -> Vec<String> {
            self.role.iter().map(|r| r.as_str().to_string()).collect()
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn policies() -> Vec<MethodPolicy> {
        vec![
            MethodPolicy::new(
                "GetAutoUpdateConfig",
                ResourceKind::AutoUpdateConfig,
                [Verb::Read],
            )
            .read_only(),
            MethodPolicy::new(
                "DeleteAutoUpdateConfig",
                ResourceKind::AutoUpdateConfig,
                [Verb::Delete],
            )
            .without_confirmation_reuse(),
            MethodPolicy::new(
                "UpsertAutoUpdateVersion",
                ResourceKind::AutoUpdateVersion,
                [Verb::Create, Verb::Update],
            ),
            MethodPolicy::new(
                "CreateAutoUpdateAgentRollout",
                ResourceKind::AutoUpdateAgentRollout,
                [Verb::Create],
            )
            .with_system_role(SystemRole::Auth, true),
            MethodPolicy::new(
                "UpdateAutoUpdateAgentRollout",
                ResourceKind::AutoUpdateAgentRollout,
                [Verb::Update],
            )
            .with_system_role(SystemRole::Auth, false),
        ]
    }

    fn engine() -> DecisionEngine {
        let map = policies()
            .into_iter()
            .map(|p| (p.method.clone(), p))
            .collect();
        DecisionEngine::new(Arc::new(MapPolicies(map)), EngineConfig::default())
    }

    fn user_ctx(checker: MockChecker, state: AdminActionAuthState) -> CallerContext {
        CallerContext::new(Identity::user("alice"), Arc::new(checker), state)
    }

    fn builtin_ctx(checker: MockChecker, state: AdminActionAuthState) -> CallerContext {
        CallerContext::new(
            Identity::Builtin {
                role: SystemRole::Auth,
            },
            Arc::new(checker),
            state,
        )
    }

    fn is_allowed(method: &str, ctx: &CallerContext) -> bool {
        engine().decide(method, ctx).unwrap().is_allowed()
    }

    // ── 1. undeclared methods fail closed ────────────────────────────────────

    #[test]
    fn test_undeclared_method_denied() {
        let ctx = user_ctx(
            MockChecker::granting(&Verb::ALL),
            AdminActionAuthState::MfaVerified,
        );
        let decision = engine().decide("FrobnicateAutoUpdateConfig", &ctx).unwrap();
        match decision {
            Decision::Deny {
                reason: DenyReason::UndeclaredMethod { method },
            } => assert_eq!(method, "FrobnicateAutoUpdateConfig"),
            other => panic!("expected UndeclaredMethod denial, got {:?}", other),
        }

        match engine().authorize("FrobnicateAutoUpdateConfig", &ctx) {
            Err(WardenError::UndeclaredMethod { .. }) => {}
            other => panic!("expected UndeclaredMethod error, got {:?}", other),
        }
    }

    // ── 2. scenario A: delete requires fresh, non-reused confirmation ────────

    #[test]
    fn test_delete_config_scenario() {
        let allowed = user_ctx(
            MockChecker::granting(&[Verb::Delete]),
            AdminActionAuthState::MfaVerified,
        );
        assert!(is_allowed("DeleteAutoUpdateConfig", &allowed));

        let no_verbs = user_ctx(
            MockChecker::granting(&[]),
            AdminActionAuthState::MfaVerified,
        );
        assert!(!is_allowed("DeleteAutoUpdateConfig", &no_verbs));

        let unconfirmed = user_ctx(
            MockChecker::granting(&[Verb::Delete]),
            AdminActionAuthState::Unauthorized,
        );
        assert!(!is_allowed("DeleteAutoUpdateConfig", &unconfirmed));

        let reused = user_ctx(
            MockChecker::granting(&[Verb::Delete]),
            AdminActionAuthState::MfaVerifiedWithReuse,
        );
        assert!(!is_allowed("DeleteAutoUpdateConfig", &reused));
    }

    /// An unconfirmed session is denied before any verb is queried.
    #[test]
    fn test_confirmation_checked_before_verbs() {
        let checker = MockChecker::granting(&Verb::ALL);
        let queries = Arc::clone(&checker.queries);
        let ctx = user_ctx(checker, AdminActionAuthState::Unauthorized);

        match engine().decide("DeleteAutoUpdateConfig", &ctx).unwrap() {
            Decision::Deny {
                reason: DenyReason::ConfirmationRequired { state, .. },
            } => assert_eq!(state, AdminActionAuthState::Unauthorized),
            other => panic!("expected ConfirmationRequired, got {:?}", other),
        }
        assert!(queries.lock().unwrap().is_empty());
    }

    // ── 3. scenario B: upsert needs every verb ───────────────────────────────

    #[test]
    fn test_upsert_requires_all_verbs() {
        let partial = user_ctx(
            MockChecker::granting(&[Verb::Create]),
            AdminActionAuthState::NotRequired,
        );
        match engine().decide("UpsertAutoUpdateVersion", &partial).unwrap() {
            Decision::Deny {
                reason: DenyReason::MissingVerb { resource, verb, .. },
            } => {
                assert_eq!(resource, ResourceKind::AutoUpdateVersion);
                assert_eq!(verb, Verb::Update);
            }
            other => panic!("expected MissingVerb, got {:?}", other),
        }

        let full = user_ctx(
            MockChecker::granting(&[Verb::Create, Verb::Update]),
            AdminActionAuthState::NotRequired,
        );
        assert!(is_allowed("UpsertAutoUpdateVersion", &full));
    }

    #[test]
    fn test_verbs_checked_in_configured_namespace() {
        let checker = MockChecker::granting(&[Verb::Create, Verb::Update]);
        let queries = Arc::clone(&checker.queries);
        let ctx = user_ctx(checker, AdminActionAuthState::MfaVerified);

        let map = policies()
            .into_iter()
            .map(|p| (p.method.clone(), p))
            .collect();
        let engine = DecisionEngine::new(
            Arc::new(MapPolicies(map)),
            EngineConfig {
                namespace: "tenant-a".to_string(),
            },
        );
        engine.authorize("UpsertAutoUpdateVersion", &ctx).unwrap();

        let queries = queries.lock().unwrap();
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|(ns, kind, _)| ns == "tenant-a"
            && *kind == ResourceKind::AutoUpdateVersion));
    }

    // ── 4. scenario C: reads ignore confirmation ─────────────────────────────

    #[test]
    fn test_read_allows_unauthorized_state() {
        let ctx = user_ctx(
            MockChecker::granting(&[Verb::Read]),
            AdminActionAuthState::Unauthorized,
        );
        assert!(is_allowed("GetAutoUpdateConfig", &ctx));

        for state in AdminActionAuthState::ALL {
            let ctx = user_ctx(MockChecker::granting(&[]), state);
            assert!(!is_allowed("GetAutoUpdateConfig", &ctx), "state {state}");
        }
    }

    // ── 5. scenario D: builtin role as an alternative to verbs ───────────────

    #[test]
    fn test_builtin_role_bypasses_verbs() {
        let service = builtin_ctx(
            MockChecker::granting(&[]).with_role(SystemRole::Auth),
            AdminActionAuthState::NotRequired,
        );
        assert!(is_allowed("CreateAutoUpdateAgentRollout", &service));

        let user = user_ctx(
            MockChecker::granting(&[]),
            AdminActionAuthState::NotRequired,
        );
        assert!(!is_allowed("CreateAutoUpdateAgentRollout", &user));

        let user_with_verb = user_ctx(
            MockChecker::granting(&[Verb::Create]),
            AdminActionAuthState::NotRequired,
        );
        assert!(is_allowed("CreateAutoUpdateAgentRollout", &user_with_verb));
    }

    /// A user identity is not a builtin caller even if the checker claims
    /// the role.
    #[test]
    fn test_role_requires_builtin_identity() {
        let ctx = user_ctx(
            MockChecker::granting(&[]).with_role(SystemRole::Auth),
            AdminActionAuthState::NotRequired,
        );
        assert!(!is_allowed("CreateAutoUpdateAgentRollout", &ctx));
    }

    #[test]
    fn test_builtin_role_still_needs_confirmation() {
        let service = builtin_ctx(
            MockChecker::granting(&[]).with_role(SystemRole::Auth),
            AdminActionAuthState::Unauthorized,
        );
        assert!(!is_allowed("CreateAutoUpdateAgentRollout", &service));
    }

    // ── 6. conjunctive role ──────────────────────────────────────────────────

    #[test]
    fn test_conjunctive_role_requires_role_and_verbs() {
        let state = AdminActionAuthState::MfaVerified;

        let user = user_ctx(MockChecker::granting(&[Verb::Update]), state);
        match engine().decide("UpdateAutoUpdateAgentRollout", &user).unwrap() {
            Decision::Deny {
                reason: DenyReason::MissingSystemRole { role, .. },
            } => assert_eq!(role, SystemRole::Auth),
            other => panic!("expected MissingSystemRole, got {:?}", other),
        }

        let role_only = builtin_ctx(
            MockChecker::granting(&[]).with_role(SystemRole::Auth),
            state,
        );
        assert!(!is_allowed("UpdateAutoUpdateAgentRollout", &role_only));

        let both = builtin_ctx(
            MockChecker::granting(&[Verb::Update]).with_role(SystemRole::Auth),
            state,
        );
        assert!(is_allowed("UpdateAutoUpdateAgentRollout", &both));
    }

    // ── 7. checker failures propagate ────────────────────────────────────────

    #[test]
    fn test_checker_failure_propagates_unchanged() {
        let mut checker = MockChecker::granting(&Verb::ALL);
        checker.fail_with = Some(WardenError::CheckerFailed {
            reason: "role cache unavailable".to_string(),
        });
        let ctx = user_ctx(checker, AdminActionAuthState::MfaVerified);

        match engine().authorize("UpsertAutoUpdateVersion", &ctx) {
            Err(WardenError::CheckerFailed { reason }) => {
                assert_eq!(reason, "role cache unavailable")
            }
            other => panic!("expected CheckerFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_authorize_maps_deny_to_access_denied() {
        let ctx = user_ctx(
            MockChecker::granting(&[]),
            AdminActionAuthState::MfaVerified,
        );
        let err = engine().authorize("GetAutoUpdateConfig", &ctx).unwrap_err();
        assert!(err.is_access_denied(), "got {err:?}");
    }

    // ── 8. authorizer closures ───────────────────────────────────────────────

    #[test]
    fn test_closure_is_an_authorizer() {
        let authorizer = |_method: &str| -> WardenResult<CallerContext> {
            Ok(user_ctx(
                MockChecker::granting(&[Verb::Read]),
                AdminActionAuthState::Unauthorized,
            ))
        };
        let ctx = Authorizer::authorize(&authorizer, "GetAutoUpdateConfig").unwrap();
        engine().authorize("GetAutoUpdateConfig", &ctx).unwrap();
    }

    // ── 9. config ────────────────────────────────────────────────────────────

    #[test]
    fn test_engine_config_defaults_namespace() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.namespace, "default");

        let config: EngineConfig = toml::from_str(r#"namespace = "ops""#).unwrap();
        assert_eq!(config.namespace, "ops");
    }

    // ── 10. concurrency ──────────────────────────────────────────────────────

    #[test]
    fn test_engine_shared_across_threads() {
        let engine = engine();
        std::thread::scope(|scope| {
            for state in AdminActionAuthState::ALL {
                let engine = engine.clone();
                scope.spawn(move || {
                    let ctx = user_ctx(MockChecker::granting(&[Verb::Read]), state);
                    let decision = engine.decide("GetAutoUpdateConfig", &ctx).unwrap();
                    assert!(decision.is_allowed());
                });
            }
        });
    }
}
