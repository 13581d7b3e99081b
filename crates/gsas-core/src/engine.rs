// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Governance engine: the fail-closed orchestrator.
//!
//! [`GovernanceEngine`] owns an ordered registry of primitives keyed by a
//! unique id.  Evaluation walks the registry in registration order and stops
//! at the first primitive whose result is invalid or malformed, so a decision
//! carries at most one failure reason and possibly fewer signals than there
//! are registered primitives.
//!
//! ## Evaluation Order
//!
//! 1. Evaluate the next primitive against the frozen context.
//! 2. Record its signal.
//! 3. If the signal is not valid, deny, record the reason, and halt.
//! 4. After the loop, generate a proof over exactly the recorded signals.
//!
//! There is no retry, no parallel evaluation and no conditional skipping.
//!
//! ## Locking
//!
//! Registration and [`GovernanceEngine::clear`] take the registry's write
//! lock; evaluation and [`GovernanceEngine::primitive_count`] take the read
//! lock, so concurrent evaluations share a stable registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::config::{Config, TraceLevel};
use crate::context::DeterministicContext;
use crate::determinism::DeterminismEnforcer;
use crate::error::{GovernanceError, Result};
use crate::primitive::{GovernancePrimitive, PrimitiveRef};
use crate::proof::ProofGenerator;
use crate::types::{GovernanceDecision, GovernanceSignal};

/// Registered primitives in evaluation order.
#[derive(Default)]
struct Registry {
    entries: Vec<(String, PrimitiveRef)>,
    index: HashMap<String, usize>,
    versions: BTreeMap<String, String>,
}

impl Registry {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    fn push(&mut self, id: &str, primitive: PrimitiveRef, version: String) {
        self.index.insert(id.to_owned(), self.entries.len());
        self.versions.insert(id.to_owned(), version);
        self.entries.push((id.to_owned(), primitive));
    }

    fn version_of(&self, id: &str) -> &str {
        self.versions.get(id).map(String::as_str).unwrap_or_default()
    }
}

/// Evaluates registered governance primitives and emits a decision plus proof.
///
/// # Examples
///
/// ```rust
/// use gsas_core::{
///     context::DeterministicContext,
///     engine::GovernanceEngine,
///     primitive::FnPrimitive,
///     types::EvaluationResult,
/// };
/// use serde_json::{json, Map};
///
/// let engine = GovernanceEngine::new();
/// engine
///     .register("has_owner", FnPrimitive::new("has_owner", "1.0.0", |ctx: &DeterministicContext| {
///         if ctx.has("owner") {
///             EvaluationResult::pass()
///         } else {
///             EvaluationResult::fail("owner missing")
///         }
///     }))
///     .unwrap();
///
/// let mut data = Map::new();
/// data.insert("owner".into(), json!("ops"));
///
/// let decision = engine.evaluate_with_logical_time(&DeterministicContext::new(&data, 1), 1);
/// assert!(decision.permitted);
///
/// let decision = engine.evaluate_with_logical_time(&DeterministicContext::empty(1), 1);
/// assert!(!decision.permitted);
/// assert_eq!(decision.failure_reasons, vec!["Primitive 'has_owner' failed: owner missing"]);
/// ```
pub struct GovernanceEngine {
    registry: RwLock<Registry>,
    config: Config,
    proofs: ProofGenerator,
    enforcer: DeterminismEnforcer,
}

impl Default for GovernanceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GovernanceEngine {
    /// Construct an empty engine with [`Config::default`].
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Construct an empty engine with an explicit configuration.
    pub fn with_config(config: Config) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            config,
            proofs: ProofGenerator::new(),
            enforcer: DeterminismEnforcer::new(),
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a primitive under `id`, appending it to the evaluation order.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - [`GovernanceError::NilPrimitive`] if `primitive` is `None`;
    /// - [`GovernanceError::EmptyId`] if `id` is empty;
    /// - [`GovernanceError::MissingVersion`] if contract validation is
    ///   enabled and the version is empty;
    /// - [`GovernanceError::DuplicateId`] if `id` is already registered.
    ///
    /// A rejected registration leaves the registry untouched.
    pub fn register_primitive(&self, id: &str, primitive: Option<PrimitiveRef>) -> Result<()> {
        let result = self.try_register(id, primitive);
        if let Err(err) = &result {
            tracing::warn!(primitive_id = id, error = %err, "primitive registration rejected");
        }
        result
    }

    /// Convenience wrapper over [`register_primitive`](Self::register_primitive)
    /// for a concrete primitive value.
    pub fn register<P>(&self, id: &str, primitive: P) -> Result<()>
    where
        P: GovernancePrimitive + 'static,
    {
        self.register_primitive(id, Some(Arc::new(primitive)))
    }

    fn try_register(&self, id: &str, primitive: Option<PrimitiveRef>) -> Result<()> {
        let primitive = primitive.ok_or(GovernanceError::NilPrimitive)?;
        if id.is_empty() {
            return Err(GovernanceError::EmptyId);
        }
        if self.config.validate_contract_on_register {
            self.enforcer.validate_primitive_contract(Some(primitive.as_ref()))?;
        }

        let mut registry = self.registry.write();
        if registry.contains(id) {
            return Err(GovernanceError::DuplicateId(id.to_owned()));
        }

        let version = primitive.version();
        tracing::debug!(primitive_id = id, version = %version, "primitive registered");
        registry.push(id, primitive, version);
        Ok(())
    }

    /// Evaluate every registered primitive, stamping the proof with the
    /// wall clock.
    pub fn evaluate(&self, context: &DeterministicContext) -> GovernanceDecision {
        self.run(context, None)
    }

    /// Evaluate every registered primitive, stamping the proof with
    /// `logical_time`.  Reproducible for identical registry and context.
    pub fn evaluate_with_logical_time(
        &self,
        context: &DeterministicContext,
        logical_time: i64,
    ) -> GovernanceDecision {
        self.run(context, Some(logical_time))
    }

    /// Number of registered primitives.
    pub fn primitive_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Drop every registered primitive.
    pub fn clear(&self) {
        let mut registry = self.registry.write();
        let dropped = registry.len();
        *registry = Registry::default();
        tracing::debug!(dropped, "registry cleared");
    }

    fn run(&self, context: &DeterministicContext, logical_time: Option<i64>) -> GovernanceDecision {
        let registry = self.registry.read();
        let trace = self.config.trace_level;

        let mut permitted = true;
        let mut signals = Vec::with_capacity(registry.len());
        let mut failure_reasons = Vec::new();

        for (id, primitive) in &registry.entries {
            let result = primitive.evaluate(context);
            let signal = GovernanceSignal::from_result(id, registry.version_of(id), result);

            if trace == TraceLevel::Detailed {
                tracing::debug!(primitive_id = %id, valid = ?signal.valid, "signal recorded");
            }

            let passed = signal.is_valid();
            let reason = (!passed).then(|| failure_reason(id, signal.reason()));
            signals.push(signal);

            // Fail closed: the first invalid or malformed signal halts evaluation.
            if let Some(reason) = reason {
                if trace != TraceLevel::Minimal {
                    tracing::warn!(primitive_id = %id, reason = %reason, "governance denial");
                }
                permitted = false;
                failure_reasons.push(reason);
                break;
            }
        }

        let order: Vec<String> = signals.iter().map(|s: &GovernanceSignal| s.primitive_id.clone()).collect();
        let versions = registry.versions.clone();
        let proof = match logical_time {
            Some(time) => self.proofs.generate_proof_with_time(permitted, order, &signals, versions, time),
            None => self.proofs.generate_proof(permitted, order, &signals, versions),
        };

        if trace != TraceLevel::Minimal {
            tracing::info!(
                permitted,
                evaluated = signals.len(),
                registered = registry.len(),
                "governance decision"
            );
        }

        GovernanceDecision {
            permitted,
            signals,
            failure_reasons,
            proof,
        }
    }
}

fn failure_reason(id: &str, reason: Option<&str>) -> String {
    match reason {
        Some(reason) => format!("Primitive '{id}' failed: {reason}"),
        None => format!("Primitive '{id}' failed"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvaluationResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use serde_json::json;

    struct Tally {
        valid: Option<bool>,
        calls: AtomicUsize,
    }

    impl Tally {
        fn new(valid: Option<bool>) -> Arc<Self> {
            Arc::new(Self {
                valid,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GovernancePrimitive for Tally {
        fn version(&self) -> String {
            "1.0.0".into()
        }

        fn evaluate(&self, _context: &DeterministicContext) -> EvaluationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.valid {
                Some(true) => EvaluationResult::pass(),
                Some(false) => EvaluationResult::fail("tally says no"),
                None => EvaluationResult::malformed(),
            }
        }
    }

    struct Unversioned;

    impl GovernancePrimitive for Unversioned {
        fn version(&self) -> String {
            String::new()
        }

        fn evaluate(&self, _context: &DeterministicContext) -> EvaluationResult {
            EvaluationResult::pass()
        }
    }

    fn ctx() -> DeterministicContext {
        DeterministicContext::empty(0)
    }

    #[test]
    fn test_empty_engine_permits() {
        let engine = GovernanceEngine::new();
        let decision = engine.evaluate_with_logical_time(&ctx(), 3);
        assert!(decision.permitted);
        assert!(decision.signals.is_empty());
        assert!(decision.failure_reasons.is_empty());
        assert!(decision.proof.decision);
        assert_eq!(decision.proof.generated_at, 3);
    }

    #[test]
    fn test_fail_closed_halts_at_first_failure() {
        let engine = GovernanceEngine::new();
        let (p1, p2, p3) = (Tally::new(Some(true)), Tally::new(Some(false)), Tally::new(Some(true)));
        engine.register_primitive("p1", Some(p1.clone())).unwrap();
        engine.register_primitive("p2", Some(p2.clone())).unwrap();
        engine.register_primitive("p3", Some(p3.clone())).unwrap();

        let decision = engine.evaluate_with_logical_time(&ctx(), 0);

        assert!(!decision.permitted);
        assert_eq!(decision.signals.len(), 2);
        assert_eq!(decision.failure_reasons, vec!["Primitive 'p2' failed: tally says no"]);
        assert_eq!((p1.calls(), p2.calls(), p3.calls()), (1, 1, 0));
        assert_eq!(decision.proof.evaluation_order, vec!["p1", "p2"]);
        assert_eq!(decision.proof.signal_commitments.len(), 2);
        assert_eq!(decision.proof.primitive_versions.len(), 3);
        assert!(!decision.proof.decision);
    }

    #[test]
    fn test_malformed_result_denies_without_reason() {
        let engine = GovernanceEngine::new();
        engine.register_primitive("broken", Some(Tally::new(None))).unwrap();

        let decision = engine.evaluate(&ctx());
        assert!(!decision.permitted);
        assert_eq!(decision.failure_reasons, vec!["Primitive 'broken' failed"]);
        assert_eq!(decision.signals[0].valid, None);
    }

    #[test]
    fn test_non_string_reason_is_ignored() {
        let engine = GovernanceEngine::new();
        engine
            .register(
                "numeric",
                crate::primitive::FnPrimitive::new("numeric", "1", |_: &DeterministicContext| {
                    EvaluationResult {
                        valid: Some(false),
                        ..EvaluationResult::default()
                    }
                    .with_metadata("reason", json!(42))
                }),
            )
            .unwrap();

        let decision = engine.evaluate_with_logical_time(&ctx(), 0);
        assert_eq!(decision.failure_reasons, vec!["Primitive 'numeric' failed"]);
    }

    #[test]
    fn test_registration_errors() {
        let engine = GovernanceEngine::new();
        assert_eq!(engine.register_primitive("x", None), Err(GovernanceError::NilPrimitive));
        assert_eq!(
            engine.register_primitive("", Some(Tally::new(Some(true)))),
            Err(GovernanceError::EmptyId)
        );
        // Nil is reported before an empty id.
        assert_eq!(engine.register_primitive("", None), Err(GovernanceError::NilPrimitive));
        assert_eq!(engine.primitive_count(), 0);
    }

    #[test]
    fn test_duplicate_registration_leaves_registry_unchanged() {
        let engine = GovernanceEngine::new();
        let first = Tally::new(Some(true));
        let second = Tally::new(Some(false));

        engine.register_primitive("x", Some(first.clone())).unwrap();
        let err = engine.register_primitive("x", Some(second.clone())).unwrap_err();

        assert_eq!(err, GovernanceError::DuplicateId("x".into()));
        assert_eq!(err.to_string(), "primitive with ID 'x' already registered");
        assert_eq!(engine.primitive_count(), 1);
        assert!(engine.evaluate(&ctx()).permitted);
        assert_eq!(second.calls(), 0);
    }

    #[test]
    fn test_registration_order_is_evaluation_order() {
        let engine = GovernanceEngine::new();
        for id in ["zeta", "alpha", "mid"] {
            engine.register_primitive(id, Some(Tally::new(Some(true)))).unwrap();
        }
        let decision = engine.evaluate_with_logical_time(&ctx(), 0);
        let ids: Vec<&str> = decision.signals.iter().map(|s| s.primitive_id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "mid"]);
        assert_eq!(decision.proof.evaluation_order, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_empty_version_accepted_by_default() {
        let engine = GovernanceEngine::new();
        assert!(engine.register("anon", Unversioned).is_ok());
        assert_eq!(engine.evaluate(&ctx()).signals[0].version, "");
    }

    #[test]
    fn test_contract_validation_on_register() {
        let engine = GovernanceEngine::with_config(Config {
            validate_contract_on_register: true,
            ..Config::default()
        });
        assert_eq!(engine.register("anon", Unversioned), Err(GovernanceError::MissingVersion));
        assert_eq!(engine.primitive_count(), 0);
        assert!(engine.register_primitive("ok", Some(Tally::new(Some(true)))).is_ok());
    }

    #[test]
    fn test_missing_version_reported_before_duplicate() {
        let engine = GovernanceEngine::with_config(Config {
            validate_contract_on_register: true,
            ..Config::default()
        });
        engine.register_primitive("x", Some(Tally::new(Some(true)))).unwrap();
        assert_eq!(engine.register("x", Unversioned), Err(GovernanceError::MissingVersion));
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let engine = GovernanceEngine::new();
        engine.register_primitive("deny", Some(Tally::new(Some(false)))).unwrap();
        assert!(!engine.evaluate(&ctx()).permitted);

        engine.clear();
        assert_eq!(engine.primitive_count(), 0);
        let decision = engine.evaluate(&ctx());
        assert!(decision.permitted);
        assert!(decision.proof.primitive_versions.is_empty());

        // The id is free again after a clear.
        assert!(engine.register_primitive("deny", Some(Tally::new(Some(true)))).is_ok());
    }

    #[test]
    fn test_logical_time_decisions_are_reproducible() {
        let engine = GovernanceEngine::new();
        engine.register_primitive("a", Some(Tally::new(Some(true)))).unwrap();
        engine.register_primitive("b", Some(Tally::new(Some(false)))).unwrap();

        let first = engine.evaluate_with_logical_time(&ctx(), 99);
        let second = engine.evaluate_with_logical_time(&ctx(), 99);
        assert_eq!(first, second);
    }

    #[test]
    fn test_concurrent_evaluation() {
        let engine = Arc::new(GovernanceEngine::new());
        let tally = Tally::new(Some(true));
        engine.register_primitive("shared", Some(tally.clone())).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.evaluate_with_logical_time(&DeterministicContext::empty(0), 0))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().permitted);
        }
        assert_eq!(tally.calls(), 8);
    }

    #[test]
    fn test_registration_is_atomic_for_concurrent_evaluations() {
        let engine = Arc::new(GovernanceEngine::new());
        engine.register_primitive("first", Some(Tally::new(Some(true)))).unwrap();

        let evaluators: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    (0..500)
                        .map(|_| {
                            let decision = engine.evaluate_with_logical_time(&DeterministicContext::empty(0), 0);
                            (decision.signals.len(), decision.proof.primitive_versions.len())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        engine.register_primitive("second", Some(Tally::new(Some(true)))).unwrap();

        for evaluator in evaluators {
            let observed = evaluator.join().unwrap();
            for &(signals, versions) in &observed {
                assert!(signals == 1 || signals == 2, "saw {signals} signals");
                // Signals and proof come from the same registry snapshot.
                assert_eq!(signals, versions);
            }
            // Once the second primitive is visible it never disappears.
            let counts: Vec<usize> = observed.iter().map(|(signals, _)| *signals).collect();
            assert!(counts.windows(2).all(|pair| pair[0] <= pair[1]));
        }
        assert_eq!(engine.primitive_count(), 2);
    }
}
