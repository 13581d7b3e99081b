// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # gsas-core
//!
//! Deterministic policy-gating substrate.
//!
//! Independent *governance primitives* (boolean checks against a frozen
//! evaluation context) are composed into one admit/deny decision for an
//! autonomous system's action.  Every decision carries a structured proof
//! with a SHA-256 commitment per signal.  The crate never executes the
//! action itself; it is the gate in front of execution.
//!
//! ## Architecture
//!
//! ```text
//! GovernanceEngine
//!   ├── registry         — ordered, id-keyed primitives behind one RwLock
//!   ├── evaluate()       — fail-closed, registration order, halt on first failure
//!   └── ProofGenerator   — versions, order, per-signal SHA-256 commitments
//!
//! composition  — sequential_and / parallel_and / threshold(k)
//! compliance   — registration-time contract checks
//! determinism  — static lint of primitive source text
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use gsas_core::{
//!     composition::threshold,
//!     DeterministicContext, EvaluationResult, FnPrimitive, GovernanceEngine, PrimitiveRef,
//! };
//! use serde_json::{json, Map};
//! use std::sync::Arc;
//!
//! let within_budget: PrimitiveRef = Arc::new(FnPrimitive::new("within_budget", "1.0.0", |ctx: &DeterministicContext| {
//!     match ctx.get("amount", json!(0)).as_i64() {
//!         Some(amount) if amount <= 100 => EvaluationResult::pass(),
//!         _ => EvaluationResult::fail("amount over budget"),
//!     }
//! }));
//! let reviewed: PrimitiveRef = Arc::new(FnPrimitive::new("reviewed", "1.0.0", |ctx: &DeterministicContext| {
//!     if ctx.get("reviewed", json!(false)) == json!(true) {
//!         EvaluationResult::pass()
//!     } else {
//!         EvaluationResult::fail("not reviewed")
//!     }
//! }));
//!
//! let engine = GovernanceEngine::new();
//! engine.register("budget", FnPrimitive::new("budget", "1.0.0", |_: &DeterministicContext| EvaluationResult::pass())).unwrap();
//! engine.register("quorum", threshold(vec![within_budget, reviewed], 1)).unwrap();
//!
//! let mut data = Map::new();
//! data.insert("amount".into(), json!(40));
//! let ctx = DeterministicContext::new(&data, 1_000);
//!
//! let decision = engine.evaluate_with_logical_time(&ctx, 1_000);
//! assert!(decision.permitted);
//! assert_eq!(decision.proof.evaluation_order, vec!["budget", "quorum"]);
//! ```

pub mod compliance;
pub mod composition;
pub mod config;
pub mod config_loader;
pub mod context;
pub mod determinism;
pub mod engine;
pub mod error;
pub mod primitive;
pub mod proof;
pub mod types;

// Re-export the most commonly used items at the crate root so consumers can
// write `use gsas_core::GovernanceEngine;` instead of the fully qualified path.
pub use compliance::{ComplianceChecker, ComplianceReport, ComplianceViolation};
pub use composition::{parallel_and, sequential_and, threshold, ParallelAnd, SequentialAnd, Threshold};
pub use config::{Config, TraceLevel};
pub use context::DeterministicContext;
pub use determinism::DeterminismEnforcer;
pub use engine::GovernanceEngine;
pub use error::{GovernanceError, Result};
pub use primitive::{FnPrimitive, GovernancePrimitive, NamedPrimitive, PrimitiveRef};
pub use proof::{GovernanceProof, ProofGenerator};
pub use types::{EvaluationResult, GovernanceDecision, GovernanceSignal};
