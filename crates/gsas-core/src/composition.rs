// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Primitive composition operators.
//!
//! Each operator turns N primitives into one composite that satisfies the
//! same [`GovernancePrimitive`] contract, so composites nest to any depth:
//!
//! * [`SequentialAnd`]: input order, stops at the first failure
//! * [`ParallelAnd`]: evaluates everything, then requires all to pass
//! * [`Threshold`]: evaluates everything, passes when at least `k` passed
//!
//! A composite's version is derived from its sub-versions in order, so the
//! same primitives in the same order always produce the same version.
//! Composites are built by the caller before registration and have no
//! dependency on the engine.

use serde_json::Value;

use crate::context::DeterministicContext;
use crate::primitive::{display_name, GovernancePrimitive, NamedPrimitive, PrimitiveRef};
use crate::types::EvaluationResult;

/// Build a [`SequentialAnd`] composite.
pub fn sequential_and(primitives: Vec<PrimitiveRef>) -> SequentialAnd {
    SequentialAnd::new(primitives)
}

/// Build a [`ParallelAnd`] composite.
pub fn parallel_and(primitives: Vec<PrimitiveRef>) -> ParallelAnd {
    ParallelAnd::new(primitives)
}

/// Build a [`Threshold`] composite requiring at least `k` passes.
pub fn threshold(primitives: Vec<PrimitiveRef>, k: usize) -> Threshold {
    Threshold::new(primitives, k)
}

// ---------------------------------------------------------------------------
// SequentialAnd
// ---------------------------------------------------------------------------

/// All primitives must pass, evaluated strictly in input order.
///
/// Evaluation stops at the first primitive whose result is not an explicit
/// `valid = true`.  The failure metadata names it (`reason`) and gives its
/// 0-based position (`failed_index`).
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use gsas_core::{
///     composition::sequential_and,
///     context::DeterministicContext,
///     primitive::{FnPrimitive, GovernancePrimitive, PrimitiveRef},
///     types::EvaluationResult,
/// };
///
/// let allow: PrimitiveRef = Arc::new(FnPrimitive::new("allow", "1", |_: &DeterministicContext| {
///     EvaluationResult::pass()
/// }));
/// let deny: PrimitiveRef = Arc::new(FnPrimitive::new("deny", "1", |_: &DeterministicContext| {
///     EvaluationResult::fail("blocked")
/// }));
///
/// let composite = sequential_and(vec![allow, deny]);
/// let result = composite.evaluate(&DeterministicContext::empty(0));
///
/// assert!(!result.is_valid());
/// assert_eq!(result.reason(), Some("Primitive deny failed"));
/// assert_eq!(result.metadata["failed_index"], 1);
/// ```
pub struct SequentialAnd {
    primitives: Vec<PrimitiveRef>,
    name: Option<String>,
}

impl SequentialAnd {
    /// Compose `primitives` in the given order.
    pub fn new(primitives: Vec<PrimitiveRef>) -> Self {
        Self { primitives, name: None }
    }

    /// Give the composite a name so it is identifiable when nested.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl GovernancePrimitive for SequentialAnd {
    fn version(&self) -> String {
        format!("sequential-and-{}", combined_version_hash(&self.primitives))
    }

    fn evaluate(&self, context: &DeterministicContext) -> EvaluationResult {
        for (index, primitive) in self.primitives.iter().enumerate() {
            if !primitive.evaluate(context).is_valid() {
                let name = display_name(primitive.as_ref(), index);
                return EvaluationResult::fail(format!("Primitive {name} failed"))
                    .with_metadata("failed_index", Value::from(index));
            }
        }

        EvaluationResult::pass()
            .with_metadata("message", Value::from("All primitives passed sequentially"))
    }

    fn as_named(&self) -> Option<&dyn NamedPrimitive> {
        self.name.as_ref().map(|_| self as &dyn NamedPrimitive)
    }
}

impl NamedPrimitive for SequentialAnd {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// ParallelAnd
// ---------------------------------------------------------------------------

/// All primitives must pass; every primitive is evaluated regardless of
/// earlier failures.
///
/// On failure `reason` lists every failed primitive in input order and
/// `failed_indices` gives their positions.
pub struct ParallelAnd {
    primitives: Vec<PrimitiveRef>,
    name: Option<String>,
}

impl ParallelAnd {
    /// Compose `primitives`; all of them are always evaluated.
    pub fn new(primitives: Vec<PrimitiveRef>) -> Self {
        Self { primitives, name: None }
    }

    /// Give the composite a name so it is identifiable when nested.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl GovernancePrimitive for ParallelAnd {
    fn version(&self) -> String {
        format!("parallel-and-{}", combined_version_hash(&self.primitives))
    }

    fn evaluate(&self, context: &DeterministicContext) -> EvaluationResult {
        let outcomes = evaluate_all(&self.primitives, context);

        let failed: Vec<usize> = outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, passed)| (!passed).then_some(index))
            .collect();

        if failed.is_empty() {
            return EvaluationResult::pass()
                .with_metadata("message", Value::from("All primitives passed in parallel"));
        }

        let names: Vec<String> = failed
            .iter()
            .map(|&index| display_name(self.primitives[index].as_ref(), index))
            .collect();

        EvaluationResult::fail(format!("Failed primitives: [{}]", names.join(" ")))
            .with_metadata("failed_indices", Value::from(failed))
    }

    fn as_named(&self) -> Option<&dyn NamedPrimitive> {
        self.name.as_ref().map(|_| self as &dyn NamedPrimitive)
    }
}

impl NamedPrimitive for ParallelAnd {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

/// At least `k` of the primitives must pass; every primitive is evaluated.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use gsas_core::{
///     composition::threshold,
///     context::DeterministicContext,
///     primitive::{FnPrimitive, GovernancePrimitive, PrimitiveRef},
///     types::EvaluationResult,
/// };
///
/// let vote = |name: &'static str, ok: bool| -> PrimitiveRef {
///     Arc::new(FnPrimitive::new(name, "1", move |_: &DeterministicContext| {
///         if ok { EvaluationResult::pass() } else { EvaluationResult::fail("no") }
///     }))
/// };
///
/// let quorum = threshold(vec![vote("a", true), vote("b", false), vote("c", true)], 2);
/// let result = quorum.evaluate(&DeterministicContext::empty(0));
/// assert!(result.is_valid());
/// assert_eq!(result.metadata["message"], "2 of 3 primitives passed");
/// ```
pub struct Threshold {
    primitives: Vec<PrimitiveRef>,
    k: usize,
    name: Option<String>,
}

impl Threshold {
    /// Compose `primitives`, passing when at least `k` of them pass.
    pub fn new(primitives: Vec<PrimitiveRef>, k: usize) -> Self {
        Self { primitives, k, name: None }
    }

    /// Give the composite a name so it is identifiable when nested.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The minimum number of passing primitives.
    pub fn k(&self) -> usize {
        self.k
    }
}

impl GovernancePrimitive for Threshold {
    fn version(&self) -> String {
        format!("threshold-{}-{}", self.k, combined_version_hash(&self.primitives))
    }

    fn evaluate(&self, context: &DeterministicContext) -> EvaluationResult {
        let passed = evaluate_all(&self.primitives, context)
            .into_iter()
            .filter(|passed| *passed)
            .count();
        let total = self.primitives.len();

        if passed >= self.k {
            EvaluationResult::pass()
                .with_metadata("message", Value::from(format!("{passed} of {total} primitives passed")))
                .with_metadata("passed", Value::from(passed))
                .with_metadata("total", Value::from(total))
        } else {
            EvaluationResult::fail(format!(
                "Only {passed} of {total} primitives passed, need at least {}",
                self.k
            ))
            .with_metadata("passed", Value::from(passed))
            .with_metadata("total", Value::from(total))
            .with_metadata("required", Value::from(self.k))
        }
    }

    fn as_named(&self) -> Option<&dyn NamedPrimitive> {
        self.name.as_ref().map(|_| self as &dyn NamedPrimitive)
    }
}

impl NamedPrimitive for Threshold {
    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Evaluate every primitive once, in order, without short-circuiting.
fn evaluate_all(primitives: &[PrimitiveRef], context: &DeterministicContext) -> Vec<bool> {
    primitives
        .iter()
        .map(|primitive| primitive.evaluate(context).is_valid())
        .collect()
}

/// FNV-1a 64-bit over the concatenated sub-versions, reduced to six digits.
fn combined_version_hash(primitives: &[PrimitiveRef]) -> u64 {
    const FNV_OFFSET: u64 = 14_695_981_039_346_656_037;
    const FNV_PRIME: u64 = 1_099_511_628_211;

    let mut hash = FNV_OFFSET;
    for primitive in primitives {
        for byte in primitive.version().bytes() {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash % 1_000_000
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::primitive::FnPrimitive;

    /// Named mock that counts its evaluations.
    struct Counted {
        name: &'static str,
        version: &'static str,
        valid: bool,
        calls: AtomicUsize,
    }

    impl Counted {
        fn new(name: &'static str, valid: bool) -> Arc<Self> {
            Arc::new(Self { name, version: "1.0", valid, calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GovernancePrimitive for Counted {
        fn version(&self) -> String {
            self.version.into()
        }

        fn evaluate(&self, _context: &DeterministicContext) -> EvaluationResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            EvaluationResult {
                valid: Some(self.valid),
                ..EvaluationResult::default()
            }
        }

        fn as_named(&self) -> Option<&dyn NamedPrimitive> {
            Some(self)
        }
    }

    impl NamedPrimitive for Counted {
        fn name(&self) -> &str {
            self.name
        }
    }

    struct Unnamed(bool);

    impl GovernancePrimitive for Unnamed {
        fn version(&self) -> String {
            "0".into()
        }

        fn evaluate(&self, _context: &DeterministicContext) -> EvaluationResult {
            if self.0 {
                EvaluationResult::pass()
            } else {
                EvaluationResult::fail("unnamed")
            }
        }
    }

    fn refs(items: &[Arc<Counted>]) -> Vec<PrimitiveRef> {
        items.iter().map(|item| item.clone() as PrimitiveRef).collect()
    }

    fn ctx() -> DeterministicContext {
        DeterministicContext::empty(0)
    }

    #[test]
    fn test_sequential_all_pass() {
        let items = [Counted::new("p1", true), Counted::new("p2", true)];
        let result = sequential_and(refs(&items)).evaluate(&ctx());
        assert!(result.is_valid());
        assert_eq!(result.metadata["message"], "All primitives passed sequentially");
    }

    #[test]
    fn test_sequential_stops_at_first_failure() {
        let items = [Counted::new("pass", true), Counted::new("fail", false), Counted::new("late", true)];
        let result = sequential_and(refs(&items)).evaluate(&ctx());

        assert!(!result.is_valid());
        assert_eq!(result.reason(), Some("Primitive fail failed"));
        assert_eq!(result.metadata["failed_index"], 1);
        assert_eq!(items[2].calls(), 0);
    }

    #[test]
    fn test_sequential_unnamed_uses_index() {
        let primitives: Vec<PrimitiveRef> = vec![
            Arc::new(Unnamed(true)) as PrimitiveRef,
            Arc::new(Unnamed(false)) as PrimitiveRef,
        ];
        let result = sequential_and(primitives).evaluate(&ctx());
        assert_eq!(result.reason(), Some("Primitive primitive_1 failed"));
    }

    #[test]
    fn test_sequential_treats_malformed_as_failure() {
        let malformed: PrimitiveRef = Arc::new(FnPrimitive::new("broken", "1", |_: &DeterministicContext| {
            EvaluationResult::malformed()
        }));
        let result = sequential_and(vec![malformed]).evaluate(&ctx());
        assert!(!result.is_valid());
        assert_eq!(result.metadata["failed_index"], 0);
    }

    #[test]
    fn test_parallel_evaluates_everything() {
        let items = [Counted::new("pass1", true), Counted::new("fail", false), Counted::new("pass2", true)];
        let result = parallel_and(refs(&items)).evaluate(&ctx());

        assert!(!result.is_valid());
        assert!(items.iter().all(|item| item.calls() == 1));
        assert_eq!(result.reason(), Some("Failed primitives: [fail]"));
    }

    #[test]
    fn test_parallel_lists_every_failure_in_order() {
        let primitives: Vec<PrimitiveRef> = vec![
            Arc::new(Unnamed(false)) as PrimitiveRef,
            Counted::new("ok", true) as PrimitiveRef,
            Counted::new("bad", false) as PrimitiveRef,
        ];
        let result = parallel_and(primitives).evaluate(&ctx());
        assert_eq!(result.reason(), Some("Failed primitives: [primitive_0 bad]"));
        assert_eq!(result.metadata["failed_indices"], serde_json::json!([0, 2]));
    }

    #[test]
    fn test_parallel_all_pass() {
        let items = [Counted::new("a", true), Counted::new("b", true), Counted::new("c", true)];
        let result = parallel_and(refs(&items)).evaluate(&ctx());
        assert!(result.is_valid());
        assert_eq!(result.metadata["message"], "All primitives passed in parallel");
    }

    #[test]
    fn test_threshold_met() {
        let items = [Counted::new("a", true), Counted::new("b", false), Counted::new("c", true)];
        let result = threshold(refs(&items), 2).evaluate(&ctx());
        assert!(result.is_valid());
        assert_eq!(result.metadata["passed"], 2);
        assert_eq!(result.metadata["total"], 3);
    }

    #[test]
    fn test_threshold_not_met() {
        let items = [Counted::new("a", true), Counted::new("b", false), Counted::new("c", false)];
        let result = threshold(refs(&items), 2).evaluate(&ctx());
        assert!(!result.is_valid());
        assert_eq!(result.reason(), Some("Only 1 of 3 primitives passed, need at least 2"));
        assert_eq!(result.metadata["required"], 2);
        assert!(items.iter().all(|item| item.calls() == 1));
    }

    #[test]
    fn test_threshold_zero_always_passes() {
        let result = threshold(Vec::new(), 0).evaluate(&ctx());
        assert!(result.is_valid());
        assert_eq!(result.metadata["message"], "0 of 0 primitives passed");
    }

    #[test]
    fn test_versions_are_stable_and_order_sensitive() {
        let a: PrimitiveRef = Counted::new("a", true);
        let b: PrimitiveRef =
            Arc::new(Counted { name: "b", version: "2.0", valid: true, calls: AtomicUsize::new(0) });

        let forward = sequential_and(vec![a.clone(), b.clone()]).version();
        assert_eq!(forward, sequential_and(vec![a.clone(), b.clone()]).version());
        assert_ne!(forward, sequential_and(vec![b.clone(), a.clone()]).version());
        assert!(forward.starts_with("sequential-and-"));

        assert!(parallel_and(vec![a.clone()]).version().starts_with("parallel-and-"));
        assert!(threshold(vec![a, b], 1).version().starts_with("threshold-1-"));
    }

    #[test]
    fn test_nested_composites() {
        let inner = parallel_and(refs(&[Counted::new("x", true), Counted::new("y", false)]))
            .with_name("inner_gate");
        let outer = sequential_and(vec![Counted::new("first", true) as PrimitiveRef, Arc::new(inner)]);

        let result = outer.evaluate(&ctx());
        assert!(!result.is_valid());
        assert_eq!(result.reason(), Some("Primitive inner_gate failed"));
        assert_eq!(result.metadata["failed_index"], 1);
    }

    #[test]
    fn test_unnamed_composite_has_no_name_capability() {
        let composite = threshold(Vec::new(), 0);
        assert!(composite.as_named().is_none());
        assert_eq!(display_name(&composite, 4), "primitive_4");
    }
}
