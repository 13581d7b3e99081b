// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! The governance primitive contract.
//!
//! Every check the engine runs, atomic or composite, implements
//! [`GovernancePrimitive`].  A primitive may additionally expose a name through
//! the optional [`NamedPrimitive`] capability; callers query it with
//! [`GovernancePrimitive::as_named`] and fall back to a positional placeholder
//! when it is absent.

use std::sync::Arc;

use crate::context::DeterministicContext;
use crate::types::EvaluationResult;

/// Shared handle to a registered or composed primitive.
pub type PrimitiveRef = Arc<dyn GovernancePrimitive>;

/// A side-effect-free boolean check against a [`DeterministicContext`].
///
/// Implementations must be safe to call concurrently and must not keep
/// mutable state across calls.
///
/// # Examples
///
/// ```rust
/// use gsas_core::{
///     context::DeterministicContext,
///     primitive::{GovernancePrimitive, NamedPrimitive},
///     types::EvaluationResult,
/// };
///
/// struct MaxAmount(i64);
///
/// impl GovernancePrimitive for MaxAmount {
///     fn version(&self) -> String {
///         "1.0.0".into()
///     }
///
///     fn evaluate(&self, ctx: &DeterministicContext) -> EvaluationResult {
///         match ctx.get("amount", serde_json::Value::Null).as_i64() {
///             Some(amount) if amount <= self.0 => EvaluationResult::pass(),
///             _ => EvaluationResult::fail("amount over limit"),
///         }
///     }
///
///     fn as_named(&self) -> Option<&dyn NamedPrimitive> {
///         Some(self)
///     }
/// }
///
/// impl NamedPrimitive for MaxAmount {
///     fn name(&self) -> &str {
///         "max_amount"
///     }
/// }
///
/// let ctx = DeterministicContext::empty(0);
/// assert!(!MaxAmount(100).evaluate(&ctx).is_valid());
/// ```
pub trait GovernancePrimitive: Send + Sync {
    /// Stable identifier for this primitive's behaviour.  Must be non-empty.
    fn version(&self) -> String;

    /// Evaluate against a frozen context.
    fn evaluate(&self, context: &DeterministicContext) -> EvaluationResult;

    /// The naming capability, if this primitive offers one.
    fn as_named(&self) -> Option<&dyn NamedPrimitive> {
        None
    }
}

/// Optional capability: a human-readable name used in composite messages and
/// compliance reports.
pub trait NamedPrimitive: GovernancePrimitive {
    /// The primitive's name.
    fn name(&self) -> &str;
}

/// The primitive's name, or `primitive_<index>` when it has none.
pub fn display_name(primitive: &dyn GovernancePrimitive, index: usize) -> String {
    match primitive.as_named() {
        Some(named) => named.name().into(),
        None => format!("primitive_{index}"),
    }
}

impl<P: GovernancePrimitive + ?Sized> GovernancePrimitive for Arc<P> {
    fn version(&self) -> String {
        (**self).version()
    }

    fn evaluate(&self, context: &DeterministicContext) -> EvaluationResult {
        (**self).evaluate(context)
    }

    fn as_named(&self) -> Option<&dyn NamedPrimitive> {
        (**self).as_named()
    }
}

// ---------------------------------------------------------------------------
// FnPrimitive
// ---------------------------------------------------------------------------

/// A named primitive backed by a closure.
///
/// # Examples
///
/// ```rust
/// use gsas_core::{
///     context::DeterministicContext,
///     primitive::{FnPrimitive, GovernancePrimitive},
///     types::EvaluationResult,
/// };
///
/// let has_owner = FnPrimitive::new("has_owner", "1.0.0", |ctx: &DeterministicContext| {
///     if ctx.has("owner") {
///         EvaluationResult::pass()
///     } else {
///         EvaluationResult::fail("owner missing")
///     }
/// });
///
/// assert!(!has_owner.evaluate(&DeterministicContext::empty(0)).is_valid());
/// ```
pub struct FnPrimitive<F> {
    name: String,
    version: String,
    check: F,
}

impl<F> FnPrimitive<F>
where
    F: Fn(&DeterministicContext) -> EvaluationResult + Send + Sync,
{
    /// Wrap `check` under the given name and version.
    pub fn new(name: impl Into<String>, version: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            check,
        }
    }
}

impl<F> GovernancePrimitive for FnPrimitive<F>
where
    F: Fn(&DeterministicContext) -> EvaluationResult + Send + Sync,
{
    fn version(&self) -> String {
        self.version.clone()
    }

    fn evaluate(&self, context: &DeterministicContext) -> EvaluationResult {
        (self.check)(context)
    }

    fn as_named(&self) -> Option<&dyn NamedPrimitive> {
        Some(self)
    }
}

impl<F> NamedPrimitive for FnPrimitive<F>
where
    F: Fn(&DeterministicContext) -> EvaluationResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
