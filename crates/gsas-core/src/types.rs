// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across the governance substrate.
//!
//! All record types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`].  The serialised field names are part of the audit
//! contract: downstream auditors read decision and proof documents by these
//! exact names.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::proof::GovernanceProof;

// ---------------------------------------------------------------------------
// Evaluation result
// ---------------------------------------------------------------------------

/// What a primitive returns from [`evaluate`](crate::primitive::GovernancePrimitive::evaluate).
///
/// `valid` is optional only to represent a malformed result: a primitive that
/// never set it is treated as failing everywhere (fail-closed).
///
/// # Examples
///
/// ```rust
/// use gsas_core::types::EvaluationResult;
/// use serde_json::json;
///
/// let denied = EvaluationResult::fail("amount exceeds limit")
///     .with_evidence(json!({ "amount": 9_999 }));
/// assert!(!denied.is_valid());
/// assert_eq!(denied.reason(), Some("amount exceeds limit"));
///
/// assert!(!EvaluationResult::malformed().has_valid_key());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Pass/fail outcome.  `None` means the primitive omitted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid: Option<bool>,
    /// Free-form metadata; carries a `reason` string on failure by convention.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Supporting evidence for the outcome.
    #[serde(default)]
    pub evidence: Vec<Value>,
    /// Optional logical timestamp stamped by the primitive.  Included in the
    /// signal commitment when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl EvaluationResult {
    /// A passing result with empty metadata and evidence.
    pub fn pass() -> Self {
        Self {
            valid: Some(true),
            ..Self::default()
        }
    }

    /// A failing result whose metadata carries `reason`.
    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            valid: Some(false),
            ..Self::default()
        }
        .with_metadata("reason", Value::String(reason.into()))
    }

    /// A result without a `valid` outcome.
    pub fn malformed() -> Self {
        Self::default()
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Append one evidence item.
    pub fn with_evidence(mut self, item: Value) -> Self {
        self.evidence.push(item);
        self
    }

    /// Stamp the result with a logical timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Whether the result carries a `valid` outcome at all.
    pub fn has_valid_key(&self) -> bool {
        self.valid.is_some()
    }

    /// `true` only for an explicit `valid = true`.
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    /// The `metadata.reason` string, if present.
    pub fn reason(&self) -> Option<&str> {
        self.metadata.get("reason").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Governance engine records
// ---------------------------------------------------------------------------

/// The engine's normalised record of one primitive's evaluation.
///
/// Created once per primitive per evaluation and owned by the
/// [`GovernanceDecision`] that contains it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceSignal {
    /// Registry id of the primitive.
    pub primitive_id: String,
    /// Version recorded at registration time.
    pub version: String,
    /// The primitive's outcome exactly as returned; `null` when it omitted it.
    pub valid: Option<bool>,
    /// The primitive's metadata.
    pub metadata: Map<String, Value>,
    /// The primitive's evidence.
    pub evidence: Vec<Value>,
    /// Logical timestamp, when the primitive stamped one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl GovernanceSignal {
    /// Normalise an [`EvaluationResult`] into a signal.
    pub fn from_result(primitive_id: &str, version: &str, result: EvaluationResult) -> Self {
        Self {
            primitive_id: primitive_id.into(),
            version: version.into(),
            valid: result.valid,
            metadata: result.metadata,
            evidence: result.evidence,
            timestamp: result.timestamp,
        }
    }

    /// `true` only for an explicit `valid = true`.
    pub fn is_valid(&self) -> bool {
        self.valid == Some(true)
    }

    /// The `metadata.reason` string, if present.
    pub fn reason(&self) -> Option<&str> {
        self.metadata.get("reason").and_then(Value::as_str)
    }
}

/// Unified result of a [`GovernanceEngine::evaluate`](crate::engine::GovernanceEngine::evaluate) call.
///
/// Evaluation halts at the first invalid signal, so `signals` is strictly
/// shorter than the registry exactly when `permitted` is `false` and the
/// failing primitive was not the last one registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceDecision {
    /// `true` if every registered primitive passed.
    pub permitted: bool,
    /// Signals in evaluation order, up to and including the first failure.
    pub signals: Vec<GovernanceSignal>,
    /// At most one entry: the primitive that closed the gate.
    pub failure_reasons: Vec<String>,
    /// Hash-committed record of how the decision was reached.
    pub proof: GovernanceProof,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
