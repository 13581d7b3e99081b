// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Proof generation for governance decisions.
//!
//! A [`GovernanceProof`] records *what* was evaluated (ids, versions, order),
//! *what* was decided, and a SHA-256 commitment to each signal's content.
//! Commitments bind a signal for later audit without the proof carrying the
//! signal itself.
//!
//! Generation never fails: a signal that cannot be serialised is committed
//! through a fallback digest over the error text.
//!
//! Verification is not implemented.  [`GovernanceProof::verify`] always
//! returns [`GovernanceError::ProofUnavailable`].

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::{GovernanceError, Result};
use crate::primitive::PrimitiveRef;
use crate::types::GovernanceSignal;

/// Prefix of a commitment produced by the serialisation fallback.
pub const FALLBACK_COMMITMENT_PREFIX: &str = "error:";

const VERIFICATION_UNSUPPORTED: &str =
    "full verification not yet supported: proof verification requires stored execution context";

/// Structured, hash-committed record of one governance evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceProof {
    /// Version of every registered primitive, keyed by id.
    pub primitive_versions: BTreeMap<String, String>,
    /// Ids of the primitives that produced a signal, in evaluation order.
    pub evaluation_order: Vec<String>,
    /// The final decision.
    pub decision: bool,
    /// Lowercase hex SHA-256 commitment per signal, aligned with
    /// `evaluation_order`.
    pub signal_commitments: Vec<String>,
    /// Logical timestamp of generation.
    pub generated_at: i64,
}

impl GovernanceProof {
    /// Independently verify the proof against the primitives it names.
    ///
    /// # Errors
    ///
    /// Always [`GovernanceError::ProofUnavailable`]: replaying a decision
    /// needs the execution context, which proofs do not store.
    pub fn verify(&self, _primitives: &BTreeMap<String, PrimitiveRef>) -> Result<bool> {
        Err(GovernanceError::ProofUnavailable(VERIFICATION_UNSUPPORTED))
    }
}

/// Canonical commitment payload.  Fields are declared in key order so the
/// serialised object is sorted.
#[derive(Serialize)]
struct CommitmentPayload<'a> {
    #[serde(serialize_with = "serialize_sorted")]
    metadata: &'a Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<i64>,
    valid: Option<bool>,
}

/// Builds [`GovernanceProof`]s.
///
/// # Examples
///
/// ```rust
/// use std::collections::BTreeMap;
/// use gsas_core::{proof::ProofGenerator, types::{EvaluationResult, GovernanceSignal}};
///
/// let signal = GovernanceSignal::from_result("auth", "1.0.0", EvaluationResult::pass());
/// let versions = BTreeMap::from([("auth".to_string(), "1.0.0".to_string())]);
///
/// let generator = ProofGenerator::new();
/// let first = generator.generate_proof_with_time(true, vec!["auth".into()], &[signal.clone()], versions.clone(), 7);
/// let second = generator.generate_proof_with_time(true, vec!["auth".into()], &[signal], versions, 7);
///
/// assert_eq!(first, second);
/// assert_eq!(first.signal_commitments[0].len(), 64);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofGenerator;

impl ProofGenerator {
    /// Create a generator.
    pub fn new() -> Self {
        Self
    }

    /// Generate a proof stamped with the current wall-clock time in
    /// nanoseconds.  The clock is read for the stamp only and never reaches
    /// primitive evaluation.
    pub fn generate_proof(
        &self,
        decision: bool,
        evaluation_order: Vec<String>,
        signals: &[GovernanceSignal],
        primitive_versions: BTreeMap<String, String>,
    ) -> GovernanceProof {
        self.generate_proof_with_time(
            decision,
            evaluation_order,
            signals,
            primitive_versions,
            wall_clock_nanos(),
        )
    }

    /// Generate a proof at an explicit logical time.  Identical inputs yield
    /// identical proofs.
    pub fn generate_proof_with_time(
        &self,
        decision: bool,
        evaluation_order: Vec<String>,
        signals: &[GovernanceSignal],
        primitive_versions: BTreeMap<String, String>,
        logical_time: i64,
    ) -> GovernanceProof {
        let signal_commitments = signals.iter().map(|signal| self.commit_signal(signal)).collect();

        GovernanceProof {
            primitive_versions,
            evaluation_order,
            decision,
            signal_commitments,
            generated_at: logical_time,
        }
    }

    /// Commit to `{valid, metadata, timestamp?}` of one signal.
    pub fn commit_signal(&self, signal: &GovernanceSignal) -> String {
        let payload = CommitmentPayload {
            metadata: &signal.metadata,
            timestamp: signal.timestamp,
            valid: signal.valid,
        };

        match serde_json::to_vec(&payload) {
            Ok(bytes) => hex::encode(Sha256::digest(&bytes)),
            Err(err) => {
                tracing::warn!(
                    primitive_id = %signal.primitive_id,
                    error = %err,
                    "signal commitment fell back to error digest"
                );
                fallback_commitment(&err.to_string())
            }
        }
    }
}

/// Object keys sorted at every depth.  `serde_json::Map` only iterates in
/// key order while no crate in the build enables `serde_json/preserve_order`,
/// so the ordering is imposed here rather than inherited.
struct Sorted<'a>(&'a Value);

impl Serialize for Sorted<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.0 {
            Value::Object(map) => sorted_entries(map).serialize(serializer),
            Value::Array(items) => serializer.collect_seq(items.iter().map(Sorted)),
            scalar => scalar.serialize(serializer),
        }
    }
}

fn sorted_entries(map: &Map<String, Value>) -> BTreeMap<&str, Sorted<'_>> {
    map.iter().map(|(key, value)| (key.as_str(), Sorted(value))).collect()
}

fn serialize_sorted<S: Serializer>(map: &&Map<String, Value>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    sorted_entries(map).serialize(serializer)
}

fn fallback_commitment(error_text: &str) -> String {
    format!(
        "{FALLBACK_COMMITMENT_PREFIX}{}",
        hex::encode(Sha256::digest(error_text.as_bytes()))
    )
}

fn wall_clock_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvaluationResult;
    use serde_json::json;

    fn signal(id: &str, result: EvaluationResult) -> GovernanceSignal {
        GovernanceSignal::from_result(id, "1.0.0", result)
    }

    #[test]
    fn test_commitment_is_sha256_of_sorted_payload() {
        let sig = signal("auth", EvaluationResult::pass().with_metadata("primitive", json!("auth")));
        let expected = hex::encode(Sha256::digest(br#"{"metadata":{"primitive":"auth"},"valid":true}"#));
        assert_eq!(ProofGenerator::new().commit_signal(&sig), expected);
    }

    #[test]
    fn test_commitment_includes_timestamp_when_present() {
        let generator = ProofGenerator::new();
        let plain = signal("clock", EvaluationResult::pass());
        let stamped = signal("clock", EvaluationResult::pass().with_timestamp(5));

        let expected = hex::encode(Sha256::digest(br#"{"metadata":{},"timestamp":5,"valid":true}"#));
        assert_eq!(generator.commit_signal(&stamped), expected);
        assert_ne!(generator.commit_signal(&plain), generator.commit_signal(&stamped));
    }

    #[test]
    fn test_commitment_ignores_identity_and_evidence() {
        let generator = ProofGenerator::new();
        let a = signal("a", EvaluationResult::fail("x"));
        let b = GovernanceSignal::from_result("b", "9.9.9", EvaluationResult::fail("x").with_evidence(json!(1)));
        assert_eq!(generator.commit_signal(&a), generator.commit_signal(&b));
    }

    #[test]
    fn test_malformed_signal_commits_null_valid() {
        let sig = signal("broken", EvaluationResult::malformed());
        let expected = hex::encode(Sha256::digest(br#"{"metadata":{},"valid":null}"#));
        assert_eq!(ProofGenerator::new().commit_signal(&sig), expected);
    }

    #[test]
    fn test_commitment_independent_of_insertion_order() {
        let mut forward = Map::new();
        forward.insert("amount".into(), json!(10));
        forward.insert("scope".into(), json!({ "region": "eu", "account": "ops" }));
        forward.insert("reason".into(), json!("over limit"));

        let mut nested = Map::new();
        nested.insert("account".into(), json!("ops"));
        nested.insert("region".into(), json!("eu"));
        let mut backward = Map::new();
        backward.insert("reason".into(), json!("over limit"));
        backward.insert("scope".into(), Value::Object(nested));
        backward.insert("amount".into(), json!(10));

        let build = |metadata: Map<String, Value>| {
            let mut result = EvaluationResult::fail("x");
            result.metadata = metadata;
            GovernanceSignal::from_result("limit", "1.0.0", result)
        };

        let generator = ProofGenerator::new();
        let expected = hex::encode(Sha256::digest(
            br#"{"metadata":{"amount":10,"reason":"over limit","scope":{"account":"ops","region":"eu"}},"valid":false}"#,
        ));
        assert_eq!(generator.commit_signal(&build(forward)), expected);
        assert_eq!(generator.commit_signal(&build(backward)), expected);
    }

    #[test]
    fn test_fallback_commitment_shape() {
        let digest = fallback_commitment("boom");
        assert!(digest.starts_with(FALLBACK_COMMITMENT_PREFIX));
        assert_eq!(digest.len(), FALLBACK_COMMITMENT_PREFIX.len() + 64);
    }

    #[test]
    fn test_proof_fields_and_determinism() {
        let generator = ProofGenerator::new();
        let signals = vec![signal("a", EvaluationResult::pass()), signal("b", EvaluationResult::fail("no"))];
        let versions = BTreeMap::from([
            ("a".to_string(), "1.0.0".to_string()),
            ("b".to_string(), "1.0.0".to_string()),
            ("c".to_string(), "2.0.0".to_string()),
        ]);
        let order = vec!["a".to_string(), "b".to_string()];

        let first = generator.generate_proof_with_time(false, order.clone(), &signals, versions.clone(), 12_345);
        let second = generator.generate_proof_with_time(false, order, &signals, versions, 12_345);

        assert_eq!(first, second);
        assert_eq!(first.generated_at, 12_345);
        assert!(!first.decision);
        assert_eq!(first.signal_commitments.len(), 2);
        assert_eq!(first.primitive_versions.len(), 3);
        assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
    }

    #[test]
    fn test_wall_clock_proof_is_positive() {
        let proof = ProofGenerator::new().generate_proof(true, Vec::new(), &[], BTreeMap::new());
        assert!(proof.generated_at > 0);
        assert!(proof.signal_commitments.is_empty());
    }

    #[test]
    fn test_verify_is_unavailable() {
        let proof = ProofGenerator::new().generate_proof_with_time(true, Vec::new(), &[], BTreeMap::new(), 0);
        let err = proof.verify(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GovernanceError::ProofUnavailable(_)));
        assert!(err.to_string().contains("not yet supported"));
    }

    #[test]
    fn test_proof_serialises_field_names() {
        let proof = ProofGenerator::new().generate_proof_with_time(true, vec!["a".into()], &[], BTreeMap::new(), 1);
        let json = serde_json::to_value(&proof).unwrap();
        for field in ["primitive_versions", "evaluation_order", "decision", "signal_commitments", "generated_at"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
