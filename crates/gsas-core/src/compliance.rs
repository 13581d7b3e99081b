// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Registration-time contract conformance.
//!
//! [`ComplianceChecker`] exercises a primitive before it is trusted with real
//! traffic: it must report a non-empty version and its evaluation against an
//! empty context at logical time zero must carry a `valid` outcome.  Content
//! violations are reported, never raised; only an absent primitive is an
//! error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::DeterministicContext;
use crate::determinism::DeterminismEnforcer;
use crate::error::{GovernanceError, Result};
use crate::primitive::GovernancePrimitive;

/// Requirement name for the version check.
pub const REQUIREMENT_VERSION: &str = "version";
/// Requirement name for the evaluation-shape check.
pub const REQUIREMENT_EVALUATE: &str = "evaluate_contract";
/// Requirement name for the source lint.
pub const REQUIREMENT_DETERMINISM: &str = "determinism";

/// One failed requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceViolation {
    /// Name of the offending primitive, or `unknown`.
    pub primitive: String,
    /// Which requirement failed.
    pub requirement: String,
    /// What was wrong.
    pub details: String,
}

impl fmt::Display for ComplianceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.primitive, self.requirement, self.details)
    }
}

/// Outcome of one or more compliance checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// `true` when no violation was found.
    pub compliant: bool,
    /// Every violation found, in check order.
    pub violations: Vec<ComplianceViolation>,
    /// Requirement names that were examined.
    pub checked: Vec<String>,
}

impl ComplianceReport {
    fn empty() -> Self {
        Self {
            compliant: true,
            violations: Vec::new(),
            checked: Vec::new(),
        }
    }

    fn record(&mut self, primitive: &str, requirement: &str, details: impl Into<String>) {
        self.compliant = false;
        self.violations.push(ComplianceViolation {
            primitive: primitive.into(),
            requirement: requirement.into(),
            details: details.into(),
        });
    }
}

/// Validates governance primitives against the primitive contract.
///
/// # Examples
///
/// ```rust
/// use gsas_core::{
///     compliance::ComplianceChecker,
///     context::DeterministicContext,
///     primitive::{FnPrimitive, GovernancePrimitive},
///     types::EvaluationResult,
/// };
///
/// let checker = ComplianceChecker::new();
/// let primitive = FnPrimitive::new("auth", "1.0.0", |_: &DeterministicContext| {
///     EvaluationResult::pass()
/// });
///
/// let report = checker.check_primitive(Some(&primitive)).unwrap();
/// assert!(report.compliant);
/// assert_eq!(report.checked, vec!["version", "evaluate_contract"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplianceChecker {
    enforcer: DeterminismEnforcer,
}

impl ComplianceChecker {
    /// Create a checker.
    pub fn new() -> Self {
        Self {
            enforcer: DeterminismEnforcer::new(),
        }
    }

    /// Check one primitive.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::NilPrimitive`] when `primitive` is `None`; no report
    /// is produced in that case.
    pub fn check_primitive(
        &self,
        primitive: Option<&dyn GovernancePrimitive>,
    ) -> Result<ComplianceReport> {
        let primitive = primitive.ok_or(GovernanceError::NilPrimitive)?;
        let name = primitive_name(primitive);

        let mut report = ComplianceReport::empty();
        report.checked.push(REQUIREMENT_VERSION.into());
        report.checked.push(REQUIREMENT_EVALUATE.into());

        if let Err(GovernanceError::MissingVersion) =
            self.enforcer.validate_primitive_contract(Some(primitive))
        {
            report.record(&name, REQUIREMENT_VERSION, "must be non-empty");
        }

        let empty = DeterministicContext::empty(0);
        if !primitive.evaluate(&empty).has_valid_key() {
            report.record(
                &name,
                REQUIREMENT_EVALUATE,
                "evaluate must return a result with a 'valid' key",
            );
        }

        Ok(report)
    }

    /// [`check_primitive`](Self::check_primitive) plus a determinism lint of
    /// the primitive's source text.
    pub fn check_primitive_with_source(
        &self,
        primitive: Option<&dyn GovernancePrimitive>,
        source: &str,
    ) -> Result<ComplianceReport> {
        let mut report = self.check_primitive(primitive)?;
        report.checked.push(REQUIREMENT_DETERMINISM.into());

        if let Err(err) = self.enforcer.validate_primitive_source(source) {
            let name = primitive.map(primitive_name).unwrap_or_else(|| "unknown".into());
            let details = match err {
                GovernanceError::NonDeterministic(violations) => violations,
                other => other.to_string(),
            };
            report.record(&name, REQUIREMENT_DETERMINISM, details);
        }

        Ok(report)
    }

    /// Check every primitive and merge the reports.
    ///
    /// # Errors
    ///
    /// The first error from [`check_primitive`](Self::check_primitive) aborts
    /// the whole call; no partial report is returned.
    pub fn check_all<'a, I>(&self, primitives: I) -> Result<ComplianceReport>
    where
        I: IntoIterator<Item = Option<&'a dyn GovernancePrimitive>>,
    {
        let mut combined = ComplianceReport::empty();

        for primitive in primitives {
            let report = self.check_primitive(primitive)?;
            if !report.compliant {
                combined.compliant = false;
                combined.violations.extend(report.violations);
            }
            combined.checked.extend(report.checked);
        }

        Ok(combined)
    }
}

fn primitive_name(primitive: &dyn GovernancePrimitive) -> String {
    primitive
        .as_named()
        .map(|named| named.name().to_owned())
        .unwrap_or_else(|| "unknown".into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
