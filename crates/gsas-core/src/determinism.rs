// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Static determinism lint for primitive source text.
//!
//! [`DeterminismEnforcer`] rejects source that *looks* non-deterministic:
//! banned imports, wall-clock / randomness / I/O calls, dynamic imports and
//! package-level mutable containers.  It is a textual pattern match shared
//! across Go and Python primitive sources, not a parser, and it cannot prove
//! determinism.  It may reject benign code that happens to contain a banned
//! token.
//!
//! The banned lists are compile-time constants.  Their regular expressions are
//! compiled once per process and are never mutated.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{GovernanceError, Result};
use crate::primitive::GovernancePrimitive;

/// Modules whose import alone breaks determinism.
pub const BANNED_IMPORTS: &[&str] = &[
    "time", "datetime", "random", "os", "sys",
    "socket", "urllib", "requests", "subprocess",
    "threading", "multiprocessing", "asyncio",
];

/// Calls that read the clock, draw randomness, touch the environment,
/// filesystem, network or processes, or write to the console / log.
pub const BANNED_FUNCTIONS: &[&str] = &[
    "time.Now", "time.Since", "time.Until", "time.Sleep",
    "rand.Int", "rand.Float", "rand.Intn", "rand.Read",
    "os.Getenv", "os.Setenv", "os.Open", "os.Create",
    "os.ReadFile", "os.WriteFile", "os.Remove",
    "net.Dial", "net.Listen", "http.Get", "http.Post",
    "exec.Command", "fmt.Print", "fmt.Println",
    "log.Print", "log.Println", "log.Printf",
];

/// Token of a direct dynamic-import call.
pub const DYNAMIC_IMPORT_TOKEN: &str = "__import__";

/// Declarations of a top-level variable bound to a freshly allocated
/// map or sequence.
const GLOBAL_MUTABLE_PATTERNS: &[&str] = &[
    r"var\s+\w+\s*=\s*make\s*\(",
    r"var\s+\w+\s*=\s*\[\]",
    r"var\s+\w+\s*=\s*map\s*\[",
];

/// Compiled form of the banned lists.
struct LintRules {
    /// One entry per banned module: quoted, bare and `from X import` syntaxes.
    imports: Vec<(&'static str, [Regex; 3])>,
    functions: Vec<(&'static str, Regex)>,
    global_mutable: Vec<Regex>,
}

fn lint_rules() -> &'static LintRules {
    static RULES: OnceLock<LintRules> = OnceLock::new();
    RULES.get_or_init(|| {
        let imports = BANNED_IMPORTS
            .iter()
            .map(|module| {
                let quoted = regex::escape(module);
                (
                    *module,
                    [
                        compile(&format!(r#"import\s+"{quoted}""#)),
                        compile(&format!(r"import\s+{quoted}\b")),
                        compile(&format!(r"from\s+{quoted}\s+import")),
                    ],
                )
            })
            .collect();

        let functions = BANNED_FUNCTIONS
            .iter()
            .map(|function| (*function, compile(&format!(r"{}\s*\(", regex::escape(function)))))
            .collect();

        let global_mutable = GLOBAL_MUTABLE_PATTERNS.iter().map(|p| compile(p)).collect();

        LintRules {
            imports,
            functions,
            global_mutable,
        }
    })
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("lint pattern must compile")
}

/// Enforces determinism on primitive source and the primitive contract.
///
/// # Examples
///
/// ```rust
/// use gsas_core::determinism::DeterminismEnforcer;
///
/// let enforcer = DeterminismEnforcer::new();
///
/// let err = enforcer
///     .validate_deterministic("func f() { _ = time.Now() }")
///     .unwrap_err();
/// assert!(err.to_string().contains("time.Now"));
///
/// assert!(enforcer
///     .validate_deterministic("func f(amount int) bool { return amount < 10 }")
///     .is_ok());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DeterminismEnforcer;

impl DeterminismEnforcer {
    /// Create an enforcer.  The rule set is shared process-wide.
    pub fn new() -> Self {
        Self
    }

    /// Lint `source`, collecting every violation.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::NonDeterministic`] when the source is empty or all
    /// whitespace, or when at least one banned pattern matches.  The message
    /// lists every violation, joined with `"; "`.
    pub fn validate_deterministic(&self, source: &str) -> Result<()> {
        if source.trim().is_empty() {
            return Err(GovernanceError::NonDeterministic("empty source code".into()));
        }

        let violations = collect_violations(source);
        tracing::debug!(violations = violations.len(), "determinism lint finished");

        if violations.is_empty() {
            Ok(())
        } else {
            Err(GovernanceError::NonDeterministic(violations.join("; ")))
        }
    }

    /// Lint source supplied alongside a primitive.
    ///
    /// Primitive source cannot be recovered from a compiled value, so the
    /// caller must hand it over explicitly.
    pub fn validate_primitive_source(&self, source: &str) -> Result<()> {
        if source.is_empty() {
            return Err(GovernanceError::NonDeterministic(
                "source code required for validation - primitive source cannot be recovered at runtime"
                    .into(),
            ));
        }
        self.validate_deterministic(source)
    }

    /// Check the structural contract: a primitive is present and reports a
    /// non-empty version.
    pub fn validate_primitive_contract(
        &self,
        primitive: Option<&dyn GovernancePrimitive>,
    ) -> Result<()> {
        let primitive = primitive.ok_or(GovernanceError::NilPrimitive)?;
        if primitive.version().is_empty() {
            return Err(GovernanceError::MissingVersion);
        }
        Ok(())
    }
}

fn collect_violations(source: &str) -> Vec<String> {
    let rules = lint_rules();
    let mut violations = Vec::new();

    for (module, syntaxes) in &rules.imports {
        if syntaxes.iter().any(|re| re.is_match(source)) {
            violations.push(format!("Banned import '{module}' found"));
        }
    }

    for (function, re) in &rules.functions {
        if re.is_match(source) {
            violations.push(format!("Banned function '{function}' found"));
        }
    }

    if source.contains(DYNAMIC_IMPORT_TOKEN) {
        violations.push("Direct __import__ call detected - use import statements instead".into());
    }

    if rules.global_mutable.iter().any(|re| re.is_match(source)) {
        violations.push("Potential global mutable state detected".into());
    }

    violations
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
