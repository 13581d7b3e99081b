// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Engine-level configuration.
//!
//! [`Config`] is the single entry point for tuning the governance engine at
//! construction time.  Every field has a default, so `Config::default()` is
//! always a valid starting point.  Nothing here can change a decision: the
//! trace level only affects logging, and contract validation only affects
//! which primitives are admitted at registration.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How much the engine reports through `tracing` while evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TraceLevel {
    /// Registration events only.
    Minimal,
    /// Decisions and denials.
    #[default]
    Standard,
    /// Decisions, denials and every individual signal.
    Detailed,
}

impl fmt::Display for TraceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceLevel::Minimal  => write!(f, "minimal"),
            TraceLevel::Standard => write!(f, "standard"),
            TraceLevel::Detailed => write!(f, "detailed"),
        }
    }
}

/// Top-level configuration for [`GovernanceEngine`](crate::engine::GovernanceEngine).
///
/// # Examples
///
/// ```rust
/// use gsas_core::config::{Config, TraceLevel};
///
/// let config = Config {
///     trace_level: TraceLevel::Detailed,
///     ..Config::default()
/// };
/// assert!(!config.validate_contract_on_register);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging verbosity of evaluation.  Defaults to
    /// [`TraceLevel::Standard`].
    pub trace_level: TraceLevel,

    /// When `true`, registration also rejects primitives whose version is
    /// empty.  Defaults to `false`.
    pub validate_contract_on_register: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trace_level: TraceLevel::Standard,
            validate_contract_on_register: false,
        }
    }
}
