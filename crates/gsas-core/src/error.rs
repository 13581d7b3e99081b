// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Error taxonomy for the governance substrate.
//!
//! Every error here is a configuration or programmer error and is returned
//! synchronously.  A primitive that evaluates to `valid = false` is *not* an
//! error: it is ordinary fail-closed signal flow carried in the
//! [`GovernanceDecision`](crate::types::GovernanceDecision).

/// Errors produced by context access, registration, linting and proofs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GovernanceError {
    /// A write was attempted on a frozen [`DeterministicContext`](crate::context::DeterministicContext).
    #[error("context is immutable: cannot {operation} key '{key}'")]
    ImmutableContext {
        /// The rejected operation (`set` or `delete`).
        operation: &'static str,
        /// The key the caller tried to touch.
        key: String,
    },

    /// The requested key is not present in the context.
    #[error("key '{0}' not found")]
    KeyNotFound(String),

    /// A primitive was required but none was supplied.
    #[error("primitive cannot be nil")]
    NilPrimitive,

    /// A primitive was registered under an empty id.
    #[error("primitive ID cannot be empty")]
    EmptyId,

    /// A primitive id is already present in the registry.
    #[error("primitive with ID '{0}' already registered")]
    DuplicateId(String),

    /// The primitive reports an empty version string.
    #[error("primitive must have non-empty version")]
    MissingVersion,

    /// The determinism lint rejected primitive source.  Carries every matched
    /// violation joined with `"; "`.
    #[error("non-deterministic primitive: {0}")]
    NonDeterministic(String),

    /// Proof verification is not available.
    #[error("proof unavailable: {0}")]
    ProofUnavailable(&'static str),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GovernanceError>;
