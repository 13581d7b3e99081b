// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # gsas-std
//!
//! `std`-only persistence for `gsas-core` decisions.
//!
//! Decisions and their proofs are meant to leave the process as JSON
//! documents for downstream auditors.  This crate writes them:
//!
//! * [`write_decision_document`] / [`read_decision_document`] store a single
//!   decision as a pretty-printed JSON file.
//! * [`DecisionLog`] keeps an append-only JSON array of decisions on disk.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gsas_core::{DeterministicContext, GovernanceEngine};
//! use gsas_std::DecisionLog;
//!
//! let engine = GovernanceEngine::new();
//! let mut log = DecisionLog::open("/var/lib/gsas/decisions.json")
//!     .expect("failed to open decision log");
//!
//! let decision = engine.evaluate(&DeterministicContext::empty(0));
//! log.append(decision).expect("failed to persist decision");
//! ```

pub mod document;

pub use document::{read_decision_document, write_decision_document, DecisionLog};
