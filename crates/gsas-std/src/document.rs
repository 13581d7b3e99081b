// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! JSON decision documents.
//!
//! Every write is atomic (write-rename): the document is written to
//! `<path>.tmp` first and then renamed over the target, so a crash mid-write
//! never leaves a partial file.
//!
//! ## Caveats
//!
//! * [`DecisionLog`] holds every decision in memory and rewrites the whole
//!   file on each append.  It is not intended for high-frequency workloads.
//! * Concurrent access from multiple processes is not supported.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gsas_core::types::GovernanceDecision;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Write one decision as a pretty-printed JSON document.
///
/// # Errors
///
/// Returns an [`io::Error`] if serialisation fails or the file cannot be
/// written or renamed.
pub fn write_decision_document<P: AsRef<Path>>(path: P, decision: &GovernanceDecision) -> io::Result<()> {
    write_json_atomic(path.as_ref(), decision)
}

/// Read a decision document written by [`write_decision_document`].
///
/// # Errors
///
/// Returns an [`io::Error`] if the file cannot be read, or one of kind
/// [`io::ErrorKind::InvalidData`] if it is not a decision document.
pub fn read_decision_document<P: AsRef<Path>>(path: P) -> io::Result<GovernanceDecision> {
    read_json(path.as_ref())
}

/// An append-only log of decisions stored as a JSON array.
///
/// # Examples
///
/// ```rust,no_run
/// use gsas_core::{DeterministicContext, GovernanceEngine};
/// use gsas_std::DecisionLog;
///
/// let engine = GovernanceEngine::new();
/// let mut log = DecisionLog::open("/tmp/decisions.json").expect("could not open log");
///
/// log.append(engine.evaluate_with_logical_time(&DeterministicContext::empty(1), 1))
///     .expect("could not append");
/// assert_eq!(log.denials().count(), 0);
/// ```
pub struct DecisionLog {
    path: PathBuf,
    decisions: Vec<GovernanceDecision>,
}

impl DecisionLog {
    /// Open an existing log, or start an empty one if the path does not
    /// exist.  Nothing is written until the first append.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the file exists but cannot be read or is
    /// not a JSON array of decisions.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let decisions = if path.exists() { read_json(&path)? } else { Vec::new() };

        tracing::debug!(path = %path.display(), decisions = decisions.len(), "decision log opened");
        Ok(Self { path, decisions })
    }

    /// Append `decision` and flush the whole log to disk.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the flush fails.  The decision stays in
    /// memory either way, so a later append retries the write.
    pub fn append(&mut self, decision: GovernanceDecision) -> io::Result<()> {
        self.decisions.push(decision);
        write_json_atomic(&self.path, &self.decisions)
    }

    /// Every decision, oldest first.
    pub fn decisions(&self) -> &[GovernanceDecision] {
        &self.decisions
    }

    /// Number of logged decisions.
    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    /// `true` when nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Decisions that denied their action.
    pub fn denials(&self) -> impl Iterator<Item = &GovernanceDecision> {
        self.decisions.iter().filter(|decision| !decision.permitted)
    }

    /// Location of the log on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("decision document serialisation error: {error}"),
        )
    })?;

    let tmp_path = tmp_path(path);
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> io::Result<T> {
    let raw = fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|error| {
        tracing::warn!(path = %path.display(), error = %error, "malformed decision document");
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("decision document JSON parse error: {error}"),
        )
    })
}

/// `<path>.tmp`, keeping any existing extension.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
