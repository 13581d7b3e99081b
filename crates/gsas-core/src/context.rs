// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Immutable evaluation context.
//!
//! A [`DeterministicContext`] is a frozen key/value snapshot plus a logical
//! timestamp.  It is built once per evaluation cycle and handed to every
//! primitive.  The caller's map is deep-copied at construction and every read
//! hands back an independent copy, so neither the caller nor a primitive can
//! change what another primitive observes.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::{GovernanceError, Result};

/// Frozen evaluation input shared by all primitives of one evaluation.
///
/// # Examples
///
/// ```rust
/// use gsas_core::context::DeterministicContext;
/// use serde_json::{json, Map, Value};
///
/// let mut data = Map::new();
/// data.insert("amount".into(), json!(250));
/// let ctx = DeterministicContext::new(&data, 42);
///
/// // Later changes to the caller's map are never observed.
/// data.insert("amount".into(), json!(9_999));
///
/// assert_eq!(ctx.get("amount", Value::Null), json!(250));
/// assert_eq!(ctx.time(), 42);
/// assert!(ctx.set_item("amount", json!(1)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicContext {
    data: Map<String, Value>,
    time: i64,
}

impl DeterministicContext {
    /// Deep-copy `data` and freeze it together with `logical_time`.
    pub fn new(data: &Map<String, Value>, logical_time: i64) -> Self {
        Self {
            data: data.clone(),
            time: logical_time,
        }
    }

    /// A context with no data at the given logical time.
    pub fn empty(logical_time: i64) -> Self {
        Self {
            data: Map::new(),
            time: logical_time,
        }
    }

    /// Return a copy of the value stored under `key`, or `default` if the key
    /// is absent.
    pub fn get(&self, key: &str, default: Value) -> Value {
        self.data.get(key).cloned().unwrap_or(default)
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Return a copy of the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`GovernanceError::KeyNotFound`] when the key is absent.
    pub fn get_item(&self, key: &str) -> Result<Value> {
        self.data
            .get(key)
            .cloned()
            .ok_or_else(|| GovernanceError::KeyNotFound(key.to_owned()))
    }

    /// Always fails: the context is write-once.
    pub fn set_item(&self, key: &str, _value: Value) -> Result<()> {
        Err(GovernanceError::ImmutableContext {
            operation: "set",
            key: key.to_owned(),
        })
    }

    /// Always fails: the context is write-once.
    pub fn delete_item(&self, key: &str) -> Result<()> {
        Err(GovernanceError::ImmutableContext {
            operation: "delete",
            key: key.to_owned(),
        })
    }

    /// The logical timestamp supplied at construction.
    pub fn time(&self) -> i64 {
        self.time
    }

    /// Deep copy of the whole mapping.
    pub fn data(&self) -> Map<String, Value> {
        self.data.clone()
    }

    /// Number of keys in the snapshot.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Display for DeterministicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DeterministicContext(time={}, data={})",
            self.time,
            Value::Object(self.data.clone())
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
