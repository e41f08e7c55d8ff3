//! Field-level validation accumulator.
//!
//! # Responsibilities
//! - Collect one human-readable message per invalid field
//! - Keep the first failure recorded for a field
//! - Expose the collected errors in a stable (key-sorted) order
//!
//! # Design Decisions
//! - Checks never short-circuit: callers run every rule and report all
//!   invalid fields in a single response
//! - Independent of any domain type; movies and configuration both use it

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Accumulates validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    /// Create an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no error has been recorded.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record `message` for `field` unless the field already has an error.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Record an error for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_error(field, message);
        }
    }

    /// Snapshot of the recorded errors, sorted by field name.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn into_errors(self) -> BTreeMap<String, String> {
        self.errors
    }
}

/// True if `value` is one of `permitted`.
pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.iter().any(|candidate| candidate == value)
}

/// True if every element of `values` is distinct (exact comparison).
pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|value| seen.insert(value))
}
