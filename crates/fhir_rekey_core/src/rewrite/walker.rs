//! Depth-first `reference` rewriting over arbitrary JSON values.
//!
//! # Invariants
//! - Only string values stored under the `reference` key are rewritten.
//! - Canonical URNs and `#` pointers are never reported as unresolved.
//! - Every other value is traversed regardless of its key.

use crate::reference::matcher::match_reference;
use crate::reference::sanitize::sanitize_reference;
use crate::reference::{is_passthrough, REFERENCE_FIELD};
use crate::registry::identity_registry::IdentityRegistry;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Run-scoped reference visitor.
///
/// Collects unresolved raw references across every value it visits.
pub struct ReferenceRewriter<'a> {
    registry: &'a IdentityRegistry,
    unresolved: BTreeSet<String>,
    rewritten: usize,
}

impl<'a> ReferenceRewriter<'a> {
    pub fn new(registry: &'a IdentityRegistry) -> Self {
        Self {
            registry,
            unresolved: BTreeSet::new(),
            rewritten: 0,
        }
    }

    /// Visits any JSON value in place.
    pub fn visit(&mut self, value: &mut Value) {
        match value {
            Value::Object(map) => self.visit_object(map),
            Value::Array(items) => {
                for item in items {
                    self.visit(item);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    /// Visits every member of an object in place.
    pub fn visit_object(&mut self, map: &mut Map<String, Value>) {
        for (key, value) in map.iter_mut() {
            match value {
                Value::String(reference) if key == REFERENCE_FIELD => {
                    self.visit_reference(reference);
                }
                other => self.visit(other),
            }
        }
    }

    fn visit_reference(&mut self, reference: &mut String) {
        // Raw values already in canonical or local form are kept byte-for-byte.
        if is_passthrough(reference) {
            return;
        }
        let candidate = sanitize_reference(reference);
        match match_reference(&candidate, self.registry).into_value() {
            Some(mapped) => {
                if *reference != mapped {
                    self.rewritten += 1;
                    *reference = mapped;
                }
            }
            None => {
                self.unresolved.insert(reference.clone());
            }
        }
    }

    /// Distinct unresolved raw references, sorted.
    pub fn unresolved(&self) -> &BTreeSet<String> {
        &self.unresolved
    }

    pub fn into_unresolved(self) -> BTreeSet<String> {
        self.unresolved
    }

    /// Number of reference fields whose value changed.
    pub fn rewritten_count(&self) -> usize {
        self.rewritten
    }
}
