//! Bundle re-keying service.
//!
//! # Responsibility
//! - Give the bundle and every entry a fresh identity and URN identifier.
//! - Point every intra-bundle `reference` at the new identities.
//!
//! # Invariants
//! - All identities are assigned before the first reference is rewritten.
//! - Run state (registry, unresolved set) never outlives one call.
//! - Unresolved references never abort the run.

use crate::model::bundle::{
    Bundle, BundleError, FULL_URL_FIELD, RESOURCE_FIELD, RESOURCE_TYPE_FIELD,
};
use crate::model::identity::CanonicalId;
use crate::model::resource_types::supports_identifier;
use crate::registry::identity_registry::{EntryAssignment, IdentityRegistry};
use crate::rewrite::augment::{set_raw_id, stamp_identity, IdentifierCardinality};
use crate::rewrite::report::report_unresolved;
use crate::rewrite::walker::ReferenceRewriter;
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Which resources receive the URN `identifier` entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierPolicy {
    /// Every resource, regardless of type.
    #[default]
    Always,
    /// Only resource types known to declare `identifier`.
    KnownTypesOnly,
}

impl IdentifierPolicy {
    /// Returns whether a resource of `kind` gets the identifier entry.
    pub fn applies_to(&self, kind: Option<&str>) -> bool {
        match self {
            Self::Always => true,
            Self::KnownTypesOnly => kind.is_some_and(supports_identifier),
        }
    }
}

/// Run options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RekeyOptions {
    pub identifier_policy: IdentifierPolicy,
}

/// Result summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RekeyOutcome {
    pub bundle_id: CanonicalId,
    pub assignments: Vec<EntryAssignment>,
    pub rewritten_references: usize,
    /// Sorted distinct raw references left untouched.
    pub unresolved: BTreeSet<String>,
}

/// Re-keys a validated bundle in place.
pub fn rekey_bundle(bundle: &mut Bundle, options: &RekeyOptions) -> RekeyOutcome {
    let bundle_id = CanonicalId::generate();
    stamp_identity(bundle.root_mut(), &bundle_id, IdentifierCardinality::Single);

    let registry = IdentityRegistry::assign(bundle);
    let mut rewriter = ReferenceRewriter::new(&registry);

    for assignment in registry.assignments() {
        let Some(entry) = bundle.entry_mut(assignment.entry_index) else {
            continue;
        };
        entry.insert(FULL_URL_FIELD.to_string(), Value::String(assignment.id.urn()));

        let Some(resource) = entry.get_mut(RESOURCE_FIELD).and_then(Value::as_object_mut) else {
            continue;
        };
        let kind = resource.get(RESOURCE_TYPE_FIELD).and_then(Value::as_str);
        if options.identifier_policy.applies_to(kind) {
            stamp_identity(resource, &assignment.id, IdentifierCardinality::Many);
        } else {
            set_raw_id(resource, &assignment.id);
        }
        rewriter.visit_object(resource);
    }

    rewriter.visit_object(bundle.root_mut());

    let rewritten_references = rewriter.rewritten_count();
    let unresolved = rewriter.into_unresolved();
    report_unresolved(&unresolved);

    info!(
        "event=bundle_rekeyed module=service status=ok bundle_id={} entries={} rewritten={} unresolved={}",
        bundle_id,
        registry.len(),
        rewritten_references,
        unresolved.len()
    );

    RekeyOutcome {
        bundle_id,
        assignments: registry.assignments().to_vec(),
        rewritten_references,
        unresolved,
    }
}

/// Validates a parsed JSON document and re-keys it.
///
/// # Errors
/// - Returns `BundleError` when `value` is not a well-formed `Bundle`; the
///   value is consumed without being mutated in that case.
pub fn rekey_value(
    value: Value,
    options: &RekeyOptions,
) -> Result<(Value, RekeyOutcome), BundleError> {
    let mut bundle = Bundle::from_value(value)?;
    let outcome = rekey_bundle(&mut bundle, options);
    Ok((bundle.into_value(), outcome))
}
