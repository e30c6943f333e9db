//! Reference string normalization and parsing.
//!
//! # Responsibility
//! - Repair cosmetic corruption in reference strings.
//! - Classify a reference as canonical, local, resolvable or unknown.
//!
//! # Invariants
//! - `urn:uuid:` references and `#` pointers are never reinterpreted.
//! - Matching never fails loudly; unknown references map to `Resolution::Unknown`.

pub mod matcher;
pub mod sanitize;

/// Marker for references to contained resources.
pub const LOCAL_POINTER_MARKER: char = '#';
/// Key of reference-tagged fields.
pub const REFERENCE_FIELD: &str = "reference";

/// Returns whether a reference must pass through untouched.
pub fn is_passthrough(reference: &str) -> bool {
    reference.starts_with(crate::model::identity::URN_UUID_PREFIX)
        || reference.starts_with(LOCAL_POINTER_MARKER)
}
