//! Reference classification against the run's identity registry.
//!
//! # Invariants
//! - Rule order is fixed: passthrough, exact locator, `Kind/id` pattern.
//! - A locator match wins over a conflicting `Kind/id` match.

use crate::model::identity::URN_UUID_PREFIX;
use crate::reference::LOCAL_POINTER_MARKER;
use crate::registry::identity_registry::IdentityRegistry;
use once_cell::sync::Lazy;
use regex::Regex;

// Optional `http(s)://host/base/` prefix, then `Kind/id`.
static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://[^/]+/[^/]+/)?([A-Za-z][A-Za-z0-9]+)/([A-Za-z0-9\-.]{1,64})$")
        .expect("valid reference regex")
});

/// Outcome of matching one sanitized candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Already a `urn:uuid:` reference.
    Canonical(String),
    /// Pointer to a contained resource.
    Local(String),
    /// Mapped to the canonical URN of a bundle entry.
    Resolved(String),
    /// No rule applied.
    Unknown,
}

impl Resolution {
    /// Value to store in the reference field, or `None` when unresolved.
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Canonical(value) | Self::Local(value) | Self::Resolved(value) => Some(value),
            Self::Unknown => None,
        }
    }
}

/// Matches a sanitized candidate against the registry.
pub fn match_reference(candidate: &str, registry: &IdentityRegistry) -> Resolution {
    if candidate.starts_with(URN_UUID_PREFIX) {
        return Resolution::Canonical(candidate.to_string());
    }
    if candidate.starts_with(LOCAL_POINTER_MARKER) {
        return Resolution::Local(candidate.to_string());
    }

    if let Some(id) = registry.by_locator(candidate) {
        return Resolution::Resolved(id.urn());
    }

    parse_type_and_id(candidate)
        .and_then(|(kind, local_id)| registry.by_flat(&format!("{kind}/{local_id}")))
        .map_or(Resolution::Unknown, |id| Resolution::Resolved(id.urn()))
}

/// Parses `Kind/id` (optionally URL-qualified) without consulting a registry.
pub fn parse_type_and_id(candidate: &str) -> Option<(&str, &str)> {
    let captures = REFERENCE_RE.captures(candidate)?;
    let kind = captures.get(1)?.as_str();
    let local_id = captures.get(2)?.as_str();
    Some((kind, local_id))
}
