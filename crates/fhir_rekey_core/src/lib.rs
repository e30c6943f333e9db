//! Core re-keying engine for FHIR bundles.
//! Assigns fresh `urn:uuid:` identities and repairs intra-bundle references.

pub mod logging;
pub mod model;
pub mod reference;
pub mod registry;
pub mod rewrite;
pub mod service;

pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::bundle::{Bundle, BundleError, EntryView};
pub use model::identity::{
    to_urn, CanonicalId, IdentifierEntry, URN_IDENTIFIER_SYSTEM, URN_UUID_PREFIX,
};
pub use reference::matcher::{match_reference, Resolution};
pub use reference::sanitize::sanitize_reference;
pub use registry::identity_registry::{EntryAssignment, IdentityRegistry, ResourceKey};
pub use rewrite::augment::{add_identifier, IdentifierCardinality, IdentifierChange};
pub use rewrite::report::{report_unresolved, UnresolvedReport};
pub use rewrite::walker::ReferenceRewriter;
pub use service::rekey_service::{
    rekey_bundle, rekey_value, IdentifierPolicy, RekeyOptions, RekeyOutcome,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
