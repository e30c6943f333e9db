//! In-place document rewriting.
//!
//! # Responsibility
//! - Stamp new identities and URN identifiers onto the bundle and resources.
//! - Rewrite every `reference` field reachable from a value.
//! - Report references that could not be mapped.
//!
//! # Invariants
//! - Pre-existing identifiers with a different value are never dropped.
//! - Unresolved references are left untouched and only reported once per run.

pub mod augment;
pub mod report;
pub mod walker;
