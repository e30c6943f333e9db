//! Domain model for bundle re-keying.
//!
//! # Responsibility
//! - Define canonical identity values and their external encodings.
//! - Wrap a raw JSON bundle in a validated container view.
//!
//! # Invariants
//! - A `CanonicalId` is generated once and never reassigned within a run.
//! - A `Bundle` is only constructed from a value that passed shape checks.

pub mod bundle;
pub mod identity;
pub mod resource_types;
