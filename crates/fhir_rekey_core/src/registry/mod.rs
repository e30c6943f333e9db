//! Identity assignment and lookup.
//!
//! # Responsibility
//! - Assign one fresh identity per bundle entry before any rewriting.
//! - Resolve prior locators and `Kind/id` keys to assigned identities.
//!
//! # Invariants
//! - The registry is fully populated before the first reference is rewritten,
//!   so forward references resolve.
//! - Every lookup table points into one identity store; tables cannot disagree.

pub mod identity_registry;
