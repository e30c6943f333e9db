//! Bundle re-keying use-case.
//!
//! # Responsibility
//! - Orchestrate assignment, augmentation, rewriting and reporting for one run.
//! - Keep CLI and I/O concerns outside core.

pub mod rekey_service;
