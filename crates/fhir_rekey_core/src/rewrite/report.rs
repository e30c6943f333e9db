//! End-of-run reporting of unresolved references.

use log::warn;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Sorted, distinct references that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReport {
    references: Vec<String>,
}

impl UnresolvedReport {
    /// Builds a report, or `None` when nothing is unresolved.
    pub fn from_set(unresolved: &BTreeSet<String>) -> Option<Self> {
        if unresolved.is_empty() {
            return None;
        }
        Some(Self {
            references: unresolved.iter().cloned().collect(),
        })
    }

    pub fn references(&self) -> &[String] {
        &self.references
    }
}

impl Display for UnresolvedReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "The following references could not be resolved to entries in the bundle and were left as-is:"
        )?;
        for reference in &self.references {
            write!(f, "\n  - {reference}")?;
        }
        Ok(())
    }
}

/// Emits one warning for the whole unresolved set. Never fails.
pub fn report_unresolved(unresolved: &BTreeSet<String>) -> Option<UnresolvedReport> {
    let report = UnresolvedReport::from_set(unresolved)?;
    warn!("{report}");
    Some(report)
}
