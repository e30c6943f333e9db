//! Run-scoped identity registry.

use crate::model::bundle::Bundle;
use crate::model::identity::CanonicalId;
use log::debug;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Normalized `(resourceType, id)` lookup key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ResourceKey {
    pub kind: String,
    pub local_id: String,
}

impl ResourceKey {
    pub fn new(kind: impl Into<String>, local_id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            local_id: local_id.into(),
        }
    }

    /// Parses the flattened `Kind/id` form. The kind may not contain `/`.
    pub fn parse_flat(flat: &str) -> Option<Self> {
        let (kind, local_id) = flat.split_once('/')?;
        if kind.is_empty() || local_id.is_empty() {
            return None;
        }
        Some(Self::new(kind, local_id))
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.local_id)
    }
}

/// Identity assigned to one entry, kept outside the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryAssignment {
    pub entry_index: usize,
    pub id: CanonicalId,
    /// Trimmed historical `fullUrl`, if the entry had one.
    pub prior_locator: Option<String>,
    /// Historical `(resourceType, id)`, if both were declared.
    pub prior_key: Option<ResourceKey>,
}

/// Identity store plus locator and key indices.
///
/// Later registrations win on duplicate locators or keys.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    assignments: Vec<EntryAssignment>,
    by_locator: BTreeMap<String, usize>,
    by_key: BTreeMap<ResourceKey, usize>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the assignment pass over every entry of `bundle`.
    ///
    /// The document is not mutated; identities live in the returned registry.
    pub fn assign(bundle: &Bundle) -> Self {
        let mut registry = Self::new();
        for entry in bundle.entries() {
            let prior_key = match (entry.resource_type(), entry.local_id()) {
                (Some(kind), Some(local_id)) => Some(ResourceKey::new(kind, local_id)),
                _ => None,
            };
            registry.register(entry.index, entry.full_url(), prior_key);
        }
        debug!(
            "event=identities_assigned module=registry status=ok entries={} locators={} keys={}",
            registry.assignments.len(),
            registry.by_locator.len(),
            registry.by_key.len()
        );
        registry
    }

    /// Generates and registers an identity for one entry.
    pub fn register(
        &mut self,
        entry_index: usize,
        full_url: Option<&str>,
        prior_key: Option<ResourceKey>,
    ) -> CanonicalId {
        let id = CanonicalId::generate();
        let slot = self.assignments.len();
        let prior_locator = full_url.map(|url| url.trim().to_string());

        if let Some(locator) = &prior_locator {
            self.by_locator.insert(locator.clone(), slot);
        }
        if let Some(key) = &prior_key {
            self.by_key.insert(key.clone(), slot);
        }

        self.assignments.push(EntryAssignment {
            entry_index,
            id,
            prior_locator,
            prior_key,
        });
        id
    }

    /// Exact match on a trimmed historical `fullUrl`.
    pub fn by_locator(&self, locator: &str) -> Option<CanonicalId> {
        self.by_locator.get(locator).map(|slot| self.assignments[*slot].id)
    }

    /// Match on the flattened `Kind/id` string, via the `(resourceType, id)` table.
    pub fn by_flat(&self, flat: &str) -> Option<CanonicalId> {
        let key = ResourceKey::parse_flat(flat)?;
        self.by_key.get(&key).map(|slot| self.assignments[*slot].id)
    }

    /// All assignments in entry order.
    pub fn assignments(&self) -> &[EntryAssignment] {
        &self.assignments
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}
