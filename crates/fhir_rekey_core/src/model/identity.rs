//! Canonical identity model.
//!
//! # Responsibility
//! - Generate fresh random identities for bundles and resources.
//! - Render identities into raw (`Resource.id`) and URN (`fullUrl`) forms.
//!
//! # Invariants
//! - Every generated identity is a random version-4 UUID.
//! - The URN form is always `urn:uuid:` followed by the raw form.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Prefix of the canonical external encoding.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";
/// Identifier system used for URI-valued identifiers (RFC 3986).
pub const URN_IDENTIFIER_SYSTEM: &str = "urn:ietf:rfc:3986";

/// Freshly generated identity assigned to one bundle or resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(Uuid);

impl CanonicalId {
    /// Generates a new random identity. Generation cannot fail.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Raw lowercase hyphenated form, used for `id` fields.
    pub fn raw(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// Canonical `urn:uuid:<uuid>` encoding, used for locators and references.
    pub fn urn(&self) -> String {
        to_urn(&self.raw())
    }
}

impl Display for CanonicalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Renders a raw identity into its canonical external encoding.
pub fn to_urn(raw: &str) -> String {
    format!("{URN_UUID_PREFIX}{raw}")
}

/// One entry of a FHIR `identifier` list.
///
/// Extra members on existing entries (`use`, `type`, ...) are ignored when
/// comparing, so only `system` + `value` decide equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierEntry {
    pub system: Option<String>,
    pub value: Option<String>,
}

impl IdentifierEntry {
    /// Builds the URN identifier entry for one canonical identity.
    pub fn urn_for(id: &CanonicalId) -> Self {
        Self {
            system: Some(URN_IDENTIFIER_SYSTEM.to_string()),
            value: Some(id.urn()),
        }
    }

    /// Returns whether a raw JSON element carries the same system and value.
    pub fn matches(&self, candidate: &serde_json::Value) -> bool {
        if !candidate.is_object() {
            return false;
        }
        serde_json::from_value::<IdentifierEntry>(candidate.clone())
            .map(|existing| existing == *self)
            .unwrap_or(false)
    }

    /// Converts into a JSON object with `system` first, then `value`.
    pub fn to_value(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(system) = &self.system {
            map.insert("system".to_string(), system.clone().into());
        }
        if let Some(value) = &self.value {
            map.insert("value".to_string(), value.clone().into());
        }
        serde_json::Value::Object(map)
    }
}
