//! Identity and `identifier` augmentation.

use crate::model::bundle::{ID_FIELD, IDENTIFIER_FIELD};
use crate::model::identity::{CanonicalId, IdentifierEntry};
use log::debug;
use serde_json::{Map, Value};

/// Declared cardinality of the `identifier` element being augmented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCardinality {
    /// `Bundle.identifier` (0..1).
    Single,
    /// `Resource.identifier` (0..*).
    Many,
}

/// What happened to the `identifier` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierChange {
    /// Element was absent and has been created.
    Created,
    /// A single object became a two-element list.
    Converted,
    /// The new entry was appended to an existing list.
    Appended,
    /// An equal entry already existed.
    AlreadyPresent,
    /// Element had an unexpected shape and was replaced.
    Replaced,
}

/// Sets `id` to the raw identity and adds the URN identifier entry.
pub fn stamp_identity(
    target: &mut Map<String, Value>,
    id: &CanonicalId,
    cardinality: IdentifierCardinality,
) -> IdentifierChange {
    set_raw_id(target, id);
    add_identifier(target, &IdentifierEntry::urn_for(id), cardinality)
}

/// Sets `id` to the raw identity, keeping the field position when present.
pub fn set_raw_id(target: &mut Map<String, Value>, id: &CanonicalId) {
    target.insert(ID_FIELD.to_string(), Value::String(id.raw()));
}

/// Adds `entry` to `identifier` following the normalization contract.
///
/// # Contract
/// - Absent: a one-element list (`Many`) or a single object (`Single`).
/// - Single object: becomes `[existing, entry]` unless it already equals `entry`.
/// - List: `entry` is appended unless an element has the same system and value.
/// - Any other shape: replaced by `[entry]`.
pub fn add_identifier(
    target: &mut Map<String, Value>,
    entry: &IdentifierEntry,
    cardinality: IdentifierCardinality,
) -> IdentifierChange {
    let new_value = entry.to_value();

    let Some(existing) = target.get_mut(IDENTIFIER_FIELD) else {
        let created = match cardinality {
            IdentifierCardinality::Single => new_value,
            IdentifierCardinality::Many => Value::Array(vec![new_value]),
        };
        target.insert(IDENTIFIER_FIELD.to_string(), created);
        return IdentifierChange::Created;
    };

    if existing.is_object() && entry.matches(existing) {
        if cardinality == IdentifierCardinality::Many {
            let single = existing.take();
            *existing = Value::Array(vec![single]);
        }
        return IdentifierChange::AlreadyPresent;
    }

    match existing {
        Value::Array(items) => {
            if items.iter().any(|item| entry.matches(item)) {
                return IdentifierChange::AlreadyPresent;
            }
            items.push(new_value);
            IdentifierChange::Appended
        }
        Value::Object(_) => {
            let single = existing.take();
            *existing = Value::Array(vec![single, new_value]);
            IdentifierChange::Converted
        }
        other => {
            debug!(
                "event=identifier_replaced module=rewrite status=ok previous_kind={}",
                json_kind(other)
            );
            *other = Value::Array(vec![new_value]);
            IdentifierChange::Replaced
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
