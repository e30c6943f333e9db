//! Validated view over a FHIR `Bundle` JSON document.
//!
//! # Responsibility
//! - Reject inputs that are not a `Bundle` object before anything is mutated.
//! - Expose entries, locators and resources without copying the document.
//!
//! # Invariants
//! - `root` always holds `resourceType == "Bundle"`.
//! - When present, `entry` is an array whose elements are all objects.
//! - Field order of the input document is preserved.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const RESOURCE_TYPE_FIELD: &str = "resourceType";
pub const BUNDLE_RESOURCE_TYPE: &str = "Bundle";
pub const ID_FIELD: &str = "id";
pub const IDENTIFIER_FIELD: &str = "identifier";
pub const ENTRY_FIELD: &str = "entry";
pub const FULL_URL_FIELD: &str = "fullUrl";
pub const RESOURCE_FIELD: &str = "resource";

/// Input shape errors. All of them are detected before mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleError {
    /// Top-level JSON value is not an object.
    NotAnObject,
    /// Top-level object is not tagged `resourceType: "Bundle"`.
    NotABundle { found: Option<String> },
    /// `Bundle.entry` exists but is not an array.
    EntryNotArray,
    /// `Bundle.entry[index]` is not an object.
    EntryNotObject { index: usize },
}

impl Display for BundleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "input must be a FHIR Bundle JSON object"),
            Self::NotABundle { found: Some(found) } => {
                write!(f, "input must be a FHIR Bundle, found resourceType `{found}`")
            }
            Self::NotABundle { found: None } => {
                write!(f, "input must be a FHIR Bundle, resourceType is missing")
            }
            Self::EntryNotArray => write!(f, "Bundle.entry must be an array"),
            Self::EntryNotObject { index } => {
                write!(f, "Bundle.entry[{index}] must be an object")
            }
        }
    }
}

impl Error for BundleError {}

/// Container document holding ordered entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    root: Map<String, Value>,
}

impl Bundle {
    /// Validates and wraps a parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, BundleError> {
        let Value::Object(root) = value else {
            return Err(BundleError::NotAnObject);
        };

        match root.get(RESOURCE_TYPE_FIELD) {
            Some(Value::String(kind)) if kind == BUNDLE_RESOURCE_TYPE => {}
            Some(Value::String(kind)) => {
                return Err(BundleError::NotABundle {
                    found: Some(kind.clone()),
                })
            }
            Some(other) => {
                return Err(BundleError::NotABundle {
                    found: Some(other.to_string()),
                })
            }
            None => return Err(BundleError::NotABundle { found: None }),
        }

        match root.get(ENTRY_FIELD) {
            None => {}
            Some(Value::Array(entries)) => {
                if let Some(index) = entries.iter().position(|entry| !entry.is_object()) {
                    return Err(BundleError::EntryNotObject { index });
                }
            }
            Some(_) => return Err(BundleError::EntryNotArray),
        }

        Ok(Self { root })
    }

    /// Returns the document, consuming the view.
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    pub fn entry_count(&self) -> usize {
        self.root
            .get(ENTRY_FIELD)
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }

    /// Iterates entries in document order.
    pub fn entries(&self) -> impl Iterator<Item = EntryView<'_>> {
        self.root
            .get(ENTRY_FIELD)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .enumerate()
            .filter_map(|(index, entry)| {
                entry.as_object().map(|slot| EntryView { index, slot })
            })
    }

    /// Mutable access to one entry object.
    pub fn entry_mut(&mut self, index: usize) -> Option<&mut Map<String, Value>> {
        self.root
            .get_mut(ENTRY_FIELD)
            .and_then(Value::as_array_mut)
            .and_then(|entries| entries.get_mut(index))
            .and_then(Value::as_object_mut)
    }
}

impl TryFrom<Value> for Bundle {
    type Error = BundleError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Read-only view of one `Bundle.entry` slot.
#[derive(Debug, Clone, Copy)]
pub struct EntryView<'a> {
    pub index: usize,
    slot: &'a Map<String, Value>,
}

impl<'a> EntryView<'a> {
    /// Historical `fullUrl` when it is a string.
    pub fn full_url(&self) -> Option<&'a str> {
        self.slot.get(FULL_URL_FIELD).and_then(Value::as_str)
    }

    /// Nested resource when it is an object.
    pub fn resource(&self) -> Option<&'a Map<String, Value>> {
        self.slot.get(RESOURCE_FIELD).and_then(Value::as_object)
    }

    /// Non-empty `resource.resourceType`.
    pub fn resource_type(&self) -> Option<&'a str> {
        self.resource()
            .and_then(|resource| resource.get(RESOURCE_TYPE_FIELD))
            .and_then(Value::as_str)
            .filter(|kind| !kind.is_empty())
    }

    /// `resource.id` when it is a string.
    pub fn local_id(&self) -> Option<&'a str> {
        self.resource()
            .and_then(|resource| resource.get(ID_FIELD))
            .and_then(Value::as_str)
    }
}
