//! Database entries and response decoding
//!
//! Catalogue endpoints answer with two sections:
//!
//! ```json
//! {
//!     "data_dump": [{"__entry_type": "Property", "id": 7}],
//!     "cache_dump": {
//!         "Property": {"7": {"id": 7, "NAME": "...", "TYPE": {"__entry_type": "PropertyType", "id": 2}}},
//!         "PropertyType": {"2": {"id": 2, "NAME": "EOS"}}
//!     }
//! }
//! ```
//!
//! `data_dump` lists references; `cache_dump` holds every referenced record
//! keyed by kind and id. Records refer to each other the same way, so decoding
//! walks the references and builds a graph of [`Entry`] values. A record that
//! several others point at is decoded once and shared.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Key marking a JSON object as an entry reference
pub const ENTRY_TYPE_KEY: &str = "__entry_type";

/// Errors raised while decoding entries
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntryError {
    /// The body lacks `data_dump` or `cache_dump`
    #[error("Empty or invalid response")]
    InvalidResponse,

    /// A reference has no usable `id`
    #[error("Entry reference of kind {0} has no id")]
    MissingId(EntryKind),

    /// A reference points at a record absent from `cache_dump`
    #[error("Unknown {kind} entry #{id}")]
    UnknownEntry {
        /// Kind of the missing record
        kind: EntryKind,
        /// Id of the missing record
        id: String,
    },

    /// A record refers back to itself through its fields
    #[error("Reference cycle through {kind} entry #{id}")]
    Cycle {
        /// Kind of the record closing the cycle
        kind: EntryKind,
        /// Id of the record closing the cycle
        id: String,
    },

    /// A field required for the requested view is absent or mistyped
    #[error("Invalid field {field}: {reason}")]
    InvalidField {
        /// Field name
        field: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Kinds of records served by the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntryKind {
    /// A computed property
    Property,
    /// A concrete atomic structure
    StructureEntry,
    /// A crystal prototype
    GenericEntry,
    /// A calculator type
    CalculatorType,
    /// A property type
    PropertyType,
    /// A comparison type
    ComparisonType,
}

impl EntryKind {
    /// Name used in `__entry_type` and as a `cache_dump` key
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Property => "Property",
            EntryKind::StructureEntry => "StructureEntry",
            EntryKind::GenericEntry => "GenericEntry",
            EntryKind::CalculatorType => "CalculatorType",
            EntryKind::PropertyType => "PropertyType",
            EntryKind::ComparisonType => "ComparisonType",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Property" => Ok(EntryKind::Property),
            "StructureEntry" => Ok(EntryKind::StructureEntry),
            "GenericEntry" => Ok(EntryKind::GenericEntry),
            "CalculatorType" => Ok(EntryKind::CalculatorType),
            "PropertyType" => Ok(EntryKind::PropertyType),
            "ComparisonType" => Ok(EntryKind::ComparisonType),
            _ => Err(()),
        }
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// Plain JSON, passed through untouched
    Value(Value),
    /// A nested entry
    Entry(Arc<Entry>),
    /// Named entries, as in a property's `CHILDREN` and `STRUCTURES`
    Entries(BTreeMap<String, Field>),
}

impl Field {
    /// Plain JSON value, if this field is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Nested entry, if this field is one
    pub fn as_entry(&self) -> Option<&Arc<Entry>> {
        match self {
            Field::Entry(entry) => Some(entry),
            _ => None,
        }
    }

    /// Named entries, if this field is a map of them
    pub fn as_entries(&self) -> Option<&BTreeMap<String, Field>> {
        match self {
            Field::Entries(entries) => Some(entries),
            _ => None,
        }
    }

    /// Take the entry out of this field
    pub fn into_entry(self) -> Option<Arc<Entry>> {
        match self {
            Field::Entry(entry) => Some(entry),
            _ => None,
        }
    }
}

/// A database record with its references resolved
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Record kind
    pub kind: EntryKind,
    /// Record id
    pub id: Option<i64>,
    /// Every field of the record, keyed by its service name
    pub fields: BTreeMap<String, Field>,
}

impl Entry {
    /// Look up a field by its service name
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Look up a plain JSON field; JSON `null` reads as absent
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.get(name)
            .and_then(Field::as_value)
            .filter(|value| !value.is_null())
    }

    /// Look up a string field
    pub fn str_of(&self, name: &str) -> Option<&str> {
        self.value_of(name).and_then(Value::as_str)
    }

    /// Look up a nested entry
    pub fn entry_of(&self, name: &str) -> Option<&Entry> {
        self.get(name).and_then(Field::as_entry).map(Arc::as_ref)
    }

    /// `NAME`
    pub fn name(&self) -> Option<&str> {
        self.str_of("NAME")
    }

    /// `COMPOSITION`
    pub fn composition(&self) -> Option<&str> {
        self.str_of("COMPOSITION")
    }

    /// A property's value (`_VALUE`)
    pub fn value(&self) -> Option<&Value> {
        self.value_of("_VALUE")
    }

    /// A property's type entry (`TYPE`)
    pub fn property_type(&self) -> Option<&Entry> {
        self.entry_of("TYPE")
    }

    /// A property's calculator entry (`CALCULATOR`)
    pub fn calculator(&self) -> Option<&Entry> {
        self.entry_of("CALCULATOR")
    }

    /// A property's original structure (`ORIGINAL_STRUCTURE`)
    pub fn original_structure(&self) -> Option<&Entry> {
        self.entry_of("ORIGINAL_STRUCTURE")
    }

    /// A property's child properties (`CHILDREN`)
    pub fn children(&self) -> Option<&BTreeMap<String, Field>> {
        self.get("CHILDREN").and_then(Field::as_entries)
    }

    /// A property's structures (`STRUCTURES`)
    pub fn structures(&self) -> Option<&BTreeMap<String, Field>> {
        self.get("STRUCTURES").and_then(Field::as_entries)
    }

    /// A structure's generic parent prototype (`GENERICPARENT`)
    pub fn generic_parent(&self) -> Option<&Entry> {
        self.entry_of("GENERICPARENT")
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.unwrap_or(-1);
        let name = self.name().unwrap_or_default();
        let composition = self.composition().unwrap_or_default();
        match self.kind {
            EntryKind::Property => {
                let type_name = self
                    .property_type()
                    .and_then(Entry::name)
                    .unwrap_or_default();
                write!(f, "<Property #{}:{}:{}:{}>", id, type_name, composition, name)
            }
            EntryKind::StructureEntry | EntryKind::GenericEntry => {
                write!(f, "<{} #{}:{}>", self.kind, id, composition)
            }
            EntryKind::CalculatorType | EntryKind::PropertyType | EntryKind::ComparisonType => {
                write!(f, "<{} #{}:{}>", self.kind, id, name)
            }
        }
    }
}

// =============================================================================
// Decoding
// =============================================================================

/// Raw catalogue response body
#[derive(Debug, Clone, Deserialize)]
pub struct QueryPayload {
    /// References to the query results
    pub data_dump: Vec<Value>,
    /// Referenced records by kind, then by id
    pub cache_dump: HashMap<String, HashMap<String, Map<String, Value>>>,
}

/// Decode a catalogue response body into result fields
///
/// Items of `data_dump` that are not entry references come back as
/// [`Field::Value`].
pub fn decode(body: &Value) -> Result<Vec<Field>, EntryError> {
    let payload =
        QueryPayload::deserialize(body).map_err(|_| EntryError::InvalidResponse)?;
    let mut resolver = Resolver::new(&payload.cache_dump);
    payload
        .data_dump
        .iter()
        .map(|item| resolver.resolve_value(item))
        .collect()
}

type EntryKey = (EntryKind, String);

/// Walks references against one response's `cache_dump`
struct Resolver<'a> {
    cache_dump: &'a HashMap<String, HashMap<String, Map<String, Value>>>,
    resolved: HashMap<EntryKey, Arc<Entry>>,
    in_progress: HashSet<EntryKey>,
}

impl<'a> Resolver<'a> {
    fn new(cache_dump: &'a HashMap<String, HashMap<String, Map<String, Value>>>) -> Self {
        Self {
            cache_dump,
            resolved: HashMap::new(),
            in_progress: HashSet::new(),
        }
    }

    fn resolve_value(&mut self, value: &Value) -> Result<Field, EntryError> {
        let reference = value.as_object().and_then(|object| {
            let kind = object.get(ENTRY_TYPE_KEY)?.as_str()?.parse::<EntryKind>().ok()?;
            Some((kind, object.get("id")))
        });

        match reference {
            Some((kind, id)) => {
                let id = id.and_then(id_key).ok_or(EntryError::MissingId(kind))?;
                self.resolve_reference(kind, id).map(Field::Entry)
            }
            None => Ok(Field::Value(value.clone())),
        }
    }

    fn resolve_reference(&mut self, kind: EntryKind, id: String) -> Result<Arc<Entry>, EntryError> {
        let key = (kind, id);
        if let Some(entry) = self.resolved.get(&key) {
            return Ok(Arc::clone(entry));
        }
        if self.in_progress.contains(&key) {
            return Err(EntryError::Cycle { kind, id: key.1 });
        }

        let cache_dump = self.cache_dump;
        let record = cache_dump
            .get(kind.as_str())
            .and_then(|records| records.get(&key.1))
            .ok_or_else(|| EntryError::UnknownEntry {
                kind,
                id: key.1.clone(),
            })?;

        self.in_progress.insert(key.clone());
        let mut fields = BTreeMap::new();
        for (name, value) in record {
            let field = match (kind, name.as_str(), value) {
                (EntryKind::Property, "CHILDREN" | "STRUCTURES", Value::Object(members)) => {
                    let mut named = BTreeMap::new();
                    for (member_name, member) in members {
                        named.insert(member_name.clone(), self.resolve_value(member)?);
                    }
                    Field::Entries(named)
                }
                _ => self.resolve_value(value)?,
            };
            fields.insert(name.clone(), field);
        }
        self.in_progress.remove(&key);

        let id = record
            .get("id")
            .and_then(Value::as_i64)
            .or_else(|| key.1.parse().ok());
        let entry = Arc::new(Entry { kind, id, fields });
        self.resolved.insert(key, Arc::clone(&entry));
        Ok(entry)
    }
}

/// `cache_dump` keys ids as strings; references may carry numbers
fn id_key(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}
