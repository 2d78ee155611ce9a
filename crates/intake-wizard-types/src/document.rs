// Document — the single nested record holding every wizard field value.
//
// Steps are views over this one document, not records of their own. Its shape
// is fixed by the field schema: every schema key is always present, and a
// field not yet supplied holds its declared empty value ("" or []) so readers
// never branch on presence vs. absence.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::{self, FieldKind, FieldSpec};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

fn empty_value(spec: &FieldSpec) -> Value {
    match spec.kind {
        FieldKind::Scalar => Value::String(String::new()),
        FieldKind::List | FieldKind::RecordList => Value::Array(Vec::new()),
        FieldKind::Record => {
            let mut record = Map::new();
            for child in spec.children {
                record.insert(child.key.to_string(), empty_value(child));
            }
            Value::Object(record)
        }
    }
}

/// An empty record shaped like one entry of the given `RecordList` field.
pub fn empty_entry(spec: &FieldSpec) -> Value {
    let mut record = Map::new();
    for child in spec.children {
        record.insert(child.key.to_string(), empty_value(child));
    }
    Value::Object(record)
}

impl Document {
    /// The declared-empty document: every schema key present, no values.
    pub fn empty() -> Self {
        let mut fields = Map::new();
        for spec in schema::FIELDS {
            fields.insert(spec.key.to_string(), empty_value(spec));
        }
        Self { fields }
    }

    /// Wrap an already-shaped field map. Used by the merge engine, which
    /// always starts from an existing document's fields.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Resolve a dot/index path (`"location.state"`, `"products[0].name"`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current: Option<&Value> = None;
        for segment in path.split('.') {
            let (key, index) = schema::split_key_index(segment);
            let container = match current {
                None => self.fields.get(key),
                Some(Value::Object(map)) => map.get(key),
                Some(_) => return None,
            };
            current = match (container, index) {
                (Some(Value::Array(items)), Some(i)) => items.get(i),
                (value, None) => value,
                _ => return None,
            };
            current?;
        }
        current
    }

    /// The text at a scalar path, or `""` when the path does not resolve to
    /// a string. Never panics, never distinguishes unset from empty.
    pub fn text(&self, path: &str) -> &str {
        self.get(path).and_then(Value::as_str).unwrap_or("")
    }

    /// Length of the list at a path, or 0 when the path is not a list.
    pub fn list_len(&self, path: &str) -> usize {
        self.get(path)
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Whether any field on the given step holds a non-empty value.
    pub fn step_has_content(&self, step: usize) -> bool {
        schema::fields_for_step(step).any(|spec| {
            self.fields
                .get(spec.key)
                .map(value_has_content)
                .unwrap_or(false)
        })
    }
}

fn value_has_content(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => map.values().any(value_has_content),
        Value::Null => false,
        _ => true,
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}
