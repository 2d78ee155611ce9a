// Document merge engine — the single mutation path for all field state.
//
// Every document change, whether a one-field operator edit or a section
// pushed by the extraction service, is expressed as a sparse partial update
// and applied here. The engine consults the field schema once per key for
// the structural kind instead of inferring shape from the incoming value.

use intake_wizard_types::{empty_entry, schema, Document, FieldKind, FieldSpec};
use serde_json::{Map, Value};

/// Apply a partial update to a document, returning the merged document.
///
/// Pure: the input document is never mutated, so callers can compare the
/// result against the original and re-validate only on real change.
///
/// Per-key semantics, driven by the schema kind:
/// - scalars are overwritten when the incoming value is non-null (numbers
///   and booleans are coerced to strings);
/// - records are merged key-by-key, so `{location: {state: "CA"}}` leaves an
///   already-known `location.country` intact;
/// - lists and lists-of-records are replaced wholesale — the extraction
///   source always emits a complete, corrected view of a section;
/// - null values and keys absent from the partial leave the document
///   untouched;
/// - keys not in the schema are ignored.
///
/// Applying the same partial twice is a no-op on the second application.
pub fn merge(document: &Document, partial: &Value) -> Document {
    let Value::Object(updates) = partial else {
        if !partial.is_null() {
            tracing::debug!("ignoring non-object partial update");
        }
        return document.clone();
    };
    let mut fields = document.as_map().clone();
    merge_level(&mut fields, schema::FIELDS, updates);
    Document::from_map(fields)
}

fn merge_level(target: &mut Map<String, Value>, specs: &[FieldSpec], updates: &Map<String, Value>) {
    for (key, incoming) in updates {
        if incoming.is_null() {
            continue;
        }
        let Some(spec) = specs.iter().find(|f| f.key == key.as_str()) else {
            tracing::debug!(key, "ignoring unknown field in partial update");
            continue;
        };
        match spec.kind {
            FieldKind::Scalar => {
                if let Some(text) = coerce_scalar(incoming) {
                    target.insert(key.clone(), Value::String(text));
                } else {
                    tracing::debug!(key, "ignoring non-scalar value for scalar field");
                }
            }
            FieldKind::List => {
                if let Some(items) = incoming.as_array() {
                    let list: Vec<Value> = items
                        .iter()
                        .filter_map(coerce_scalar)
                        .map(Value::String)
                        .collect();
                    target.insert(key.clone(), Value::Array(list));
                } else {
                    tracing::debug!(key, "ignoring non-list value for list field");
                }
            }
            FieldKind::Record => {
                if let Some(nested) = incoming.as_object() {
                    let mut record = match target.get(key) {
                        Some(Value::Object(existing)) => existing.clone(),
                        _ => Map::new(),
                    };
                    merge_level(&mut record, spec.children, nested);
                    target.insert(key.clone(), Value::Object(record));
                } else {
                    tracing::debug!(key, "ignoring non-record value for record field");
                }
            }
            FieldKind::RecordList => {
                if let Some(items) = incoming.as_array() {
                    let entries: Vec<Value> = items
                        .iter()
                        .filter_map(|item| item.as_object())
                        .map(|item| coerce_entry(spec, item))
                        .collect();
                    target.insert(key.clone(), Value::Array(entries));
                } else {
                    tracing::debug!(key, "ignoring non-list value for record-list field");
                }
            }
        }
    }
}

/// Normalize one record-list entry to the full schema shape: every child key
/// present, unknown keys dropped, missing values left at their empty value.
fn coerce_entry(spec: &FieldSpec, incoming: &Map<String, Value>) -> Value {
    let mut entry = match empty_entry(spec) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for child in spec.children {
        if let Some(value) = incoming.get(child.key) {
            if let Some(text) = coerce_scalar(value) {
                entry.insert(child.key.to_string(), Value::String(text));
            }
        }
    }
    Value::Object(entry)
}

fn coerce_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Build the one-field partial update for an operator edit
/// (`"location.state"` → `{"location": {"state": value}}`). The value may be
/// a scalar or a full replacement list; either way it is applied through
/// [`merge`] like any other partial.
pub fn field_update(path: &str, value: Value) -> Value {
    let mut current = value;
    for segment in path.rsplit('.') {
        let mut wrapper = Map::new();
        wrapper.insert(segment.to_string(), current);
        current = Value::Object(wrapper);
    }
    current
}

/// [`field_update`] for plain text values.
pub fn scalar_update(path: &str, value: impl Into<String>) -> Value {
    field_update(path, Value::String(value.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_overwrite() {
        let doc = Document::empty();
        let merged = merge(&doc, &json!({"companyName": "Acme"}));
        assert_eq!(merged.text("companyName"), "Acme");
        // Input untouched
        assert_eq!(doc.text("companyName"), "");
    }

    #[test]
    fn test_absent_keys_untouched() {
        let doc = merge(&Document::empty(), &json!({"website": "https://acme.test"}));
        let merged = merge(&doc, &json!({"companyName": "Acme"}));
        assert_eq!(merged.text("website"), "https://acme.test");
        assert_eq!(merged.text("companyName"), "Acme");
    }

    #[test]
    fn test_null_skipped() {
        let doc = merge(&Document::empty(), &json!({"companyName": "Acme"}));
        let merged = merge(&doc, &json!({"companyName": null}));
        assert_eq!(merged.text("companyName"), "Acme");
    }

    #[test]
    fn test_record_merges_key_by_key() {
        let doc = merge(&Document::empty(), &json!({"location": {"state": "CA"}}));
        let merged = merge(&doc, &json!({"location": {"country": "US"}}));
        assert_eq!(merged.text("location.state"), "CA");
        assert_eq!(merged.text("location.country"), "US");
    }

    #[test]
    fn test_list_replaced_wholesale() {
        let doc = merge(&Document::empty(), &json!({"industries": ["Robotics", "Energy"]}));
        let merged = merge(&doc, &json!({"industries": ["Logistics"]}));
        assert_eq!(
            merged.get("industries").unwrap(),
            &json!(["Logistics"]),
            "lists are replaced, not appended"
        );
    }

    #[test]
    fn test_record_list_replaced_and_normalized() {
        let doc = merge(
            &Document::empty(),
            &json!({"products": [{"name": "Widget", "stray": true}]}),
        );
        let entry = &doc.get("products").unwrap().as_array().unwrap()[0];
        assert_eq!(entry["name"], "Widget");
        assert_eq!(entry["overview"], "");
        assert_eq!(entry["url"], "");
        assert!(entry.get("stray").is_none());
    }

    #[test]
    fn test_idempotence() {
        let partial = json!({
            "companyName": "Acme",
            "location": {"state": "CA"},
            "products": [{"name": "Widget", "overview": "x", "url": ""}],
            "industries": ["Robotics"],
        });
        let once = merge(&Document::empty(), &partial);
        let twice = merge(&once, &partial);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_number_coerced_to_string() {
        let merged = merge(&Document::empty(), &json!({"yearFounded": 2009}));
        assert_eq!(merged.text("yearFounded"), "2009");
    }

    #[test]
    fn test_unknown_key_ignored() {
        let doc = Document::empty();
        let merged = merge(&doc, &json!({"notAField": "x"}));
        assert_eq!(merged, doc);
        assert!(merged.get("notAField").is_none());
    }

    #[test]
    fn test_mistyped_values_ignored() {
        let doc = merge(&Document::empty(), &json!({"companyName": "Acme"}));
        let merged = merge(
            &doc,
            &json!({"companyName": ["not", "a", "scalar"], "industries": "not a list"}),
        );
        assert_eq!(merged.text("companyName"), "Acme");
        assert_eq!(merged.list_len("industries"), 0);
    }

    #[test]
    fn test_non_object_partial_is_noop() {
        let doc = merge(&Document::empty(), &json!({"companyName": "Acme"}));
        assert_eq!(merge(&doc, &json!("nonsense")), doc);
        assert_eq!(merge(&doc, &Value::Null), doc);
    }

    #[test]
    fn test_later_merge_wins_per_path() {
        let doc = merge(&Document::empty(), &json!({"companyName": "Acme"}));
        let merged = merge(&doc, &json!({"companyName": "Acme Corp"}));
        assert_eq!(merged.text("companyName"), "Acme Corp");
    }

    #[test]
    fn test_scalar_update_builder() {
        assert_eq!(scalar_update("companyName", "Acme"), json!({"companyName": "Acme"}));
        assert_eq!(
            scalar_update("location.state", "CA"),
            json!({"location": {"state": "CA"}})
        );
    }

    #[test]
    fn test_scalar_update_routes_through_merge() {
        let doc = merge(&Document::empty(), &scalar_update("primaryContact.email", "a@b.co"));
        assert_eq!(doc.text("primaryContact.email"), "a@b.co");
        assert_eq!(doc.text("primaryContact.name"), "");
    }
}
