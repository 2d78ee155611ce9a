// Validator — pure per-step validation over the document.
//
// Stateless and deterministic: the same (step, document) pair always yields
// a structurally equal result, and the error map is rebuilt from scratch on
// every pass.

use std::collections::BTreeMap;

use intake_wizard_types::{
    schema, steps, Document, FieldKind, FieldSpec, TextFormat, Validation, STEP_SOURCE,
};
use serde_json::Value;

/// Validate one step of the wizard against the current document.
///
/// The optional source step and the read-only summary step always validate:
/// they carry no fields and must never block navigation.
pub fn validate(step_index: usize, document: &Document) -> Validation {
    let Some(step) = steps::step(step_index) else {
        return Validation::valid();
    };
    if step.index == STEP_SOURCE || step.index == steps::summary_index() {
        return Validation::valid();
    }

    let mut errors = BTreeMap::new();
    for path in step.required {
        check_required(path, document, &mut errors);
    }
    for spec in schema::fields_for_step(step.index) {
        check_rules(spec, None, document, &mut errors);
    }
    Validation::from_errors(errors)
}

fn check_required(path: &str, document: &Document, errors: &mut BTreeMap<String, String>) {
    let Some(spec) = schema::field(path) else {
        return;
    };
    match spec.kind {
        FieldKind::Scalar => {
            if document.text(path).trim().is_empty() {
                errors.insert(path.to_string(), format!("{} is required", spec.label));
            }
        }
        FieldKind::List => {
            // A list requirement is satisfiable either by a selection or by a
            // non-empty free-text companion field.
            if document.list_len(path) == 0 && !companion_filled(spec, document) {
                errors.insert(
                    path.to_string(),
                    format!("At least one {} is required", spec.label),
                );
            }
        }
        FieldKind::RecordList => {
            if document.list_len(path) == 0 {
                errors.insert(
                    path.to_string(),
                    format!("At least one {} is required", spec.label),
                );
            }
        }
        // Records are required through their children's dotted paths.
        FieldKind::Record => {}
    }
}

fn companion_filled(spec: &FieldSpec, document: &Document) -> bool {
    spec.rules
        .companion
        .map(|path| !document.text(path).trim().is_empty())
        .unwrap_or(false)
}

/// Apply per-field rules: conditional requirements, formats, and minimum
/// lengths, recursing into records and record-list entries.
fn check_rules(
    spec: &'static FieldSpec,
    prefix: Option<&str>,
    document: &Document,
    errors: &mut BTreeMap<String, String>,
) {
    let path = match prefix {
        Some(prefix) => format!("{prefix}.{}", spec.key),
        None => spec.key.to_string(),
    };
    match spec.kind {
        FieldKind::Scalar => {
            check_scalar_rules(spec, &path, document.text(&path), prefix, document, errors);
        }
        FieldKind::Record => {
            for child in spec.children {
                check_rules(child, Some(path.as_str()), document, errors);
            }
        }
        FieldKind::RecordList => {
            let Some(entries) = document.get(&path).and_then(Value::as_array) else {
                return;
            };
            for (i, entry) in entries.iter().enumerate() {
                for child in spec.children {
                    let value = entry
                        .get(child.key)
                        .and_then(Value::as_str)
                        .unwrap_or("");
                    let item_path = format!("{path}[{i}].{}", child.key);
                    check_item_scalar(child, &item_path, value, errors);
                }
            }
        }
        FieldKind::List => {}
    }
}

fn check_scalar_rules(
    spec: &FieldSpec,
    path: &str,
    value: &str,
    prefix: Option<&str>,
    document: &Document,
    errors: &mut BTreeMap<String, String>,
) {
    let trimmed = value.trim();

    // Conditionally required only while the sibling holds the sentinel value;
    // otherwise the field is ignored even when empty.
    if let Some(cond) = spec.rules.required_when {
        let sibling_path = match prefix {
            Some(prefix) => format!("{prefix}.{}", cond.sibling),
            None => cond.sibling.to_string(),
        };
        if document.text(&sibling_path).trim() == cond.value && trimmed.is_empty() {
            errors.insert(path.to_string(), format!("{} is required", spec.label));
        }
    }

    if trimmed.is_empty() {
        return;
    }
    if let Some(min) = spec.rules.min_len {
        if trimmed.chars().count() < min {
            errors.insert(
                path.to_string(),
                format!("{} must be at least {min} characters", spec.label),
            );
            return;
        }
    }
    if spec.rules.format == Some(TextFormat::Email) && !is_valid_email(trimmed) {
        errors.insert(path.to_string(), "Enter a valid email address".to_string());
    }
}

fn check_item_scalar(
    spec: &FieldSpec,
    path: &str,
    value: &str,
    errors: &mut BTreeMap<String, String>,
) {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        if spec.rules.required_in_item {
            errors.insert(path.to_string(), format!("{} is required", spec.label));
        }
        return;
    }
    if let Some(min) = spec.rules.min_len {
        if trimmed.chars().count() < min {
            // Distinct message from plain non-emptiness.
            errors.insert(
                path.to_string(),
                format!("{} must be at least {min} characters", spec.label),
            );
        }
    }
}

/// Deliberately loose email shape: exactly one `@` with a dot somewhere
/// after it. Tightening this would reject values the rest of the system
/// already accepts.
fn is_valid_email(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && domain.contains('.'),
        _ => false,
    }
}
