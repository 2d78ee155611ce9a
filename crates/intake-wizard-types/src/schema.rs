// Field schema — static catalog of every field the wizard collects.
//
// Pure data: the merge engine reads `kind` to decide how to apply a partial
// update, the validator reads `rules`, and the document builder reads the
// whole tree to lay out the empty document. Nothing here has runtime state.

/// Structural kind of a field, consulted once per key by the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single text value. Stored as a JSON string.
    Scalar,
    /// A flat list of strings. Replaced wholesale on merge.
    List,
    /// A nested record of scalars. Merged key-by-key.
    Record,
    /// A list of homogeneous sub-records. Replaced wholesale on merge.
    RecordList,
}

/// Format constraint applied on top of non-emptiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Exactly one `@` with a dot somewhere after it. Deliberately loose;
    /// the rest of the system accepts what this accepts.
    Email,
}

/// Declares a field required only while a sibling holds a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingEquals {
    pub sibling: &'static str,
    pub value: &'static str,
}

/// Validation rules a field carries beyond step-level requiredness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRules {
    /// Minimum trimmed length, checked only when the value is non-empty.
    pub min_len: Option<usize>,
    pub format: Option<TextFormat>,
    /// Free-text field that satisfies this list requirement when the list
    /// itself is empty.
    pub companion: Option<&'static str>,
    pub required_when: Option<SiblingEquals>,
    /// For children of a `RecordList`: required inside every entry.
    pub required_in_item: bool,
}

impl FieldRules {
    pub const NONE: FieldRules = FieldRules {
        min_len: None,
        format: None,
        companion: None,
        required_when: None,
        required_in_item: false,
    };
}

/// One field in the catalog.
#[derive(Debug)]
pub struct FieldSpec {
    /// Key within its container (document root, record, or record entry).
    pub key: &'static str,
    /// Human label used to build validation messages.
    pub label: &'static str,
    /// Step the field is presented on.
    pub step: usize,
    pub kind: FieldKind,
    /// Children for `Record` and `RecordList` kinds; empty otherwise.
    pub children: &'static [FieldSpec],
    pub rules: FieldRules,
}

use crate::steps::{
    STEP_COMPANY, STEP_COMPLIANCE, STEP_CONTACT, STEP_MARKETS, STEP_PRODUCTS, STEP_SOURCE,
};

const LOCATION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "city",
        label: "City",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "state",
        label: "State or province",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "country",
        label: "Country",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
];

const CONTACT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "name",
        label: "Contact name",
        step: STEP_CONTACT,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "title",
        label: "Contact title",
        step: STEP_CONTACT,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "email",
        label: "Contact email",
        step: STEP_CONTACT,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules {
            format: Some(TextFormat::Email),
            ..FieldRules::NONE
        },
    },
    FieldSpec {
        key: "phone",
        label: "Contact phone",
        step: STEP_CONTACT,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
];

const PRODUCT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "name",
        label: "Product name",
        step: STEP_PRODUCTS,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules {
            required_in_item: true,
            ..FieldRules::NONE
        },
    },
    FieldSpec {
        key: "overview",
        label: "Product overview",
        step: STEP_PRODUCTS,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules {
            required_in_item: true,
            min_len: Some(50),
            ..FieldRules::NONE
        },
    },
    FieldSpec {
        key: "url",
        label: "Product URL",
        step: STEP_PRODUCTS,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
];

/// The complete catalog. Top-level keys define the document shape; the
/// document never holds a key that is not listed here.
pub const FIELDS: &[FieldSpec] = &[
    // Step 0 — source material for extraction. Never required.
    FieldSpec {
        key: "sourceUrl",
        label: "Source URL",
        step: STEP_SOURCE,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "sourceText",
        label: "Source text",
        step: STEP_SOURCE,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    // Step 1 — company basics.
    FieldSpec {
        key: "companyName",
        label: "Company name",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "website",
        label: "Website",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "yearFounded",
        label: "Year founded",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "overview",
        label: "Company overview",
        step: STEP_COMPANY,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "location",
        label: "Location",
        step: STEP_COMPANY,
        kind: FieldKind::Record,
        children: LOCATION_FIELDS,
        rules: FieldRules::NONE,
    },
    // Step 2 — primary contact.
    FieldSpec {
        key: "primaryContact",
        label: "Primary contact",
        step: STEP_CONTACT,
        kind: FieldKind::Record,
        children: CONTACT_FIELDS,
        rules: FieldRules::NONE,
    },
    // Step 3 — products.
    FieldSpec {
        key: "products",
        label: "product",
        step: STEP_PRODUCTS,
        kind: FieldKind::RecordList,
        children: PRODUCT_FIELDS,
        rules: FieldRules::NONE,
    },
    // Step 4 — markets and classification.
    FieldSpec {
        key: "industries",
        label: "industry",
        step: STEP_MARKETS,
        kind: FieldKind::List,
        children: &[],
        rules: FieldRules {
            companion: Some("industriesOther"),
            ..FieldRules::NONE
        },
    },
    FieldSpec {
        key: "industriesOther",
        label: "Other industry",
        step: STEP_MARKETS,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "regions",
        label: "region",
        step: STEP_MARKETS,
        kind: FieldKind::List,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "referralSource",
        label: "Referral source",
        step: STEP_MARKETS,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "referralSourceOther",
        label: "Referral source detail",
        step: STEP_MARKETS,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules {
            required_when: Some(SiblingEquals {
                sibling: "referralSource",
                value: "Other",
            }),
            ..FieldRules::NONE
        },
    },
    // Step 5 — compliance. Optional content, never blocks.
    FieldSpec {
        key: "certifications",
        label: "certification",
        step: STEP_COMPLIANCE,
        kind: FieldKind::List,
        children: &[],
        rules: FieldRules::NONE,
    },
    FieldSpec {
        key: "complianceNotes",
        label: "Compliance notes",
        step: STEP_COMPLIANCE,
        kind: FieldKind::Scalar,
        children: &[],
        rules: FieldRules::NONE,
    },
];

/// Split one path segment into its key and optional `[index]` suffix.
/// `"products[2]"` → `("products", Some(2))`; `"city"` → `("city", None)`.
pub fn split_key_index(segment: &str) -> (&str, Option<usize>) {
    if let Some(open) = segment.find('[') {
        if let Some(stripped) = segment[open + 1..].strip_suffix(']') {
            if let Ok(idx) = stripped.parse::<usize>() {
                return (&segment[..open], Some(idx));
            }
        }
    }
    (segment, None)
}

/// Resolve a dot/index path (`"primaryContact.email"`, `"products[0].name"`)
/// to its `FieldSpec`. Index suffixes are stripped; the spec describes the
/// field, not one particular entry.
pub fn field(path: &str) -> Option<&'static FieldSpec> {
    let mut specs = FIELDS;
    let mut found: Option<&'static FieldSpec> = None;
    for segment in path.split('.') {
        let (key, _) = split_key_index(segment);
        found = specs.iter().find(|f| f.key == key);
        specs = match found {
            Some(spec) => spec.children,
            None => return None,
        };
    }
    found
}

/// Top-level fields presented on the given step.
pub fn fields_for_step(step: usize) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |f| f.step == step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::STEPS;

    #[test]
    fn test_top_level_lookup() {
        let spec = field("companyName").unwrap();
        assert_eq!(spec.kind, FieldKind::Scalar);
        assert_eq!(spec.label, "Company name");
    }

    #[test]
    fn test_nested_record_lookup() {
        let spec = field("primaryContact.email").unwrap();
        assert_eq!(spec.kind, FieldKind::Scalar);
        assert_eq!(spec.rules.format, Some(TextFormat::Email));
    }

    #[test]
    fn test_record_list_child_lookup_with_index() {
        let spec = field("products[3].overview").unwrap();
        assert_eq!(spec.rules.min_len, Some(50));
        assert!(spec.rules.required_in_item);
    }

    #[test]
    fn test_unknown_path_is_none() {
        assert!(field("nonsense").is_none());
        assert!(field("location.planet").is_none());
        assert!(field("companyName.anything").is_none());
    }

    #[test]
    fn test_split_key_index() {
        assert_eq!(split_key_index("products[2]"), ("products", Some(2)));
        assert_eq!(split_key_index("city"), ("city", None));
        assert_eq!(split_key_index("odd[x]"), ("odd[x]", None));
    }

    #[test]
    fn test_every_required_path_resolves() {
        for step in STEPS {
            for path in step.required {
                assert!(field(path).is_some(), "unresolvable required path {path}");
            }
        }
    }

    #[test]
    fn test_companions_and_sentinels_resolve() {
        for spec in FIELDS {
            if let Some(companion) = spec.rules.companion {
                assert!(field(companion).is_some(), "missing companion {companion}");
            }
            if let Some(cond) = spec.rules.required_when {
                assert!(
                    field(cond.sibling).is_some(),
                    "missing sentinel sibling {}",
                    cond.sibling
                );
            }
        }
    }

    #[test]
    fn test_containers_declare_children() {
        for spec in FIELDS {
            match spec.kind {
                FieldKind::Record | FieldKind::RecordList => {
                    assert!(!spec.children.is_empty(), "{} has no children", spec.key)
                }
                FieldKind::Scalar | FieldKind::List => {
                    assert!(spec.children.is_empty(), "{} has children", spec.key)
                }
            }
        }
    }

    #[test]
    fn test_field_steps_are_in_range() {
        for spec in FIELDS {
            assert!(spec.step < STEPS.len());
        }
    }
}
