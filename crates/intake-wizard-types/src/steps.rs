// Step definitions — the static, ordered table of wizard pages.

/// Index of the optional extraction-source step.
pub const STEP_SOURCE: usize = 0;
pub const STEP_COMPANY: usize = 1;
pub const STEP_CONTACT: usize = 2;
pub const STEP_PRODUCTS: usize = 3;
pub const STEP_MARKETS: usize = 4;
pub const STEP_COMPLIANCE: usize = 5;
pub const STEP_REVIEW: usize = 6;

/// How a step's "shown as done" signal is computed. Completion is distinct
/// from validity: an optional step can be skippable yet not-done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionRule {
    /// Done once the step has been passed by parse or skip. Content-independent.
    SourceEntered,
    /// Done iff the step currently validates.
    StepValidity,
    /// Done iff at least one of the step's fields holds a value. The step
    /// never blocks navigation either way.
    AnyContent,
    /// Done iff the source step was entered and every non-optional step
    /// before this one validates. Recomputed on every query, never cached.
    AllRequiredValid,
}

/// One page of the wizard.
#[derive(Debug)]
pub struct StepDef {
    pub index: usize,
    pub name: &'static str,
    pub title: &'static str,
    /// Only the source step is optional: it can be skipped outright.
    pub is_optional: bool,
    /// Field paths that must validate before `next()` leaves this step.
    pub required: &'static [&'static str],
    pub completion: CompletionRule,
}

pub const STEPS: &[StepDef] = &[
    StepDef {
        index: STEP_SOURCE,
        name: "source",
        title: "Import from website",
        is_optional: true,
        required: &[],
        completion: CompletionRule::SourceEntered,
    },
    StepDef {
        index: STEP_COMPANY,
        name: "company",
        title: "Company basics",
        is_optional: false,
        required: &["companyName", "website"],
        completion: CompletionRule::StepValidity,
    },
    StepDef {
        index: STEP_CONTACT,
        name: "contact",
        title: "Primary contact",
        is_optional: false,
        required: &["primaryContact.name", "primaryContact.email"],
        completion: CompletionRule::StepValidity,
    },
    StepDef {
        index: STEP_PRODUCTS,
        name: "products",
        title: "Products",
        is_optional: false,
        required: &["products"],
        completion: CompletionRule::StepValidity,
    },
    StepDef {
        index: STEP_MARKETS,
        name: "markets",
        title: "Markets",
        is_optional: false,
        required: &["industries"],
        completion: CompletionRule::StepValidity,
    },
    StepDef {
        index: STEP_COMPLIANCE,
        name: "compliance",
        title: "Compliance",
        is_optional: false,
        required: &[],
        completion: CompletionRule::AnyContent,
    },
    StepDef {
        index: STEP_REVIEW,
        name: "review",
        title: "Review & submit",
        is_optional: false,
        required: &[],
        completion: CompletionRule::AllRequiredValid,
    },
];

/// Index of the read-only summary step (always the last).
pub fn summary_index() -> usize {
    STEPS.len() - 1
}

/// Look up a step by index.
pub fn step(index: usize) -> Option<&'static StepDef> {
    STEPS.get(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_positions() {
        for (i, s) in STEPS.iter().enumerate() {
            assert_eq!(s.index, i);
        }
    }

    #[test]
    fn test_only_source_step_is_optional() {
        let optional: Vec<_> = STEPS.iter().filter(|s| s.is_optional).collect();
        assert_eq!(optional.len(), 1);
        assert_eq!(optional[0].index, STEP_SOURCE);
    }

    #[test]
    fn test_source_and_review_carry_no_required_fields() {
        assert!(STEPS[STEP_SOURCE].required.is_empty());
        assert!(STEPS[STEP_REVIEW].required.is_empty());
    }

    #[test]
    fn test_summary_is_last() {
        assert_eq!(summary_index(), STEP_REVIEW);
        assert_eq!(
            STEPS[summary_index()].completion,
            CompletionRule::AllRequiredValid
        );
    }

    #[test]
    fn test_step_lookup() {
        assert_eq!(step(STEP_PRODUCTS).unwrap().name, "products");
        assert!(step(99).is_none());
    }
}
