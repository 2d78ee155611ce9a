// Completion evaluator — the per-step "shown as done" signal.
//
// Completion is deliberately not the same thing as validity: the source step
// is done once it was passed (content-independent), and an optional-content
// step counts as done only when something was actually supplied, even though
// it never blocks navigation.

use intake_wizard_types::{steps, CompletionRule, Document};

use crate::validate::validate;

/// Whether a step shows as completed in the progress indicator.
///
/// `source_entered` is owned by the controller and set permanently when the
/// source step is passed by either parse or skip.
pub fn is_step_completed(step_index: usize, document: &Document, source_entered: bool) -> bool {
    let Some(step) = steps::step(step_index) else {
        return false;
    };
    match step.completion {
        CompletionRule::SourceEntered => source_entered,
        CompletionRule::StepValidity => validate(step_index, document).is_valid,
        CompletionRule::AnyContent => document.step_has_content(step_index),
        // The one place cross-step aggregation happens. Recomputed on every
        // call so a document or flag change is reflected immediately.
        CompletionRule::AllRequiredValid => {
            source_entered && (1..step.index).all(|i| validate(i, document).is_valid)
        }
    }
}
