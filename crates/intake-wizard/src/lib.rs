// intake-wizard: Layers 2–4 — merge engine, validation, extraction, controller

pub mod completion;
pub mod controller;
pub mod extraction;
pub mod merge;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod util;
pub mod validate;

// --- Curated re-exports from intake-wizard-types (Layer 1) ---
// We avoid `pub use intake_wizard_types::*` to keep the public API surface
// intentional and prevent internal types from leaking to consumers.
pub use intake_wizard_types::{
    // Schema
    schema,
    // Steps
    steps,
    BoxFuture,
    BoxStream,
    CompletionRule,
    // Document
    Document,
    // Errors
    Error,
    ErrorKind,
    // Config
    ExtractionConfig,
    // Streaming
    ExtractionEvent,
    FieldKind,
    FieldSpec,
    StepDef,
    // Submit collaborator
    SubmitSink,
    // Validation result
    Validation,
};

// --- Core controller types at crate root ---
pub use controller::{Phase, SharedController, WizardController};

// --- Engine functions at crate root ---
pub use completion::is_step_completed;
pub use merge::{field_update, merge, scalar_update};
pub use validate::validate;

// --- Extraction consumer at crate root ---
pub use extraction::{
    decode_events, pump_events, run_extraction, ExtractionClient, ExtractionRequest,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_functions_reexported_at_crate_root() {
        // These lines compile only if the re-exports exist.
        let doc = merge(&Document::empty(), &serde_json::json!({"companyName": "Acme"}));
        assert!(validate(steps::STEP_COMPANY, &doc).errors.contains_key("website"));
        assert!(!is_step_completed(steps::summary_index(), &doc, false));
    }

    #[test]
    fn test_controller_importable_from_crate_root() {
        let ctrl = WizardController::new();
        assert_eq!(ctrl.phase(), Phase::Editing);
    }

    #[test]
    fn test_curated_reexports_available() {
        let _ = ErrorKind::Stream;
        let _ = CompletionRule::AllRequiredValid;
        let _ = FieldKind::RecordList;
        let _ = ExtractionConfig::new("https://extract.example.com");
        let _ = ExtractionRequest::default();
    }
}
