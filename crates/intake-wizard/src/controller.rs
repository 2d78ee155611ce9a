// Wizard controller — the state machine driving the intake flow.
//
// One controller instance owns all mutable session state: step position,
// document, error map, touched-field set, the source-entered flag, and the
// parsing/submit status. Every document change, operator edit or stream
// merge alike, goes through the merge engine; validation and completion are
// pure derivations queried on demand.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use intake_wizard_types::{
    empty_entry, schema, steps, Document, Error, ExtractionEvent, SubmitSink, STEP_SOURCE,
};

use crate::completion;
use crate::merge::{field_update, merge};
use crate::validate::validate;

/// Lifecycle phase. The wizard starts editing the source step and ends
/// closed, whether by cancel or by a resolved submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    Closed,
}

/// Shared handle used when an extraction pump feeds a controller that the
/// presentation layer is editing concurrently. All mutation is serialized
/// through the one lock.
pub type SharedController = Arc<Mutex<WizardController>>;

pub struct WizardController {
    phase: Phase,
    step: usize,
    document: Document,
    /// Surfaced validation errors by field path. Populated wholesale when a
    /// forward transition or submit fails; entries are removed as the
    /// offending field is edited; cleared on every successful transition.
    errors: BTreeMap<String, String>,
    /// Field paths eligible to display an error.
    touched: BTreeSet<String>,
    /// Set permanently once the source step is passed by parse or skip.
    source_entered: bool,
    parsing: bool,
    parse_error: Option<String>,
    submit_error: Option<String>,
    cancel: CancellationToken,
}

impl WizardController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Editing,
            step: STEP_SOURCE,
            document: Document::empty(),
            errors: BTreeMap::new(),
            touched: BTreeSet::new(),
            source_entered: false,
            parsing: false,
            parse_error: None,
            submit_error: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Wrap a fresh controller for use with an extraction pump.
    pub fn shared() -> SharedController {
        Arc::new(Mutex::new(Self::new()))
    }

    // --- Navigation ---

    /// Advance to the next step.
    ///
    /// From the source step this always succeeds and permanently marks the
    /// source step as entered. From every later step the current step must
    /// validate; on failure the failing paths join the touched set, the
    /// error map is rebuilt, and the step does not change.
    ///
    /// Returns whether the step advanced.
    pub fn next(&mut self) -> bool {
        if self.phase != Phase::Editing {
            return false;
        }
        if self.step == STEP_SOURCE {
            self.source_entered = true;
            self.enter_step(STEP_SOURCE + 1);
            return true;
        }
        let outcome = validate(self.step, &self.document);
        if outcome.is_valid {
            let target = (self.step + 1).min(steps::summary_index());
            self.enter_step(target);
            true
        } else {
            self.touched.extend(outcome.errors.keys().cloned());
            self.errors = outcome.errors;
            false
        }
    }

    /// Go back one step. Never gated on validation.
    pub fn previous(&mut self) {
        if self.phase != Phase::Editing || self.step == 0 {
            return;
        }
        let target = self.step - 1;
        self.enter_step(target);
    }

    /// Skip the source step without parsing. Counts as entering it.
    pub fn skip_source(&mut self) {
        if self.phase != Phase::Editing || self.step != STEP_SOURCE {
            return;
        }
        self.source_entered = true;
        self.enter_step(STEP_SOURCE + 1);
    }

    /// Successful transition in either direction: errors from the departed
    /// step never bleed into the entered step's first render.
    fn enter_step(&mut self, target: usize) {
        self.step = target;
        self.touched.clear();
        self.errors.clear();
        self.submit_error = None;
    }

    // --- Field updates ---

    /// Apply an operator edit as a one-field partial update through the
    /// merge engine. Clears any surfaced error for the path and marks it
    /// touched.
    pub fn update_field(&mut self, path: &str, value: Value) {
        if self.phase != Phase::Editing {
            return;
        }
        let partial = field_update(path, value);
        self.apply_partial(&partial);
        self.errors.remove(path);
        self.touched.insert(path.to_string());
    }

    /// Plain-text convenience for [`update_field`].
    pub fn update_text(&mut self, path: &str, value: impl Into<String>) {
        self.update_field(path, Value::String(value.into()));
    }

    /// Edit one key of one entry in a list-of-records container. Expressed
    /// as a wholesale replacement of the container, which is how the merge
    /// engine treats lists.
    pub fn update_item_field(&mut self, container: &str, index: usize, key: &str, value: Value) {
        if self.phase != Phase::Editing {
            return;
        }
        let Some(mut entries) = self
            .document
            .get(container)
            .and_then(Value::as_array)
            .cloned()
        else {
            return;
        };
        let Some(entry) = entries.get_mut(index).and_then(Value::as_object_mut) else {
            return;
        };
        entry.insert(key.to_string(), value);
        self.apply_partial(&field_update(container, Value::Array(entries)));
        let path = format!("{container}[{index}].{key}");
        self.errors.remove(&path);
        self.touched.insert(path);
    }

    /// Append an empty entry to a list-of-records container.
    pub fn append_item(&mut self, container: &str) {
        if self.phase != Phase::Editing {
            return;
        }
        let Some(spec) = schema::field(container) else {
            return;
        };
        let Some(mut entries) = self
            .document
            .get(container)
            .and_then(Value::as_array)
            .cloned()
        else {
            return;
        };
        entries.push(empty_entry(spec));
        self.apply_partial(&field_update(container, Value::Array(entries)));
    }

    /// Remove one entry from a list-of-records container.
    pub fn remove_item(&mut self, container: &str, index: usize) {
        if self.phase != Phase::Editing {
            return;
        }
        let Some(mut entries) = self
            .document
            .get(container)
            .and_then(Value::as_array)
            .cloned()
        else {
            return;
        };
        if index >= entries.len() {
            return;
        }
        entries.remove(index);
        self.apply_partial(&field_update(container, Value::Array(entries)));
    }

    fn apply_partial(&mut self, partial: &Value) {
        let next = merge(&self.document, partial);
        if next != self.document {
            self.document = next;
        }
    }

    // --- Extraction ---

    /// Mark a parse as started. Clears any previous parse failure.
    pub fn begin_parse(&mut self) {
        if self.phase != Phase::Editing {
            return;
        }
        self.parsing = true;
        self.parse_error = None;
    }

    /// Apply one decoded extraction message. Section and complete payloads
    /// merge in arrival order (the merge engine is last-write-wins per
    /// path, so a later complete wins over an earlier section); status and
    /// error messages are log-only. A closed controller ignores everything.
    pub fn apply_extraction_event(&mut self, event: ExtractionEvent) {
        if self.phase == Phase::Closed {
            return;
        }
        match event {
            ExtractionEvent::Status { message } => {
                tracing::info!(%message, "extraction status");
            }
            ExtractionEvent::Section { section, data } => {
                tracing::debug!(%section, "merging extracted section");
                self.apply_partial(&data);
            }
            ExtractionEvent::Complete { data } => {
                tracing::debug!("merging final extraction payload");
                self.apply_partial(&data);
            }
            ExtractionEvent::Error { section, message } => {
                // Section-scoped failure: logged, stream continues, nothing
                // already merged is rolled back.
                tracing::warn!(?section, %message, "extraction section failed");
            }
        }
    }

    /// Mark the in-flight parse as finished. A transport failure leaves the
    /// document exactly as last merged and records one human-readable
    /// message; retrying means re-invoking the parse from scratch.
    pub fn finish_parse(&mut self, result: Result<(), Error>) {
        if self.phase == Phase::Closed {
            return;
        }
        self.parsing = false;
        if let Err(error) = result {
            self.parse_error = Some(error.message);
        }
    }

    // --- Submit ---

    /// Validate the current step and hand the document to the submit
    /// collaborator. On validation failure this behaves like a failed
    /// `next()`. On rejection the document and step position are preserved
    /// and a single submit error is recorded so the operator can retry.
    /// On resolution the wizard closes.
    pub async fn submit(&mut self, sink: &dyn SubmitSink) -> Result<(), Error> {
        match self.phase {
            Phase::Closed => return Err(Error::abort()),
            Phase::Submitting => return Err(Error::submit("a submit is already in progress")),
            Phase::Editing => {}
        }
        self.submit_error = None;
        let outcome = validate(self.step, &self.document);
        if !outcome.is_valid {
            self.touched.extend(outcome.errors.keys().cloned());
            self.errors = outcome.errors;
            return Err(Error::validation(
                "fix the highlighted fields before submitting",
            ));
        }
        self.phase = Phase::Submitting;
        match sink.submit(self.document.clone()).await {
            Ok(()) => {
                self.close();
                Ok(())
            }
            Err(error) => {
                self.phase = Phase::Editing;
                self.submit_error = Some(error.message.clone());
                Err(error)
            }
        }
    }

    /// Close the wizard and cancel anything still feeding it.
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.parsing = false;
        self.cancel.cancel();
    }

    // --- Queries ---

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn touched(&self) -> &BTreeSet<String> {
        &self.touched
    }

    /// The error to display for a path, if the path is eligible to show one.
    pub fn visible_error(&self, path: &str) -> Option<&str> {
        if !self.touched.contains(path) {
            return None;
        }
        self.errors.get(path).map(String::as_str)
    }

    /// Whether the current step validates right now.
    pub fn is_step_valid(&self) -> bool {
        validate(self.step, &self.document).is_valid
    }

    /// Progress-indicator state for any step. Pure derivation, recomputed
    /// on every call.
    pub fn is_step_completed(&self, step_index: usize) -> bool {
        completion::is_step_completed(step_index, &self.document, self.source_entered)
    }

    pub fn source_entered(&self) -> bool {
        self.source_entered
    }

    pub fn is_parsing(&self) -> bool {
        self.parsing
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Token cancelled when the wizard closes. Extraction pumps tie their
    /// lifetime to a child of this token.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}
