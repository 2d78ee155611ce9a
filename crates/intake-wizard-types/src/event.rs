// Extraction wire events — one decoded `data: <json>` frame each.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One message from the extraction service, discriminated by its `type` field.
///
/// `Section` and `Complete` carry partial updates and are applied to the
/// document in arrival order; `Complete` is the authoritative final cut, so
/// its fields win over earlier `Section` fields for the same path. `Status`
/// and `Error` are log-only and never touch the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExtractionEvent {
    /// Progress note from the service. No document effect.
    Status { message: String },
    /// A partial update scoped to one logical section, applied immediately
    /// so the form fills in progressively.
    Section { section: String, data: Value },
    /// The final, possibly-overlapping partial update.
    Complete { data: Value },
    /// A section-scoped extraction failure. Logged; the stream continues and
    /// nothing already merged is rolled back.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        section: Option<String>,
        message: String,
    },
}

impl ExtractionEvent {
    /// The partial update this event carries, if any.
    pub fn partial(&self) -> Option<&Value> {
        match self {
            Self::Section { data, .. } | Self::Complete { data } => Some(data),
            Self::Status { .. } | Self::Error { .. } => None,
        }
    }
}
