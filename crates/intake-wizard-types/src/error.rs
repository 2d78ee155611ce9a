// Error type — the one error struct every layer of the workspace shares.

use serde::{Deserialize, Serialize};

/// Discriminator covering every failure class the intake controller can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    // Extraction-service errors
    /// Transport failure establishing or reading the extraction stream.
    Network,
    /// The stream terminated abnormally after it was established.
    Stream,
    /// A single frame could not be decoded. Skipped by the consumer, never
    /// fatal to the session.
    Decode,

    // Controller-side errors
    /// A step failed validation and blocked a forward transition or submit.
    Validation,
    /// The external submit collaborator rejected the finished document.
    Submit,
    /// Bad or missing configuration (base URL, credentials).
    Configuration,
    /// The operation was cancelled because the wizard was closed.
    Abort,
}

impl ErrorKind {
    /// Returns `true` for errors the user can recover from by re-invoking the
    /// failed action (re-parsing from scratch, correcting fields, resubmitting).
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Abort | Self::Configuration)
    }
}

/// The single error type for the entire library.
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
    /// Whether re-invoking the failed operation can succeed. The controller
    /// itself never retries; this drives what the presentation layer offers.
    pub retryable: bool,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,

    /// Extraction section the error is scoped to, when the service said so.
    pub section: Option<String>,
    /// HTTP status from the extraction service, when the failure was HTTP-level.
    pub status_code: Option<u16>,
}

impl Error {
    /// Construct from an extraction-service HTTP status code.
    pub fn from_http_status(status: u16, message: String) -> Self {
        Self {
            kind: ErrorKind::Network,
            message,
            // 4xx means the request itself is bad; repeating it verbatim won't help.
            retryable: !(400..500).contains(&status),
            source: None,
            section: None,
            status_code: Some(status),
        }
    }

    /// Convenience: network error with source.
    pub fn network(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            retryable: true,
            source: Some(Box::new(source)),
            section: None,
            status_code: None,
        }
    }

    /// Convenience: terminal stream error.
    pub fn stream(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Stream,
            message: message.into(),
            retryable: true,
            source: None,
            section: None,
            status_code: None,
        }
    }

    /// Convenience: terminal stream error with source.
    pub fn stream_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::stream(message)
        }
    }

    /// Convenience: frame decode error with source.
    pub fn decode(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind: ErrorKind::Decode,
            message: message.into(),
            retryable: false,
            source: Some(Box::new(source)),
            section: None,
            status_code: None,
        }
    }

    /// Convenience: validation blocked a transition.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            retryable: true,
            source: None,
            section: None,
            status_code: None,
        }
    }

    /// Convenience: submit collaborator rejection.
    pub fn submit(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Submit,
            message: message.into(),
            retryable: true,
            source: None,
            section: None,
            status_code: None,
        }
    }

    /// Convenience: configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Configuration,
            message: message.into(),
            retryable: false,
            source: None,
            section: None,
            status_code: None,
        }
    }

    /// Convenience: abort error (wizard closed while the operation ran).
    pub fn abort() -> Self {
        Self {
            kind: ErrorKind::Abort,
            message: "operation aborted".into(),
            retryable: false,
            source: None,
            section: None,
            status_code: None,
        }
    }

    /// Attach the extraction section this error is scoped to.
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.section {
            Some(section) => write!(f, "{:?} [{section}]: {}", self.kind, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}
