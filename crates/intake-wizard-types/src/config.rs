// Extraction-service configuration.

use secrecy::SecretString;

use crate::error::Error;

/// Connection settings for the content-extraction service.
///
/// The controller itself has no internal timeouts (a stalled stream simply
/// stays in the parsing state), so these bounds apply only to the HTTP
/// layer that opens the stream.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Base URL of the extraction service, e.g. `https://extract.example.com`.
    pub base_url: String,
    /// Bearer credential, when the service requires one.
    pub api_key: Option<SecretString>,
    /// Connection timeout in seconds (default: 10.0).
    pub connect_timeout: f64,
    /// Overall request timeout in seconds for the initial response
    /// (default: 30.0). Does not bound how long the stream stays open.
    pub request_timeout: f64,
}

impl ExtractionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            connect_timeout: 10.0,
            request_timeout: 30.0,
        }
    }

    pub fn api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Load from the environment.
    ///
    /// - `INTAKE_EXTRACTION_URL` — required base URL
    /// - `INTAKE_EXTRACTION_API_KEY` — optional credential
    /// - `INTAKE_EXTRACTION_CONNECT_TIMEOUT` — optional seconds override
    /// - `INTAKE_EXTRACTION_REQUEST_TIMEOUT` — optional seconds override
    pub fn from_env() -> Result<Self, Error> {
        let base_url = std::env::var("INTAKE_EXTRACTION_URL")
            .map_err(|_| Error::configuration("INTAKE_EXTRACTION_URL is not set"))?;
        let mut config = Self::new(base_url);
        if let Ok(key) = std::env::var("INTAKE_EXTRACTION_API_KEY") {
            config.api_key = Some(SecretString::from(key));
        }
        if let Some(secs) = env_timeout("INTAKE_EXTRACTION_CONNECT_TIMEOUT")? {
            config.connect_timeout = secs;
        }
        if let Some(secs) = env_timeout("INTAKE_EXTRACTION_REQUEST_TIMEOUT")? {
            config.request_timeout = secs;
        }
        Ok(config)
    }
}

fn env_timeout(name: &str) -> Result<Option<f64>, Error> {
    match std::env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => parse_timeout(name, &raw).map(Some),
    }
}

fn parse_timeout(name: &str, raw: &str) -> Result<f64, Error> {
    let secs: f64 = raw
        .parse()
        .map_err(|_| Error::configuration(format!("{name} is not a number: {raw:?}")))?;
    if secs <= 0.0 || !secs.is_finite() {
        return Err(Error::configuration(format!(
            "{name} must be a positive number of seconds"
        )));
    }
    Ok(secs)
}
