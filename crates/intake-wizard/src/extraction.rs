// Extraction stream consumer — connects to the content-extraction service
// and feeds its frames into a wizard controller.
//
// The service answers a parse request with a long-lived response body framed
// as newline-delimited `data: <json>` events. Decoding is split from
// dispatch: `decode_events` turns bytes into typed events, `pump_events`
// applies them to a controller until the stream ends, fails, or the wizard
// closes.

use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures_core::Stream;
use secrecy::ExposeSecret;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use intake_wizard_types::{BoxStream, Document, Error, ExtractionConfig, ExtractionEvent};

use crate::controller::SharedController;
use crate::util::frames::FrameDecoder;

/// What the extraction service should read. Built from the source step's
/// fields; at least one of the two is expected to be set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_text: Option<String>,
}

impl ExtractionRequest {
    /// Snapshot the source fields from a document.
    pub fn from_document(document: &Document) -> Self {
        let non_empty = |path: &str| {
            let value = document.text(path).trim();
            (!value.is_empty()).then(|| value.to_string())
        };
        Self {
            source_url: non_empty("sourceUrl"),
            source_text: non_empty("sourceText"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source_url.is_none() && self.source_text.is_none()
    }
}

/// HTTP client for the extraction service.
pub struct ExtractionClient {
    http: reqwest::Client,
    config: ExtractionConfig,
}

impl ExtractionClient {
    pub fn new(config: ExtractionConfig) -> Result<Self, Error> {
        if config.base_url.trim().is_empty() {
            return Err(Error::configuration("extraction base URL is empty"));
        }
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs_f64(config.connect_timeout))
            .build()
            .map_err(|e| Error::network("failed to build HTTP client", e))?;
        Ok(Self { http, config })
    }

    /// Start an extraction and return the decoded event stream.
    ///
    /// The request timeout bounds only the wait for response headers; once
    /// the stream is open it stays open until the service closes it or the
    /// consumer is cancelled.
    pub async fn begin(
        &self,
        request: &ExtractionRequest,
    ) -> Result<BoxStream<'static, Result<ExtractionEvent, Error>>, Error> {
        if request.is_empty() {
            return Err(Error::configuration(
                "nothing to extract: no source URL or text supplied",
            ));
        }
        let url = format!("{}/extract", self.config.base_url.trim_end_matches('/'));
        let mut builder = self.http.post(&url).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let send = builder.send();
        let response = tokio::time::timeout(
            Duration::from_secs_f64(self.config.request_timeout),
            send,
        )
        .await
        .map_err(|_| Error::stream("extraction service did not respond in time"))?
        .map_err(|e| Error::network("failed to reach extraction service", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                format!("extraction service returned {status}")
            } else {
                body
            };
            return Err(Error::from_http_status(status.as_u16(), message));
        }

        Ok(Box::pin(decode_events(response.bytes_stream())))
    }
}

/// Decode a raw byte stream of `data: <json>` frames into extraction events.
///
/// A frame that fails to parse as JSON is logged and skipped; it never
/// aborts the stream. A transport error surfaces as a single terminal
/// `Stream` error after which the stream ends.
pub fn decode_events<S, E>(bytes: S) -> impl Stream<Item = Result<ExtractionEvent, Error>>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        tokio::pin!(bytes);
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    let text = String::from_utf8_lossy(&chunk);
                    for payload in decoder.feed(&text) {
                        match serde_json::from_str::<ExtractionEvent>(&payload) {
                            Ok(event) => yield Ok(event),
                            Err(error) => {
                                tracing::warn!(%error, "skipping malformed extraction frame");
                            }
                        }
                    }
                }
                Err(error) => {
                    yield Err(Error::stream_with_source(
                        "extraction stream failed",
                        error,
                    ));
                    return;
                }
            }
        }
        if decoder.has_partial() {
            tracing::warn!("extraction stream ended mid-frame; dropping the remainder");
        }
    }
}

/// Apply decoded events to a shared controller until the stream ends.
///
/// Stops dispatching as soon as the cancellation token fires or the
/// controller reports closed, so a torn-down wizard never receives merges.
/// Exactly one `finish_parse` is delivered: `Ok` on natural stream end
/// (whether or not a complete message arrived), `Err` on transport failure.
pub async fn pump_events<S>(controller: SharedController, events: S, cancel: CancellationToken)
where
    S: Stream<Item = Result<ExtractionEvent, Error>>,
{
    tokio::pin!(events);
    loop {
        let item = tokio::select! {
            _ = cancel.cancelled() => break,
            item = events.next() => item,
        };
        let Ok(mut ctrl) = controller.lock() else {
            break;
        };
        if !ctrl.is_open() {
            break;
        }
        match item {
            None => {
                ctrl.finish_parse(Ok(()));
                break;
            }
            Some(Ok(event)) => ctrl.apply_extraction_event(event),
            Some(Err(error)) => {
                ctrl.finish_parse(Err(error));
                break;
            }
        }
    }
}

/// Full parse flow: snapshot the request, mark parsing, open the stream,
/// and pump it. Connection failures are reported through `finish_parse`
/// like any other transport failure.
pub async fn run_extraction(client: &ExtractionClient, controller: SharedController) {
    let (request, cancel) = {
        let Ok(mut ctrl) = controller.lock() else {
            return;
        };
        if !ctrl.is_open() {
            return;
        }
        ctrl.begin_parse();
        (
            ExtractionRequest::from_document(ctrl.document()),
            ctrl.cancellation_token().child_token(),
        )
    };
    match client.begin(&request).await {
        Ok(events) => pump_events(controller, events, cancel).await,
        Err(error) => {
            if let Ok(mut ctrl) = controller.lock() {
                if ctrl.is_open() {
                    ctrl.finish_parse(Err(error));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::WizardController;
    use futures::stream;
    use serde_json::json;

    fn ok_chunks(body: &str, chunk_size: usize) -> Vec<Result<Bytes, std::io::Error>> {
        body.as_bytes()
            .chunks(chunk_size)
            .map(|c| Ok(Bytes::copy_from_slice(c)))
            .collect()
    }

    async fn collect_events(
        chunks: Vec<Result<Bytes, std::io::Error>>,
    ) -> Vec<Result<ExtractionEvent, Error>> {
        decode_events(stream::iter(chunks)).collect().await
    }

    #[tokio::test]
    async fn test_decode_events_basic() {
        let body = "data: {\"type\":\"status\",\"message\":\"working\"}\n\
                    data: {\"type\":\"complete\",\"data\":{\"companyName\":\"Acme\"}}\n";
        let events = collect_events(ok_chunks(body, usize::MAX)).await;
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0].as_ref().unwrap(),
            ExtractionEvent::Status { .. }
        ));
        assert!(matches!(
            events[1].as_ref().unwrap(),
            ExtractionEvent::Complete { .. }
        ));
    }

    #[tokio::test]
    async fn test_decode_events_across_tiny_chunks() {
        let body = "data: {\"type\":\"section\",\"section\":\"company\",\"data\":{\"companyName\":\"Acme\"}}\n";
        let events = collect_events(ok_chunks(body, 3)).await;
        assert_eq!(events.len(), 1);
        match events[0].as_ref().unwrap() {
            ExtractionEvent::Section { section, data } => {
                assert_eq!(section, "company");
                assert_eq!(data["companyName"], "Acme");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_skipped_between_valid_frames() {
        let body = "data: {\"type\":\"status\",\"message\":\"a\"}\n\
                    data: {not json\n\
                    data: {\"type\":\"status\",\"message\":\"b\"}\n";
        let events = collect_events(ok_chunks(body, usize::MAX)).await;
        assert_eq!(events.len(), 2, "malformed frame must be skipped, not fatal");
        assert!(events.iter().all(Result::is_ok));
    }

    #[tokio::test]
    async fn test_transport_error_is_terminal() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"data: {\"type\":\"status\",\"message\":\"a\"}\n")),
            Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            )),
        ];
        let events = collect_events(chunks).await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        let err = events[1].as_ref().unwrap_err();
        assert_eq!(err.kind, intake_wizard_types::ErrorKind::Stream);
    }

    #[tokio::test]
    async fn test_pump_applies_in_arrival_order() {
        let controller = WizardController::shared();
        {
            let mut ctrl = controller.lock().unwrap();
            ctrl.begin_parse();
            ctrl.update_text("website", "https://acme.test");
        }
        let events = stream::iter(vec![
            Ok(ExtractionEvent::Section {
                section: "company".into(),
                data: json!({"companyName": "Acme"}),
            }),
            Ok(ExtractionEvent::Complete {
                data: json!({"companyName": "Acme Corp"}),
            }),
        ]);
        pump_events(controller.clone(), events, CancellationToken::new()).await;

        let ctrl = controller.lock().unwrap();
        assert_eq!(ctrl.document().text("companyName"), "Acme Corp");
        // Fields the stream never mentioned keep the operator's value.
        assert_eq!(ctrl.document().text("website"), "https://acme.test");
        assert!(!ctrl.is_parsing(), "natural end finishes the parse");
        assert!(ctrl.parse_error().is_none());
    }

    #[tokio::test]
    async fn test_pump_reports_transport_failure() {
        let controller = WizardController::shared();
        controller.lock().unwrap().begin_parse();
        let events = stream::iter(vec![
            Ok(ExtractionEvent::Section {
                section: "company".into(),
                data: json!({"companyName": "Acme"}),
            }),
            Err(Error::stream("connection reset")),
        ]);
        pump_events(controller.clone(), events, CancellationToken::new()).await;

        let ctrl = controller.lock().unwrap();
        assert!(!ctrl.is_parsing());
        assert_eq!(ctrl.parse_error(), Some("connection reset"));
        // Everything merged before the failure stands.
        assert_eq!(ctrl.document().text("companyName"), "Acme");
    }

    #[tokio::test]
    async fn test_pump_stops_for_closed_controller() {
        let controller = WizardController::shared();
        controller.lock().unwrap().close();
        let events = stream::iter(vec![Ok(ExtractionEvent::Section {
            section: "company".into(),
            data: json!({"companyName": "Acme"}),
        })]);
        pump_events(controller.clone(), events, CancellationToken::new()).await;
        assert_eq!(
            controller.lock().unwrap().document().text("companyName"),
            ""
        );
    }

    #[tokio::test]
    async fn test_pump_stops_on_cancellation_of_pending_stream() {
        let controller = WizardController::shared();
        controller.lock().unwrap().begin_parse();
        let cancel = CancellationToken::new();
        cancel.cancel();
        // A stream that never yields: cancellation must win the select.
        let events = stream::pending::<Result<ExtractionEvent, Error>>();
        pump_events(controller.clone(), events, cancel).await;
        // Still parsing: cancellation is a teardown, not a stream outcome.
        assert!(controller.lock().unwrap().is_parsing());
    }

    #[test]
    fn test_request_from_document() {
        let mut doc = Document::empty();
        let req = ExtractionRequest::from_document(&doc);
        assert!(req.is_empty());

        doc = crate::merge::merge(&doc, &json!({"sourceUrl": "https://acme.test"}));
        let req = ExtractionRequest::from_document(&doc);
        assert_eq!(req.source_url.as_deref(), Some("https://acme.test"));
        assert!(req.source_text.is_none());
        let encoded = serde_json::to_value(&req).unwrap();
        assert_eq!(encoded, json!({"sourceUrl": "https://acme.test"}));
    }

    #[tokio::test]
    async fn test_begin_rejects_empty_request() {
        let client =
            ExtractionClient::new(ExtractionConfig::new("https://extract.example.com")).unwrap();
        let err = client.begin(&ExtractionRequest::default()).await.err().unwrap();
        assert_eq!(err.kind, intake_wizard_types::ErrorKind::Configuration);
    }

    #[test]
    fn test_client_rejects_empty_base_url() {
        let err = ExtractionClient::new(ExtractionConfig::new("")).err().unwrap();
        assert_eq!(err.kind, intake_wizard_types::ErrorKind::Configuration);
    }
}
