// Mock collaborators and stream builders for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use bytes::Bytes;
use futures_core::Stream;

use intake_wizard_types::{BoxFuture, Document, Error, ExtractionEvent, SubmitSink};

/// A mock submit collaborator. Returns pre-queued results in insertion
/// order; an exhausted queue yields a configuration error so a test never
/// silently succeeds on an unplanned call.
pub struct MockSubmitSink {
    actions: Mutex<Vec<Result<(), Error>>>,
    recorded: Mutex<Vec<Document>>,
    call_count: AtomicUsize,
}

impl MockSubmitSink {
    pub fn new() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            recorded: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Queue a resolution.
    pub fn with_ok(self) -> Self {
        self.actions.lock().unwrap().push(Ok(()));
        self
    }

    /// Queue a rejection.
    pub fn with_error(self, error: Error) -> Self {
        self.actions.lock().unwrap().push(Err(error));
        self
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Clones of every document handed to `submit()`.
    pub fn recorded_documents(&self) -> Vec<Document> {
        self.recorded.lock().unwrap().clone()
    }
}

impl Default for MockSubmitSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmitSink for MockSubmitSink {
    fn submit(&self, document: Document) -> BoxFuture<'_, Result<(), Error>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.recorded.lock().unwrap().push(document);
        Box::pin(async {
            let mut actions = self.actions.lock().unwrap();
            if actions.is_empty() {
                Err(Error::configuration("MockSubmitSink: no actions queued"))
            } else {
                actions.remove(0)
            }
        })
    }
}

/// Render events as the wire framing the extraction service emits.
pub fn frame_body(events: &[ExtractionEvent]) -> String {
    let mut body = String::new();
    for event in events {
        let json = serde_json::to_string(event).expect("events always serialize");
        body.push_str(&format!("data: {json}\n"));
    }
    body
}

/// A byte stream that yields the body in fixed-size chunks, for exercising
/// frame reassembly across chunk boundaries.
pub fn chunked_bytes(
    body: String,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
    let chunks: Vec<Result<Bytes, std::io::Error>> = body
        .as_bytes()
        .chunks(chunk_size.max(1))
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    futures::stream::iter(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_sink_returns_queued_results_in_order() {
        let sink = MockSubmitSink::new()
            .with_error(Error::submit("first"))
            .with_ok();
        assert!(sink.submit(Document::empty()).await.is_err());
        assert!(sink.submit(Document::empty()).await.is_ok());
        assert_eq!(sink.call_count(), 2);
        assert_eq!(sink.recorded_documents().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_sink_exhausted_queue_errors() {
        let sink = MockSubmitSink::new();
        let err = sink.submit(Document::empty()).await.unwrap_err();
        assert_eq!(err.kind, intake_wizard_types::ErrorKind::Configuration);
    }

    #[test]
    fn test_frame_body_shape() {
        let body = frame_body(&[ExtractionEvent::Status {
            message: "working".into(),
        }]);
        assert!(body.starts_with("data: "));
        assert!(body.ends_with('\n'));
        assert!(body.contains("\"type\":\"status\""));
    }

    #[tokio::test]
    async fn test_chunked_bytes_roundtrip_through_decoder() {
        let events = vec![ExtractionEvent::Section {
            section: "company".into(),
            data: json!({"companyName": "Acme"}),
        }];
        let stream = chunked_bytes(frame_body(&events), 5);
        let decoded: Vec<_> = crate::extraction::decode_events(stream).collect().await;
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].as_ref().unwrap(), &events[0]);
    }
}
