// Frame decoder — state machine for the extraction service's line framing.
//
// The service emits newline-delimited frames of the form `data: <json>`.
// Chunks arrive at arbitrary boundaries, so the decoder buffers the current
// incomplete line across `feed()` calls and yields only complete payloads.

/// Incremental decoder for `data: `-prefixed line frames.
///
/// Handles CRLF line endings, blank separator lines, comment lines
/// (`:` prefix), and payloads split across chunk boundaries. Lines that are
/// neither blank, comment, nor `data:`-prefixed are ignored.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Incomplete line spanning chunk boundaries.
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of text. Returns the payloads of any complete frames.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut payloads = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line_end = if pos > 0 && self.buffer.as_bytes()[pos - 1] == b'\r' {
                pos - 1
            } else {
                pos
            };
            let line = self.buffer[..line_end].to_string();
            self.buffer.drain(..=pos);

            if let Some(payload) = Self::decode_line(&line) {
                payloads.push(payload);
            }
        }

        payloads
    }

    fn decode_line(line: &str) -> Option<String> {
        if line.is_empty() || line.starts_with(':') {
            return None;
        }
        let rest = line.strip_prefix("data:")?;
        Some(rest.strip_prefix(' ').unwrap_or(rest).to_string())
    }

    /// Whether a partial line is still buffered. A stream that ends with data
    /// buffered was truncated mid-frame; the remainder is dropped, which
    /// matches treating the missing final newline as an incomplete frame.
    pub fn has_partial(&self) -> bool {
        !self.buffer.is_empty()
    }
}
