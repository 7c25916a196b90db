use crate::error::{FactCheckError, Result};
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::time::{timeout, Duration};
use tracing::{debug, trace};

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental SSE decoder.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// sequences and field lines split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    incomplete_line: Vec<u8>,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.incomplete_line.extend_from_slice(chunk);
        let mut events = Vec::new();

        while let Some(pos) = self.incomplete_line.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.incomplete_line.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1])
                .trim_end_matches('\r')
                .to_string();
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }

        events
    }

    /// Flush a trailing event when the stream closes without a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if !self.incomplete_line.is_empty() {
            let raw = std::mem::take(&mut self.incomplete_line);
            let line = String::from_utf8_lossy(&raw).trim_end_matches('\r').to_string();
            if let Some(event) = self.process_line(&line) {
                return Some(event);
            }
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.find(':') {
            Some(idx) => {
                let value = &line[idx + 1..];
                (&line[..idx], value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };

        match field {
            "data" => self.data_lines.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            "id" | "retry" => trace!(field, value, "ignoring SSE field"),
            other => debug!(field = other, "unknown SSE field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event = None;
            return None;
        }
        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(SseEvent {
            event: self.event.take(),
            data,
        })
    }
}

/// Turn a streaming HTTP response into its SSE `data` payloads.
///
/// The `[DONE]` sentinel ends the stream. A gap longer than `chunk_timeout_secs`
/// between network chunks fails the stream with [`FactCheckError::Timeout`].
pub fn data_stream(
    response: reqwest::Response,
    chunk_timeout_secs: u64,
) -> BoxStream<'static, Result<String>> {
    let mut bytes = Box::pin(response.bytes_stream());
    let chunk_timeout = Duration::from_secs(chunk_timeout_secs);

    let stream = async_stream::stream! {
        let mut decoder = SseDecoder::new();
        loop {
            let chunk = match timeout(chunk_timeout, bytes.next()).await {
                Ok(Some(Ok(chunk))) => chunk,
                Ok(Some(Err(e))) => {
                    yield Err(FactCheckError::NetworkError(e));
                    return;
                }
                Ok(None) => break,
                Err(_) => {
                    yield Err(FactCheckError::Timeout(chunk_timeout_secs));
                    return;
                }
            };

            for event in decoder.push(&chunk) {
                if event.data == "[DONE]" {
                    return;
                }
                yield Ok(event.data);
            }
        }

        if let Some(event) = decoder.finish() {
            if event.data != "[DONE]" {
                yield Ok(event.data);
            }
        }
    };

    stream.boxed()
}
