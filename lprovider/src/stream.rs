//! Stream payload decoding and raw message stream contracts.
//!
//! Transports deliver one raw payload string per message. [`decode_event`]
//! turns a payload into a [`StreamEvent`]; anything that does not decode is a
//! [`StreamEvent::Malformed`] and is left for the consumer to skip.
//!
//! ```rust
//! use lprovider::{StreamEvent, decode_event};
//!
//! assert_eq!(decode_event(r#"{"content":"Hel"}"#), StreamEvent::Delta("Hel".into()));
//! assert_eq!(decode_event(r#"{"content":"","stop":true}"#), StreamEvent::Stop);
//! assert_eq!(decode_event("not json"), StreamEvent::Malformed);
//! ```

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use serde::Deserialize;

use crate::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Delta(String),
    Stop,
    Malformed,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    stop: Option<bool>,
}

/// Decodes one raw payload.
///
/// A payload flagged `stop: true` is terminal; its `content` is not part of
/// the answer.
pub fn decode_event(raw: &str) -> StreamEvent {
    let Ok(chunk) = serde_json::from_str::<CompletionChunk>(raw) else {
        return StreamEvent::Malformed;
    };

    if chunk.stop.unwrap_or(false) {
        return StreamEvent::Stop;
    }

    match chunk.content {
        Some(content) => StreamEvent::Delta(content),
        None => StreamEvent::Malformed,
    }
}

/// Extracts the payload from one line of a newline-delimited or SSE-framed
/// body. Blank lines, SSE comments, and non-`data` SSE fields carry no payload.
pub fn extract_payload(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    if let Some(data) = line.strip_prefix("data:") {
        let data = data.trim();
        return (!data.is_empty()).then_some(data);
    }

    if ["event:", "id:", "retry:"]
        .iter()
        .any(|field| line.starts_with(field))
    {
        return None;
    }

    Some(line)
}

/// Splits a chunked byte stream into payload strings.
///
/// Bytes are buffered until a newline arrives, so lines and multi-byte
/// characters split across chunks are reassembled before decoding.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    // Prefix of `buffer` already known to hold no newline.
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        let mut line_start = 0;
        let mut cursor = self.scanned;
        while let Some(offset) = self.buffer[cursor..].iter().position(|byte| *byte == b'\n') {
            let newline_index = cursor + offset;
            let text = String::from_utf8_lossy(&self.buffer[line_start..newline_index]);
            if let Some(payload) = extract_payload(&text) {
                payloads.push(payload.to_string());
            }
            line_start = newline_index + 1;
            cursor = line_start;
        }

        self.buffer.drain(..line_start);
        self.scanned = self.buffer.len();
        payloads
    }

    /// Flushes a trailing line that was not newline terminated.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        let text = String::from_utf8_lossy(&rest);
        extract_payload(&text).map(str::to_string)
    }
}

/// Raw payload stream contract.
///
/// Invariants for consumers:
/// - Payloads are yielded in arrival order.
/// - An `Err` item reports a transport failure; nothing useful follows it.
/// - Once the stream yields `None` it has ended and yields nothing further.
pub trait RawMessageStream: Stream<Item = Result<String, ProviderError>> + Send {}

impl<T> RawMessageStream for T where T: Stream<Item = Result<String, ProviderError>> + Send {}

pub type BoxedMessageStream<'a> = Pin<Box<dyn RawMessageStream + 'a>>;

#[derive(Debug)]
pub struct VecMessageStream {
    messages: VecDeque<Result<String, ProviderError>>,
}

impl VecMessageStream {
    pub fn new(messages: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            messages: messages.into(),
        }
    }

    pub fn from_payloads<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(payloads.into_iter().map(|p| Ok(p.into())).collect())
    }
}

impl Stream for VecMessageStream {
    type Item = Result<String, ProviderError>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<String, ProviderError>>> {
        Poll::Ready(self.messages.pop_front())
    }
}
