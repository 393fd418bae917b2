//! Shared SSE streaming infrastructure.
//!
//! Chat-completions endpoints answer with a body of newline-delimited
//! `data:` lines. The body arrives in arbitrary chunks, so this module
//! splits it in two steps:
//! - [`SseLineDecoder`] buffers raw bytes and yields the `data:` payload
//!   of every complete line
//! - [`sse_chunk_stream`] drives a decoder over a chunk stream and feeds
//!   each payload to a provider-specific parser
//!
//! Lines are cut on the `\n` byte before any UTF-8 decoding, so a
//! multi-byte character or a JSON object split across two chunks is
//! reassembled before anyone looks at it.

use crate::util::from_reqwest;
use dp_domain::error::Result;
use dp_domain::stream::{BoxStream, StreamEvent};
use futures_core::Stream;
use futures_util::StreamExt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Line decoder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Incremental `data:` line extractor.
///
/// Any trailing partial line stays buffered until the next [`feed`] or
/// the final [`finish`].
///
/// [`feed`]: SseLineDecoder::feed
/// [`finish`]: SseLineDecoder::finish
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every complete line's `data:` payload.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(data) = data_payload(&line[..pos]) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush an unterminated last line once the body has closed.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest)
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

/// The payload of one `data:` line. Blank payloads and every other SSE
/// field (`event:`, `id:`, `retry:`, comments) yield `None`.
fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() {
        None
    } else {
        Some(data.to_string())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Event streams
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a [`BoxStream`] of events from a stream of body chunks and a
/// provider-specific parser closure.
///
/// The closure receives each `data:` payload string and returns zero or
/// more stream events. It is `FnMut` because tool-call fragments carry
/// state (the current index) from one line to the next.
///
/// The stream:
/// 1. Decodes complete lines as chunks arrive
/// 2. Flushes the trailing partial line when the chunk stream ends
/// 3. Emits a fallback `Done` event if the parser never produced one
/// 4. Stops after the first transport error
pub fn sse_chunk_stream<S, B, F>(
    chunks: S,
    mut parse_data: F,
) -> BoxStream<'static, Result<StreamEvent>>
where
    S: Stream<Item = Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    F: FnMut(&str) -> Vec<Result<StreamEvent>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut chunks = Box::pin(chunks);
        let mut decoder = SseLineDecoder::new();
        let mut done_emitted = false;
        let mut failed = false;

        while let Some(chunk) = chunks.next().await {
            let bytes = match chunk {
                Ok(bytes) => bytes,
                Err(e) => {
                    yield Err(e);
                    failed = true;
                    break;
                }
            };
            for data in decoder.feed(bytes.as_ref()) {
                for event in parse_data(&data) {
                    if matches!(&event, Ok(StreamEvent::Done { .. })) {
                        done_emitted = true;
                    }
                    yield event;
                }
            }
        }

        if !failed {
            if let Some(data) = decoder.finish() {
                for event in parse_data(&data) {
                    if matches!(&event, Ok(StreamEvent::Done { .. })) {
                        done_emitted = true;
                    }
                    yield event;
                }
            }

            if !done_emitted {
                yield Ok(StreamEvent::Done {
                    usage: None,
                    finish_reason: None,
                });
            }
        }
    };

    Box::pin(stream)
}

/// [`sse_chunk_stream`] over the body of a `reqwest::Response`.
pub fn sse_response_stream<F>(
    response: reqwest::Response,
    parse_data: F,
) -> BoxStream<'static, Result<StreamEvent>>
where
    F: FnMut(&str) -> Vec<Result<StreamEvent>> + Send + 'static,
{
    let chunks = response
        .bytes_stream()
        .map(|chunk| chunk.map_err(from_reqwest));
    sse_chunk_stream(chunks, parse_data)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
