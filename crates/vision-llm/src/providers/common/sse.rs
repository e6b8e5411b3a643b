//! Shared SSE -> [`LLMStream`] adapter.
//!
//! The body is read one line at a time, so every `data:` line is handed to the handler
//! on its own, whether or not events are separated by blank lines. A last line cut off
//! without a newline is still delivered when the connection closes.

use std::io;

use futures_util::{StreamExt, TryStreamExt};
use reqwest::Response;
use tokio_util::codec::{FramedRead, LinesCodec};
use tokio_util::io::StreamReader;

use crate::provider::{LLMError, LLMStream, Result};
use crate::types::LLMChunk;

/// Payload of a `data:` line. Other SSE fields, comments and blank lines yield `None`.
pub fn sse_data(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("data:")?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Convert an SSE HTTP [`Response`] into an [`LLMStream`].
///
/// `handler` receives the payload of each `data:` line, and can either:
/// - return `Some(chunk)` to emit a chunk
/// - return `None` to skip the line
///
/// The stream ends right after an emitted [`LLMChunk::Done`] without reading further
/// from the connection. Transport and framing failures are emitted as
/// `LLMError::Stream` and end the stream as well.
pub fn llm_stream_from_sse<H>(response: Response, mut handler: H) -> LLMStream
where
    H: FnMut(&str) -> Option<LLMChunk> + Send + 'static,
{
    let body = response
        .bytes_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    let lines = FramedRead::new(StreamReader::new(body), LinesCodec::new());

    let chunks = lines.filter_map(move |line| {
        let item = match line {
            Ok(line) => sse_data(&line).and_then(&mut handler).map(Ok),
            Err(e) => Some(Err(LLMError::Stream(e.to_string()))),
        };
        async move { item }
    });

    let stream = futures::stream::unfold(
        (Box::pin(chunks), false),
        |(mut chunks, finished)| async move {
            if finished {
                return None;
            }
            let item: Result<LLMChunk> = chunks.next().await?;
            let finished = matches!(item, Ok(LLMChunk::Done) | Err(_));
            Some((item, (chunks, finished)))
        },
    );

    Box::pin(stream)
}
