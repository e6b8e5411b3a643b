//! OpenAI-compatible request serialization and stream chunk parsing.

use serde::Deserialize;
use serde_json::{json, Value};
use vision_core::{RequestParameters, WireMessage};

use crate::types::LLMChunk;

pub const DONE_SENTINEL: &str = "[DONE]";

/// Build a streaming chat request body.
pub fn build_chat_body(
    model: &str,
    messages: &[WireMessage],
    params: &RequestParameters,
) -> Value {
    json!({
        "model": model,
        "messages": messages,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
        "top_p": params.top_p,
        "top_k": params.top_k,
        "presence_penalty": params.presence_penalty,
        "stream": true,
    })
}

// --- OpenAI-compatible streaming chunk parsing ---

#[derive(Debug, Deserialize)]
pub struct OpenAICompatStreamChunk {
    choices: Vec<OpenAICompatChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAICompatChoice {
    delta: OpenAICompatDelta,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAICompatDelta {
    content: Option<String>,
}

/// Content of the first choice's delta, if it carries any text.
pub fn parse_openai_compat_chunk(chunk: OpenAICompatStreamChunk) -> Option<LLMChunk> {
    let choice = chunk.choices.into_iter().next()?;
    choice
        .delta
        .content
        .filter(|content| !content.is_empty())
        .map(LLMChunk::Token)
}

/// Parse an SSE `data:` payload, skipping anything malformed.
///
/// - `"[DONE]"` -> `Some(LLMChunk::Done)`
/// - Invalid JSON, no choices, no delta content -> `None`
pub fn parse_sse_data_lenient(data: &str) -> Option<LLMChunk> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }
    if data == DONE_SENTINEL {
        return Some(LLMChunk::Done);
    }

    match serde_json::from_str::<OpenAICompatStreamChunk>(data) {
        Ok(chunk) => parse_openai_compat_chunk(chunk),
        Err(err) => {
            log::debug!("Skipping malformed stream record ({err}): {data}");
            None
        }
    }
}
