//! Helpers shared by OpenAI-compatible providers.

pub mod openai_compat;
pub mod sse;
