use crate::types::LLMChunk;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use vision_core::{RequestParameters, WireMessage};

#[derive(Error, Debug)]
pub enum LLMError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, LLMError>;

/// Fragments of one completion, in arrival order. Finite and not restartable.
pub type LLMStream = Pin<Box<dyn Stream<Item = Result<LLMChunk>> + Send>>;

#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Stream a chat completion
    ///
    /// # Arguments
    /// * `messages` - Wire messages, system instruction first and the image query last
    /// * `params` - Generation controls sent alongside the messages
    ///
    /// Connection and HTTP status failures are returned before any fragment; a
    /// connection lost mid-stream arrives as an `Err` item after the fragments
    /// already delivered.
    async fn chat_stream(
        &self,
        messages: &[WireMessage],
        params: &RequestParameters,
    ) -> Result<LLMStream>;

    /// Model identifier sent with every request
    fn model(&self) -> &str;
}
