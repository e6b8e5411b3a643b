use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use vision_core::{Config, RequestParameters, WireMessage};

use crate::provider::{LLMError, LLMStream, Result, VisionProvider};

use super::common::openai_compat::{build_chat_body, parse_sse_data_lenient};
use super::common::sse::llm_stream_from_sse;

/// Client for the hosted multimodal chat endpoint.
pub struct QubridProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    request_timeout: Duration,
}

impl QubridProvider {
    pub fn new(config: &Config) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LLMError::Auth("API key is empty".to_string()));
        }

        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: config.api_base.clone(),
            model: config.model.clone(),
            request_timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VisionProvider for QubridProvider {
    async fn chat_stream(
        &self,
        messages: &[WireMessage],
        params: &RequestParameters,
    ) -> Result<LLMStream> {
        let body = build_chat_body(&self.model, messages, params);

        log::debug!(
            "POST {} ({} messages, model {})",
            self.endpoint,
            messages.len(),
            self.model
        );

        let request = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send();

        // Only the wait for response headers is bounded; the body may stream for as long
        // as the model keeps generating.
        let response = tokio::time::timeout(self.request_timeout, request)
            .await
            .map_err(|_| LLMError::Timeout(self.request_timeout))??;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            log::warn!("Chat request failed with HTTP {}", status);
            return Err(LLMError::Api(format!("HTTP {}: {}", status, text)));
        }

        Ok(llm_stream_from_sse(response, parse_sse_data_lenient))
    }

    fn model(&self) -> &str {
        &self.model
    }
}
