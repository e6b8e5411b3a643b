use thiserror::Error;
use vision_core::StoreError;
use vision_llm::LLMError;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Transport failure. `partial` is the text streamed before it, shown but never stored.
    #[error("{source}")]
    LLM {
        #[source]
        source: LLMError,
        partial: String,
    },

    #[error("Cancelled")]
    Cancelled { partial: String },

    #[error("Query is empty")]
    EmptyQuery,
}

impl ExchangeError {
    /// Text streamed before the exchange stopped, if any.
    pub fn partial(&self) -> &str {
        match self {
            ExchangeError::LLM { partial, .. } | ExchangeError::Cancelled { partial } => partial,
            _ => "",
        }
    }
}
