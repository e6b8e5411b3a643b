//! Conversation store error types

use thiserror::Error;

use crate::conversation::ConversationId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("No active conversation")]
    NoActiveConversation,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid value {value} for {name} (allowed {range})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        range: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
