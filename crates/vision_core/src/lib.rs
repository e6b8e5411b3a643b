//! vision_core - Core types for the image chat client
//!
//! This crate provides the state and formatting layer shared by the other crates:
//! - `conversation` - Conversation, Turn and the role tags
//! - `store` - ConversationStore with the active dialogue context
//! - `message` - wire message content types and the request formatter
//! - `params` - generation controls sent with every request
//! - `image` - uploaded image normalisation and data URI encoding
//! - `config` - endpoint credentials loaded from the environment

pub mod config;
pub mod conversation;
pub mod error;
pub mod image;
pub mod message;
pub mod params;
pub mod prompt;
pub mod store;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use conversation::{Conversation, ConversationId, ConversationSummary, Role, Speaker, Turn};
pub use error::{Result, StoreError};
pub use image::ImageAttachment;
pub use message::{build_request, ContentPart, DialogueMessage, ImageUrl, WireMessage};
pub use params::RequestParameters;
pub use prompt::VISION_SYSTEM_PROMPT;
pub use store::{AppendOutcome, AppendPolicy, ConversationStore};
