//! Message content types
//!
//! `DialogueMessage` is the in-memory shape of the active dialogue context;
//! `WireMessage` is the multimodal shape the chat-completions endpoint accepts.

use serde::{Deserialize, Serialize};

use crate::conversation::{Role, Turn};

/// A role-tagged plain text message replayed from a conversation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DialogueMessage {
    pub role: Role,
    pub content: String,
}

impl DialogueMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl From<&Turn> for DialogueMessage {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.speaker.into(),
            content: turn.content.clone(),
        }
    }
}

/// A part of wire message content
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text content
    Text { text: String },

    /// Image reference, a data URI in practice
    ImageUrl { image_url: ImageUrl },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WireMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl WireMessage {
    /// A message carrying one text part.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            content: vec![ContentPart::text(text)],
        }
    }

    /// Concatenated text of all text parts.
    pub fn as_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|p| p.as_text())
            .collect::<Vec<_>>()
            .join("")
    }
}

impl From<&DialogueMessage> for WireMessage {
    fn from(message: &DialogueMessage) -> Self {
        Self::text(message.role, message.content.clone())
    }
}
