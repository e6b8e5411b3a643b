use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::image::ImageAttachment;

/// Titles longer than this many characters are cut and suffixed with [`TITLE_ELLIPSIS`].
pub const TITLE_MAX_CHARS: usize = 27;
pub const TITLE_ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// The author of a stored turn. System instructions are never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl From<Speaker> for Role {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::User => Role::User,
            Speaker::Assistant => Role::Assistant,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub speaker: Speaker,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Opaque conversation identity. Allocated from a counter, so ids order by creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(u64);

impl ConversationId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conv_{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let digits = raw.strip_prefix("conv_").unwrap_or(raw);
        digits.parse::<u64>().map(Self)
    }
}

/// One uploaded image plus its ordered question/answer log.
///
/// The image is fixed at construction and turns can only be appended, so the
/// fields stay private to this module.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    title: String,
    image: ImageAttachment,
    turns: Vec<Turn>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(id: ConversationId, image: ImageAttachment, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: image.name().to_string(),
            image,
            turns: Vec::new(),
            created_at,
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn image(&self) -> &ImageAttachment {
        &self.image
    }

    pub fn image_name(&self) -> &str {
        self.image.name()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Append a turn. The first user turn of the conversation renames it.
    pub(crate) fn push_turn(&mut self, turn: Turn) {
        let first_user_turn =
            turn.speaker == Speaker::User && !self.turns.iter().any(|t| t.speaker == Speaker::User);
        if first_user_turn {
            self.title = derive_title(&turn.content);
        }
        self.turns.push(turn);
    }

    pub fn summary(&self, is_active: bool) -> ConversationSummary {
        ConversationSummary {
            id: self.id,
            title: self.title.clone(),
            image_name: self.image.name().to_string(),
            is_active,
            created_at: self.created_at,
        }
    }
}

/// Listing entry handed to the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub title: String,
    pub image_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Title for a conversation named after its first question.
pub fn derive_title(text: &str) -> String {
    if text.chars().count() <= TITLE_MAX_CHARS {
        return text.to_string();
    }
    let mut title: String = text.chars().take(TITLE_MAX_CHARS).collect();
    title.push_str(TITLE_ELLIPSIS);
    title
}
