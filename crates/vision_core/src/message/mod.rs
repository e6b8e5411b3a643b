pub mod content;
pub mod formatter;

pub use content::{ContentPart, DialogueMessage, ImageUrl, WireMessage};
pub use formatter::build_request;
