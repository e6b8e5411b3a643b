//! REPL input parsing.

use std::path::PathBuf;

use thiserror::Error;
use vision_core::ConversationId;

pub const HELP: &str = "\
Type a question to ask about the active image, or one of:
  /upload PATH        start a conversation for an image file
  /list               list conversations, newest first
  /switch ID          make a conversation active
  /delete ID          delete a conversation
  /history            show the active conversation
  /params             show request parameters
  /set NAME VALUE     change a request parameter
  /reset              restore default parameters
  /help               show this help
  /quit               exit
Press Ctrl-C while an answer streams to stop it.";

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Ask(String),
    Upload(PathBuf),
    List,
    Switch(ConversationId),
    Delete(ConversationId),
    History,
    Params,
    Set { name: String, value: String },
    Reset,
    Help,
    Quit,
    Empty,
}

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Unknown command {0}, try /help")]
    UnknownCommand(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid conversation id {0:?}")]
    InvalidId(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(ReplCommand::Empty);
        }
        if !line.starts_with('/') {
            return Ok(ReplCommand::Ask(line.to_string()));
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/upload" if rest.is_empty() => Err(ParseError::Usage("/upload PATH")),
            "/upload" => Ok(ReplCommand::Upload(PathBuf::from(rest))),
            "/list" | "/ls" => Ok(ReplCommand::List),
            "/switch" => parse_id(rest, "/switch ID").map(ReplCommand::Switch),
            "/delete" => parse_id(rest, "/delete ID").map(ReplCommand::Delete),
            "/history" => Ok(ReplCommand::History),
            "/params" => Ok(ReplCommand::Params),
            "/set" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(name), Some(value), None) => Ok(ReplCommand::Set {
                        name: name.to_string(),
                        value: value.to_string(),
                    }),
                    _ => Err(ParseError::Usage("/set NAME VALUE")),
                }
            }
            "/reset" => Ok(ReplCommand::Reset),
            "/help" | "/?" => Ok(ReplCommand::Help),
            "/quit" | "/exit" => Ok(ReplCommand::Quit),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_id(raw: &str, usage: &'static str) -> Result<ConversationId, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    raw.parse().map_err(|_| ParseError::InvalidId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            ReplCommand::parse("  what is this?  ").unwrap(),
            ReplCommand::Ask("what is this?".to_string())
        );
        assert_eq!(ReplCommand::parse("   ").unwrap(), ReplCommand::Empty);
    }

    #[test]
    fn upload_keeps_spaces_in_path() {
        assert_eq!(
            ReplCommand::parse("/upload my photos/cat 1.png").unwrap(),
            ReplCommand::Upload(PathBuf::from("my photos/cat 1.png"))
        );
        assert_eq!(
            ReplCommand::parse("/upload").unwrap_err(),
            ParseError::Usage("/upload PATH")
        );
    }

    #[test]
    fn ids_accept_both_forms() {
        assert_eq!(
            ReplCommand::parse("/switch conv_3").unwrap(),
            ReplCommand::Switch(ConversationId::new(3))
        );
        assert_eq!(
            ReplCommand::parse("/delete 3").unwrap(),
            ReplCommand::Delete(ConversationId::new(3))
        );
        assert!(matches!(
            ReplCommand::parse("/switch cat"),
            Err(ParseError::InvalidId(_))
        ));
        assert_eq!(
            ReplCommand::parse("/delete").unwrap_err(),
            ParseError::Usage("/delete ID")
        );
    }

    #[test]
    fn set_needs_exactly_two_arguments() {
        assert_eq!(
            ReplCommand::parse("/set temperature 0.2").unwrap(),
            ReplCommand::Set {
                name: "temperature".to_string(),
                value: "0.2".to_string()
            }
        );
        assert!(ReplCommand::parse("/set temperature").is_err());
        assert!(ReplCommand::parse("/set temperature 0.2 extra").is_err());
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(
            ReplCommand::parse("/frobnicate").unwrap_err(),
            ParseError::UnknownCommand("/frobnicate".to_string())
        );
        assert_eq!(ReplCommand::parse("/exit").unwrap(), ReplCommand::Quit);
    }
}
