use std::io::{self, Write};

use colored::Colorize;
use vision_core::{ConversationSummary, RequestParameters, Speaker, Turn};
use vision_loop::{ActiveConversationView, ExchangeEvent};

pub fn format_summary(summary: &ConversationSummary) -> String {
    let marker = if summary.is_active { "*" } else { " " };
    format!(
        "{} {:<8} {}  ({}, {})",
        marker,
        summary.id.to_string(),
        summary.title,
        summary.image_name,
        summary
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
    )
}

pub fn print_conversations(summaries: &[ConversationSummary]) {
    if summaries.is_empty() {
        println!("{}", "No conversations yet. Use /upload PATH to start one.".dimmed());
        return;
    }
    for summary in summaries {
        let line = format_summary(summary);
        if summary.is_active {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }
}

pub fn format_turn(turn: &Turn) -> String {
    match turn.speaker {
        Speaker::User => format!("You: {}", turn.content),
        Speaker::Assistant => format!("Assistant: {}", turn.content),
    }
}

pub fn print_history(view: &ActiveConversationView) {
    let (width, height) = view.image.dimensions();
    println!(
        "{}",
        format!(
            "{} {} ({}, {}x{})",
            view.id,
            view.title,
            view.image.name(),
            width,
            height
        )
        .cyan()
    );
    if view.turns.is_empty() {
        println!("{}", "No questions yet.".dimmed());
    }
    for turn in &view.turns {
        match turn.speaker {
            Speaker::User => println!("{}", format_turn(turn).bold()),
            Speaker::Assistant => println!("{}", format_turn(turn)),
        }
    }
}

pub fn format_params(params: &RequestParameters) -> String {
    format!(
        "temperature={} max_tokens={} top_p={} top_k={} presence_penalty={}",
        params.temperature, params.max_tokens, params.top_p, params.top_k, params.presence_penalty
    )
}

/// Writes exchange events into the answer slot as they arrive.
pub struct EventPrinter<W: Write> {
    out: W,
}

impl EventPrinter<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> EventPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn handle(&mut self, event: &ExchangeEvent) -> io::Result<()> {
        match event {
            ExchangeEvent::Increment { content } => write!(self.out, "{}", content)?,
            ExchangeEvent::Complete { .. } => writeln!(self.out)?,
            ExchangeEvent::Failed { message, .. } => {
                writeln!(self.out, " {}", format!("[Error: {}]", message).red())?
            }
            ExchangeEvent::Cancelled => writeln!(self.out, " {}", "[Stopped]".dimmed())?,
        }
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use vision_core::ConversationId;

    use super::*;

    fn printed(events: &[ExchangeEvent]) -> String {
        let mut printer = EventPrinter::new(Vec::new());
        for event in events {
            printer.handle(event).unwrap();
        }
        String::from_utf8(printer.into_inner()).unwrap()
    }

    #[test]
    fn increments_are_written_in_order() {
        let out = printed(&[
            ExchangeEvent::Increment {
                content: "A".to_string(),
            },
            ExchangeEvent::Increment {
                content: " cat.".to_string(),
            },
            ExchangeEvent::Complete {
                content: "A cat.".to_string(),
            },
        ]);
        assert_eq!(out, "A cat.\n");
    }

    #[test]
    fn failure_keeps_partial_text_and_annotates_it() {
        let out = printed(&[
            ExchangeEvent::Increment {
                content: "Par".to_string(),
            },
            ExchangeEvent::Failed {
                partial: "Par".to_string(),
                message: "connection reset".to_string(),
            },
        ]);
        assert!(out.starts_with("Par "));
        assert!(out.contains("[Error: connection reset]"));
    }

    #[test]
    fn summary_marks_active_conversation() {
        let summary = ConversationSummary {
            id: ConversationId::new(2),
            title: "what is this".to_string(),
            image_name: "cat.png".to_string(),
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
        };
        let line = format_summary(&summary);
        assert!(line.starts_with("* conv_2"));
        assert!(line.contains("what is this"));
        assert!(line.contains("(cat.png, "));

        let inactive = ConversationSummary {
            is_active: false,
            ..summary
        };
        assert!(format_summary(&inactive).starts_with("  conv_2"));
    }

    #[test]
    fn turns_and_params_render_plainly() {
        assert_eq!(format_turn(&Turn::user("hi")), "You: hi");
        assert_eq!(format_turn(&Turn::assistant("hello")), "Assistant: hello");
        assert_eq!(
            format_params(&RequestParameters::default()),
            "temperature=0.7 max_tokens=1024 top_p=0.9 top_k=40 presence_penalty=0"
        );
    }
}
