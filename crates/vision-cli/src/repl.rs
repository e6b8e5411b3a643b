use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use vision_loop::{ExchangeError, ExchangeOutcome, VisionChat};

use crate::commands::{ReplCommand, HELP};
use crate::render::{self, EventPrinter};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Read an image file, naming the upload after the file.
pub fn read_image_file(path: &Path) -> anyhow::Result<(Vec<u8>, String)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((bytes, name))
}

async fn upload(chat: &VisionChat, path: &Path) -> anyhow::Result<()> {
    let (bytes, name) = read_image_file(path)?;
    let outcome = chat.upload_image(&bytes, name.clone()).await?;
    if outcome.created {
        println!(
            "{}",
            format!("Started {} for {}", outcome.conversation_id, name).green()
        );
    } else {
        println!(
            "{}",
            format!("Back to {} for {}", outcome.conversation_id, name).green()
        );
    }
    Ok(())
}

/// Stream one answer to stdout. Ctrl-C stops generation.
pub async fn run_exchange(
    chat: &Arc<VisionChat>,
    query: &str,
) -> anyhow::Result<Result<ExchangeOutcome, ExchangeError>> {
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let exchange = {
        let chat = chat.clone();
        let query = query.to_string();
        tokio::spawn(async move { chat.submit_query(&query, &event_tx).await })
    };

    let mut printer = EventPrinter::stdout();
    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => printer.handle(&event)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                chat.cancel_in_flight().await;
            }
        }
    }

    let result = exchange.await.context("Exchange task failed")?;
    if let Err(error) = &result {
        // Transport failures and cancellation were already shown in the answer slot.
        if !matches!(
            error,
            ExchangeError::LLM { .. } | ExchangeError::Cancelled { .. }
        ) {
            println!("{}", error.to_string().red());
        }
    }
    Ok(result)
}

pub async fn run_ask(chat: Arc<VisionChat>, image: &Path, question: &str) -> anyhow::Result<bool> {
    upload(&chat, image).await?;
    let result = run_exchange(&chat, question).await?;
    Ok(result.is_ok())
}

pub async fn run_chat(chat: Arc<VisionChat>, image: Option<PathBuf>) -> anyhow::Result<()> {
    println!("{}", "Vision chat. Type /help for commands.".cyan());
    if let Some(path) = image {
        if let Err(error) = upload(&chat, &path).await {
            println!("{}", error.to_string().red());
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&chat).await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!();
            break;
        };

        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(error) => {
                println!("{}", error.to_string().red());
                continue;
            }
        };

        match dispatch(&chat, command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(error) => println!("{}", error.to_string().red()),
        }
    }

    chat.cancel_in_flight().await;
    Ok(())
}

/// Returns false once the user asked to quit.
async fn dispatch(chat: &Arc<VisionChat>, command: ReplCommand) -> anyhow::Result<bool> {
    match command {
        ReplCommand::Empty => {}
        ReplCommand::Ask(query) => {
            run_exchange(chat, &query).await?;
        }
        ReplCommand::Upload(path) => upload(chat, &path).await?,
        ReplCommand::List => render::print_conversations(&chat.list_conversations().await),
        ReplCommand::Switch(id) => {
            chat.select_conversation(id).await?;
            if let Some(view) = chat.active_view().await {
                render::print_history(&view);
            }
        }
        ReplCommand::Delete(id) => {
            chat.delete_conversation(id).await?;
            println!("{}", format!("Deleted {}", id).yellow());
        }
        ReplCommand::History => match chat.active_view().await {
            Some(view) => render::print_history(&view),
            None => println!("{}", "No active conversation.".dimmed()),
        },
        ReplCommand::Params => println!("{}", render::format_params(&chat.parameters().await)),
        ReplCommand::Set { name, value } => {
            chat.set_parameter(&name, &value).await?;
            println!("{}", render::format_params(&chat.parameters().await));
        }
        ReplCommand::Reset => {
            chat.reset_parameters().await;
            println!("{}", render::format_params(&chat.parameters().await));
        }
        ReplCommand::Help => println!("{}", HELP),
        ReplCommand::Quit => return Ok(false),
    }
    Ok(true)
}

async fn print_prompt(chat: &VisionChat) -> io::Result<()> {
    let label = match chat.active_view().await {
        Some(view) => view.title,
        None => "no image".to_string(),
    };
    print!("{} ", format!("[{}] >", label).bold());
    io::stdout().flush()
}
