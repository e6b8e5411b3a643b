use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use vision_core::Config;
use vision_llm::{QubridProvider, VisionProvider};
use vision_loop::VisionChat;

mod commands;
mod logging;
mod render;
mod repl;

use logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "vision-cli")]
#[command(about = "Ask questions about images with a hosted vision model")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    /// Log filter such as `trace` or `warn,vision_llm=debug` (overrides debug flag)
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Chat endpoint URL (overrides QUBRID_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Model name (overrides QUBRID_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Seconds to wait for the response to start (overrides QUBRID_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat
    Chat {
        /// Image to start the first conversation with
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Ask a single question about an image
    Ask {
        /// Image file
        #[arg(long)]
        image: PathBuf,
        /// Question text
        question: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    if let Some(api_base) = &cli.api_base {
        config = config.with_api_base(api_base.as_str());
    }
    if let Some(model) = &cli.model {
        config = config.with_model(model.as_str());
    }
    if let Some(secs) = cli.timeout_secs.filter(|secs| *secs > 0) {
        config = config.with_request_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.debug, cli.log_level.as_deref());

    let config = load_config(&cli).context("Configuration error")?;
    log::info!("Model: {}", config.model);
    log::debug!("Config: {:?}", config);

    let provider = QubridProvider::new(&config)?;
    log::debug!("Endpoint: {} ({})", provider.endpoint(), provider.model());
    let chat = Arc::new(VisionChat::new(Arc::new(provider)));

    match cli.command {
        Commands::Chat { image } => {
            repl::run_chat(chat, image).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask { image, question } => {
            if repl::run_ask(chat, &image, &question).await? {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
