//! Demo support chat
//!
//! Entry point for the dev proxy (`serve`), the demo backend (`backend`) and
//! the terminal chat client (`chat`).

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::map_err_ignore)]
#![allow(clippy::manual_let_else)]

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use demo_support_chat::config::{AppConfig, Cli, Command, LogFormat};
use demo_support_chat::{backend, server};
use demo_support_chat::transport::{ChatSession, input_lines};
use demo_support_chat::ui::TerminalRenderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let cli = Cli::parse();
    let config = match AppConfig::load_from_cli(&cli) {
        Ok(c) => Arc::new(c),
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Command::Serve);
    // the chat client shares the terminal with its logs
    let default_level = match command {
        Command::Serve | Command::Backend => "info",
        Command::Chat { .. } => "warn",
    };
    init_tracing(config.log.format, default_level);

    match command {
        Command::Serve => server::start_server(config).await,
        Command::Backend => backend::start_backend(config).await,
        Command::Chat { url } => run_chat(&config, url.as_deref()).await,
    }
}

/// Initialize tracing (M-LOG-STRUCTURED). Logs go to stderr so they never
/// interleave with the chat transcript on stdout.
fn init_tracing(format: LogFormat, default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init(),
    }
}

async fn run_chat(config: &AppConfig, url: Option<&str>) -> anyhow::Result<()> {
    let url = config.chat_url(url)?;
    info!(name: "chat.client.starting", url = %url, "Starting chat client");

    let input = input_lines(BufReader::new(tokio::io::stdin()));
    let session = ChatSession::connect(url, config.greeting(), TerminalRenderer::stdout());
    session.run(input).await?;
    Ok(())
}
