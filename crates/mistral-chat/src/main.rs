//! mistral-chat: Main Binary
//!
//! Chat with a local Mistral model served by Ollama.
//!
//! Usage:
//!   mistral-chat                  - Start the web chat UI
//!   mistral-chat --cli            - Start interactive CLI mode
//!   mistral-chat --config <path>  - Use a specific TOML config file
//!   mistral-chat --help           - Show help

mod cli;

use mc_core::{ChatOrchestrator, Config};
use mc_web::ChatServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Web chat UI
    Server,
    /// Interactive CLI mode
    Cli,
    /// Show help
    Help,
    /// Show version
    Version,
}

/// Parsed command line
#[derive(Debug, PartialEq, Eq)]
struct Args {
    mode: RunMode,
    config_path: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    match args.mode {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("mistral-chat {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse()?)
        )
        .init();

    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load(args.config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting mistral-chat...");
    tracing::info!("Model: {} at {}", config.ollama.model, config.ollama.base_url);

    // Initialization failures leave the orchestrator not ready instead of aborting
    let orchestrator = ChatOrchestrator::initialize(&config).await;

    match args.mode {
        RunMode::Cli => {
            tracing::info!("Running in CLI mode");
            cli::run_cli(orchestrator).await
        }
        RunMode::Server => run_server(config, orchestrator).await,
        _ => Ok(()),
    }
}

/// Parse command line arguments
fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut mode = RunMode::Server;
    let mut config_path = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--cli" | "-c" => mode = RunMode::Cli,
            "--help" | "-h" => return Ok(Args { mode: RunMode::Help, config_path }),
            "--version" | "-v" => return Ok(Args { mode: RunMode::Version, config_path }),
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?;
                config_path = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("Unknown argument: {} (see --help)", other),
        }
    }

    Ok(Args { mode, config_path })
}

/// Print help message
fn print_help() {
    println!("mistral-chat - Chat with a local Mistral model via Ollama");
    println!();
    println!("Usage:");
    println!("  mistral-chat                  Start the web chat UI");
    println!("  mistral-chat --cli            Start interactive CLI mode");
    println!("  mistral-chat --config <path>  Load settings from a TOML file");
    println!("  mistral-chat --help           Show this help message");
    println!("  mistral-chat --version        Show version");
    println!();
    println!("Environment Variables:");
    println!("  OLLAMA_BASE_URL       Ollama server URL (default: http://localhost:11434)");
    println!("  OLLAMA_MODEL          Model name (default: mistral)");
    println!("  OLLAMA_TEMPERATURE    Sampling temperature (default: 0.7)");
    println!("  OLLAMA_TOP_P          Nucleus sampling mass (default: 0.9)");
    println!("  OLLAMA_TIMEOUT_SECS   Per-request timeout (default: none)");
    println!("  CHAT_HOST             Web UI bind host (default: 127.0.0.1)");
    println!("  CHAT_PORT             Web UI port (default: 8501)");
    println!("  CHAT_SESSION_IDLE_SECS  Drop idle sessions after this many seconds (default: 3600, 0 = never)");
    println!("  CHAT_PROMPT_TEMPLATE  Prompt with {{history}} and {{human_input}} slots");
}

/// Run the web chat UI until Ctrl+C
async fn run_server(config: Config, orchestrator: ChatOrchestrator) -> anyhow::Result<()> {
    if !orchestrator.is_ready() {
        tracing::warn!("Model is not initialized; every reply will be a placeholder until restart");
    }

    let server = ChatServer::new(config.server, Arc::new(orchestrator));

    tracing::info!("Press Ctrl+C to exit");

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Shutting down...");
        })
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
