mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scoped_memory::config::{ScopedMemoryConfig, Transport};
use scoped_memory::server;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scoped-memory", version, about = "Per-user long-term memory MCP server")]
struct Cli {
    /// Config file (default: ~/.scoped-memory/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server
    Serve {
        /// Override the configured transport: sse, streamable-http, or stdio
        #[arg(long)]
        transport: Option<String>,
    },
    /// Manage the local embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.scoped-memory/models/
    Download,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScopedMemoryConfig::load_from(path)?,
        None => ScopedMemoryConfig::load()?,
    };

    // Log to stderr so stdout stays clean for MCP JSON-RPC over stdio.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { transport } => {
            let transport = match transport {
                Some(name) => name.parse::<Transport>().map_err(anyhow::Error::msg)?,
                None => config.transport()?,
            };
            server::serve(config, transport).await?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
    }

    Ok(())
}
