use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

mod client;
mod config;
mod error;
mod events;
mod logging;
mod ui;

use client::HttpResponseClient;
use config::{Config, ENDPOINT_ENV};
use ui::conversation::{ConversationManager, ConversationStore};

#[derive(Parser)]
#[command(name = "chatpane")]
#[command(version)]
#[command(about = "Chat with a text-generation endpoint from the terminal", long_about = None)]
struct Cli {
    /// Generation endpoint for this run
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Config file to use instead of ~/.chatpane/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);

    match cli.command {
        Some(Commands::Config { init: true }) => {
            if config_path.exists() {
                println!("Config already exists at {}", config_path.display());
            } else {
                Config::default().save_to(&config_path)?;
                println!("Wrote default config to {}", config_path.display());
            }
            Ok(())
        }
        Some(Commands::Config { init: false }) => {
            let config = load_config(&config_path, cli.endpoint)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
        None => {
            let config = load_config(&config_path, cli.endpoint)?;
            run_chat(config).await
        }
    }
}

fn load_config(path: &Path, endpoint: Option<String>) -> Result<Config> {
    Ok(Config::load_from(path)?.with_endpoint_overrides(std::env::var(ENDPOINT_ENV).ok(), endpoint))
}

async fn run_chat(config: Config) -> Result<()> {
    let _guard = logging::init_logging(&config.logging)?;

    let client = HttpResponseClient::new(config.endpoint.clone())?;
    info!(endpoint = client.endpoint(), "starting chat session");

    let store = ConversationStore::new(Arc::new(client), config.greeting.clone());
    let mut manager = ConversationManager::new(store, config.ui.placeholder.clone());

    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms.max(10));
    ui::terminal::run(&mut manager, tick_rate)
        .await
        .context("Chat session failed")?;

    info!(messages = manager.store().history().len(), "chat session ended");
    Ok(())
}
