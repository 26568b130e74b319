//! CLI parser and config loading.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dbot_telegram::TelegramConfig;

#[derive(Parser)]
#[command(name = "dbot")]
#[command(about = "Telegram Bot CLI: run, replay", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the demo bot against Telegram (config from env; token can override BOT_TOKEN).
    Run {
        #[arg(short, long)]
        token: Option<String>,
    },
    /// Feed updates from a JSON-lines file through the demo handlers; outbound calls are printed.
    Replay {
        #[arg(short, long)]
        file: PathBuf,
        /// Dispatch updates concurrently instead of one at a time.
        #[arg(long)]
        concurrent: bool,
    },
}

/// Load TelegramConfig from environment. If `token` is provided it overrides BOT_TOKEN.
pub fn load_config(token: Option<String>) -> Result<TelegramConfig> {
    TelegramConfig::load(token)
}
