//! dbot CLI: run the demo bot on Telegram, or replay recorded updates offline.

use anyhow::Result;
use clap::Parser;
use dbot_cli::{demo_handlers, load_config, read_updates, replay, Cli, Commands, ConsoleBot};
use dbot_core::init_tracing;
use dbot_telegram::run_polling;
use handler_chain::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            run_polling(config, vec![demo_handlers()]).await
        }
        Commands::Replay { file, concurrent } => {
            init_tracing(std::env::var("LOG_FILE").ok().as_deref())?;
            let updates = read_updates(&file)?;
            info!(file = %file.display(), count = updates.len(), "Replaying updates");

            let bot = ConsoleBot::new();
            let config = AppConfig {
                concurrent,
                ..AppConfig::default()
            };
            replay(bot.clone(), updates, demo_handlers(), config).await;

            info!(calls = bot.transcript().len(), "Replay finished");
            Ok(())
        }
    }
}
