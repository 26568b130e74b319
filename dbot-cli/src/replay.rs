//! Offline replay: reads updates as JSON lines and runs them through an [`App`] wired to a
//! [`ConsoleBot`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use dbot_core::Update;
use handler_chain::{App, AppConfig, CompositeHandler};
use middleware::LoggingMiddleware;
use tokio::sync::mpsc;
use tracing::{info, instrument};

use crate::console_bot::ConsoleBot;

/// Parses one update per line. Blank lines and lines starting with `#` are skipped.
pub fn parse_updates<R: BufRead>(reader: R) -> Result<Vec<Update>> {
    let mut updates = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read update line")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let update = Update::from_json(line)
            .with_context(|| format!("line {}: not a valid update", index + 1))?;
        updates.push(update);
    }
    Ok(updates)
}

pub fn read_updates(path: &Path) -> Result<Vec<Update>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    parse_updates(BufReader::new(file))
}

/// Dispatches `updates` in order through `handlers` and returns once all of them are done.
#[instrument(skip(bot, updates, handlers))]
pub async fn replay(
    bot: Arc<ConsoleBot>,
    updates: Vec<Update>,
    handlers: CompositeHandler,
    config: AppConfig,
) {
    let app = App::new(bot)
        .with_config(config)
        .add_middleware(Arc::new(LoggingMiddleware))
        .add_handler(handlers);

    let (tx, rx) = mpsc::channel(updates.len().max(1));
    info!(count = updates.len(), "step: replay started");
    for update in updates {
        if tx.send(update).await.is_err() {
            break;
        }
    }
    drop(tx);

    app.run(rx).await;
    info!("step: replay finished");
}
