//! Long-polling runner: pulls updates from Telegram, converts them to core [`Update`]s and
//! feeds them to a [`handler_chain::App`] through the [`UpdateSource`] seam.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use dbot_core::{init_tracing, ToCoreUpdate, Update};
use futures::StreamExt;
use handler_chain::{App, CompositeHandler, UpdateSource};
use middleware::{AuthMiddleware, LoggingMiddleware};
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use teloxide::update_listeners::{AsUpdateStream, Polling};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::adapters::TelegramUpdateWrapper;
use crate::bot_adapter::TelegramBotAdapter;
use crate::config::TelegramConfig;

const POLL_TIMEOUT: Duration = Duration::from_secs(30);
const ERROR_BACKOFF: Duration = Duration::from_secs(1);
const CHANNEL_CAPACITY: usize = 64;

/// [`UpdateSource`] backed by Telegram long polling in a background task.
pub struct TelegramPolling {
    updates: mpsc::Receiver<Update>,
    stop: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TelegramPolling {
    /// Starts polling. `allowed_updates` narrows what Telegram delivers; `None` keeps its default.
    pub fn spawn(bot: teloxide::Bot, allowed_updates: Option<Vec<AllowedUpdate>>) -> Self {
        let (tx, updates) = mpsc::channel(CHANNEL_CAPACITY);
        let stop = CancellationToken::new();
        let task = tokio::spawn(poll(bot, allowed_updates, tx, stop.clone()));
        Self {
            updates,
            stop,
            task: Some(task),
        }
    }
}

#[async_trait]
impl UpdateSource for TelegramPolling {
    async fn next_update(&mut self) -> Option<Update> {
        self.updates.recv().await
    }

    async fn shutdown(&mut self) {
        self.stop.cancel();
        self.updates.close();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Polling task ended abnormally");
            }
        }
        info!("step: polling stopped");
    }
}

async fn poll(
    bot: teloxide::Bot,
    allowed_updates: Option<Vec<AllowedUpdate>>,
    tx: mpsc::Sender<Update>,
    stop: CancellationToken,
) {
    let mut builder = Polling::builder(bot).timeout(POLL_TIMEOUT);
    if let Some(allowed) = allowed_updates {
        builder = builder.allowed_updates(allowed);
    }
    let mut polling = builder.build();
    let stream = polling.as_stream();
    tokio::pin!(stream);

    info!("step: polling started");
    loop {
        let next = tokio::select! {
            _ = stop.cancelled() => break,
            next = stream.next() => next,
        };
        match next {
            Some(Ok(update)) => {
                let update = TelegramUpdateWrapper(&update).to_core();
                if tx.send(update).await.is_err() {
                    break;
                }
            }
            Some(Err(e)) => {
                error!(error = %e, "Polling request failed");
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
            None => break,
        }
    }
}

/// Platform-native `allowed_updates` for the given handlers: the union of the update kinds
/// they accept, or `None` when any handler may accept anything.
pub fn allowed_updates(handlers: &[CompositeHandler]) -> Option<Vec<AllowedUpdate>> {
    let mut kinds = BTreeSet::new();
    for composite in handlers {
        kinds.extend(composite.update_kinds()?);
    }
    let allowed: Vec<AllowedUpdate> = kinds.into_iter().filter_map(allowed_update).collect();
    (!allowed.is_empty()).then_some(allowed)
}

fn allowed_update(kind: &str) -> Option<AllowedUpdate> {
    match kind {
        "message" => Some(AllowedUpdate::Message),
        "edited_message" => Some(AllowedUpdate::EditedMessage),
        "callback_query" => Some(AllowedUpdate::CallbackQuery),
        _ => None,
    }
}

/// Builds the teloxide bot, pointing it at a custom API server when configured.
pub fn build_bot(config: &TelegramConfig) -> Result<teloxide::Bot> {
    let bot = teloxide::Bot::new(config.bot_token.clone());
    match config.telegram_api_url {
        Some(ref url_str) => {
            let url = reqwest::Url::parse(url_str)
                .with_context(|| format!("Invalid TELEGRAM_API_URL: {}", url_str))?;
            Ok(bot.set_api_url(url))
        }
        None => Ok(bot),
    }
}

/// Main entry: init logging, validate config, build the bot and App, then poll until Ctrl-C.
#[instrument(skip(config, handlers))]
pub async fn run_polling(config: TelegramConfig, handlers: Vec<CompositeHandler>) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file.as_deref())?;

    let bot = build_bot(&config)?;
    match bot.get_me().await {
        Ok(me) => info!(
            username = %me.user.username.as_deref().unwrap_or("unknown"),
            "Connected to Telegram"
        ),
        Err(e) => warn!(error = %e, "get_me failed; continuing"),
    }

    let allowed = allowed_updates(&handlers);
    info!(allowed_updates = ?allowed, handlers = handlers.len(), "Initializing bot");

    let mut app = App::new(Arc::new(TelegramBotAdapter::new(bot.clone())))
        .with_config(config.app_config())
        .add_middleware(Arc::new(LoggingMiddleware));
    if !config.allowed_user_ids.is_empty() {
        app = app.add_middleware(Arc::new(AuthMiddleware::new(
            config.allowed_user_ids.iter().copied(),
        )));
    }
    for composite in handlers {
        app = app.add_handler(composite);
    }

    let token = app.shutdown_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("step: Ctrl-C received, shutting down"),
            Err(e) => error!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
        }
        token.cancel();
    });

    info!("Bot started successfully");
    app.run(TelegramPolling::spawn(bot, allowed)).await;
    Ok(())
}
