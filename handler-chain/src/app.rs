//! The receive loop: pulls updates from an [`UpdateSource`] and dispatches each one through
//! middleware and the registered composites.
//!
//! Every update is dispatched in its own task. A failing or panicking dispatch is logged and
//! the loop moves on to the next update. Shutdown stops reading, gives in-flight dispatches
//! [`AppConfig::shutdown_grace`] to finish, then aborts whatever is left; side effects a
//! callback already performed are not undone.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dbot_core::{Bot, DispatchOutcome, Middleware, Result, Update};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::composite::CompositeHandler;

/// Receive-loop settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Dispatch several updates at once. When false, each update is fully handled before the
    /// next one is read.
    pub concurrent: bool,
    /// How long in-flight dispatches may run after shutdown is requested.
    pub shutdown_grace: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            concurrent: true,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Where updates come from (long polling, webhook, a replay file, a test channel).
#[async_trait]
pub trait UpdateSource: Send {
    /// Next update; `None` once the source is exhausted.
    async fn next_update(&mut self) -> Option<Update>;

    /// Stops producing updates. Called once when the loop exits.
    async fn shutdown(&mut self) {}
}

#[async_trait]
impl UpdateSource for mpsc::Receiver<Update> {
    async fn next_update(&mut self) -> Option<Update> {
        self.recv().await
    }

    async fn shutdown(&mut self) {
        self.close();
    }
}

/// Middleware plus composites, shared by every dispatch task.
struct Router {
    bot: Arc<dyn Bot>,
    handlers: Vec<CompositeHandler>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Router {
    #[instrument(skip(self, update), fields(update_id = update.id, kind = update.kind_name()))]
    async fn route(&self, update: Update) -> Result<DispatchOutcome> {
        for mw in &self.middleware {
            if !mw.before(&update).await? {
                info!("step: middleware dropped update");
                return Ok(DispatchOutcome::Unhandled);
            }
        }

        let mut target = None;
        for composite in &self.handlers {
            if let Some(handler) = composite.find_handler(&update)? {
                target = Some(handler.clone());
                break;
            }
        }

        let outcome = match target {
            Some(handler) => {
                info!(handler = %handler.name(), "step: handler matched");
                handler.handle(update.clone(), self.bot.clone()).await?;
                DispatchOutcome::Handled
            }
            None => {
                debug!("step: no handler matched, update dropped");
                DispatchOutcome::Unhandled
            }
        };

        for mw in self.middleware.iter().rev() {
            mw.after(&update, outcome).await?;
        }
        Ok(outcome)
    }
}

/// Owns the bot handle and the handlers, and runs the receive loop.
pub struct App {
    router: Router,
    config: AppConfig,
    shutdown: CancellationToken,
}

impl App {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self {
            router: Router {
                bot,
                handlers: Vec::new(),
                middleware: Vec::new(),
            },
            config: AppConfig::default(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a composite. Composites are consulted in registration order and the first
    /// matching handler across all of them wins.
    pub fn add_handler(mut self, handler: CompositeHandler) -> Self {
        self.router.handlers.push(handler);
        self
    }

    /// Appends a middleware (`before` runs in order, `after` in reverse).
    pub fn add_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.router.middleware.push(middleware);
        self
    }

    pub fn bot(&self) -> &Arc<dyn Bot> {
        &self.router.bot
    }

    pub fn handlers(&self) -> &[CompositeHandler] {
        &self.router.handlers
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Token that stops [`App::run`] when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs one full dispatch pass for `update` and returns its outcome or error.
    pub async fn dispatch(&self, update: Update) -> Result<DispatchOutcome> {
        self.router.route(update).await
    }

    /// Reads updates from `source` until it is exhausted or the shutdown token is cancelled.
    #[instrument(skip(self, source))]
    pub async fn run<S: UpdateSource>(self, mut source: S) {
        let App {
            router,
            config,
            shutdown,
        } = self;
        let router = Arc::new(router);
        let mut tasks: JoinSet<()> = JoinSet::new();

        info!(
            concurrent = config.concurrent,
            composites = router.handlers.len(),
            middleware = router.middleware.len(),
            "step: receive loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("step: shutdown requested");
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => log_join(joined),
                next = source.next_update() => {
                    let Some(update) = next else {
                        info!("step: update source closed");
                        break;
                    };
                    tasks.spawn(dispatch_logged(router.clone(), update));
                    if !config.concurrent {
                        // Wait for this update before reading the next, unless shutdown comes
                        // first; the drain below then applies the grace period.
                        let stopped = tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => true,
                            joined = tasks.join_next() => {
                                if let Some(joined) = joined {
                                    log_join(joined);
                                }
                                false
                            }
                        };
                        if stopped {
                            info!("step: shutdown requested");
                            break;
                        }
                    }
                }
            }
        }

        source.shutdown().await;

        let in_flight = tasks.len();
        if in_flight > 0 {
            info!(in_flight, "step: waiting for in-flight dispatches");
        }
        let drain = async {
            while let Some(joined) = tasks.join_next().await {
                log_join(joined);
            }
        };
        if tokio::time::timeout(config.shutdown_grace, drain).await.is_err() {
            warn!(
                remaining = tasks.len(),
                grace_secs = config.shutdown_grace.as_secs_f64(),
                "Grace period elapsed, aborting in-flight dispatches"
            );
            tasks.shutdown().await;
        }

        info!("step: receive loop stopped");
    }
}

async fn dispatch_logged(router: Arc<Router>, update: Update) {
    let update_id = update.id;
    let kind = update.kind_name();
    match router.route(update).await {
        Ok(outcome) => debug!(update_id, ?outcome, "step: dispatch finished"),
        Err(e) => error!(update_id, kind, error = %e, "Dispatch failed"),
    }
}

fn log_join(joined: std::result::Result<(), JoinError>) {
    if let Err(e) = joined {
        if e.is_panic() {
            error!(error = %e, "Dispatch task panicked");
        } else {
            warn!(error = %e, "Dispatch task cancelled");
        }
    }
}
