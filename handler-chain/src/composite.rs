//! First-match dispatch over an ordered list of handlers.
//!
//! Registration order is the only priority: register specific handlers before catch-alls
//! (a button-specific query handler before [`CompositeHandler::on_any_query`], a literal
//! text handler before [`CompositeHandler::on_text`]), or the catch-all shadows them.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use dbot_core::{Bot, DispatchOutcome, Handler, InlineKeyboardButton, Result, Update};
use tracing::{debug, info, instrument};

use crate::context::{MessageContext, QueryContext, TextContext};
use crate::handler::CallbackHandler;

/// Ordered handlers; at most one of them handles any given update.
#[derive(Clone, Default)]
pub struct CompositeHandler {
    handlers: Vec<Arc<dyn Handler>>,
}

impl CompositeHandler {
    /// Creates an empty composite (matches nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler; it is consulted after every handler added before it.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn on_command<F, Fut>(self, name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.add_handler(Arc::new(CallbackHandler::command(name, callback)))
    }

    pub fn on_query<F, Fut>(self, button: &InlineKeyboardButton, callback: F) -> Self
    where
        F: Fn(QueryContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.add_handler(Arc::new(CallbackHandler::query(button, callback)))
    }

    pub fn on_any_query<F, Fut>(self, callback: F) -> Self
    where
        F: Fn(QueryContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.add_handler(Arc::new(CallbackHandler::any_query(callback)))
    }

    pub fn on_text<F, Fut>(self, callback: F) -> Self
    where
        F: Fn(TextContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.add_handler(Arc::new(CallbackHandler::text(callback)))
    }

    pub fn on_exact_text<F, Fut>(self, literal: impl Into<String>, callback: F) -> Self
    where
        F: Fn(TextContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.add_handler(Arc::new(CallbackHandler::exact_text(literal, callback)))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    /// First handler, in registration order, whose check accepts `update`.
    pub fn find_handler(&self, update: &Update) -> Result<Option<&Arc<dyn Handler>>> {
        for handler in &self.handlers {
            if handler.check_update(update)? {
                return Ok(Some(handler));
            }
        }
        Ok(None)
    }

    /// Union of the update kinds the handlers accept; `None` if any handler accepts every kind.
    pub fn update_kinds(&self) -> Option<BTreeSet<&'static str>> {
        let mut kinds = BTreeSet::new();
        for handler in &self.handlers {
            kinds.extend(handler.update_kinds()?.iter().copied());
        }
        Some(kinds)
    }

    /// Routes `update` to the first matching handler. Unmatched updates are dropped.
    #[instrument(skip(self, update, bot), fields(update_id = update.id, kind = update.kind_name()))]
    pub async fn dispatch(&self, update: Update, bot: Arc<dyn Bot>) -> Result<DispatchOutcome> {
        let Some(handler) = self.find_handler(&update)? else {
            debug!("step: no handler matched, update dropped");
            return Ok(DispatchOutcome::Unhandled);
        };
        info!(handler = %handler.name(), "step: handler matched");
        handler.handle(update, bot).await?;
        Ok(DispatchOutcome::Handled)
    }
}
