//! [`CallbackHandler`]: one trigger bound to one callback.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use dbot_core::{Bot, Handler, InlineKeyboardButton, Result, Update};
use futures::future::BoxFuture;
use tracing::{debug, instrument, warn};

use crate::context::{DispatchContext, MessageContext, QueryContext, TextContext};
use crate::trigger::Trigger;

/// Application code run for a matched update.
pub trait Callback<C>: Send + Sync + 'static {
    fn call(&self, ctx: C) -> BoxFuture<'static, Result<()>>;
}

impl<C, F, Fut> Callback<C> for F
where
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn call(&self, ctx: C) -> BoxFuture<'static, Result<()>> {
        Box::pin((self)(ctx))
    }
}

/// Binds a [`Trigger`] to a callback taking context type `C`.
///
/// On a match the handler builds `C` from the update, runs the callback, and for query
/// contexts answers the query with an empty text if the callback did not answer it.
/// Callback errors are returned unchanged.
pub struct CallbackHandler<C> {
    name: String,
    trigger: Trigger,
    callback: Arc<dyn Callback<C>>,
    auto_answer: bool,
}

impl<C: DispatchContext> CallbackHandler<C> {
    pub fn new<F, Fut>(trigger: Trigger, callback: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            name: trigger.to_string(),
            trigger,
            callback: Arc::new(callback),
            auto_answer: true,
        }
    }

    /// Overrides the name used in logs (defaults to the trigger's description).
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Turns the automatic empty answer for queries on or off (on by default). Turn it off
    /// only when the callback hands the query to something else that answers it.
    pub fn auto_answer(mut self, enabled: bool) -> Self {
        self.auto_answer = enabled;
        self
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }
}

impl CallbackHandler<MessageContext> {
    /// Handler for `/name` commands.
    pub fn command<F, Fut>(name: impl Into<String>, callback: F) -> Self
    where
        F: Fn(MessageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::new(Trigger::command(name), callback)
    }
}

impl CallbackHandler<TextContext> {
    /// Handler for any non-command text.
    pub fn text<F, Fut>(callback: F) -> Self
    where
        F: Fn(TextContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::new(Trigger::text(), callback)
    }

    pub fn exact_text<F, Fut>(literal: impl Into<String>, callback: F) -> Self
    where
        F: Fn(TextContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::new(Trigger::exact_text(literal), callback)
    }
}

impl CallbackHandler<QueryContext> {
    /// Handler for presses of `button`.
    pub fn query<F, Fut>(button: &InlineKeyboardButton, callback: F) -> Self
    where
        F: Fn(QueryContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::new(Trigger::query(button), callback)
    }

    pub fn any_query<F, Fut>(callback: F) -> Self
    where
        F: Fn(QueryContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self::new(Trigger::any_query(), callback)
    }
}

#[async_trait]
impl<C: DispatchContext> Handler for CallbackHandler<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_update(&self, update: &Update) -> Result<bool> {
        self.trigger.matches(update)
    }

    fn update_kinds(&self) -> Option<&'static [&'static str]> {
        self.trigger.update_kinds()
    }

    #[instrument(skip(self, update, bot), fields(handler = %self.name, update_id = update.id))]
    async fn handle(&self, update: Update, bot: Arc<dyn Bot>) -> Result<()> {
        let ctx = C::build(update, bot)?;
        let pending = if self.auto_answer {
            ctx.pending_answer()
        } else {
            None
        };

        debug!("step: callback started");
        let result = self.callback.call(ctx).await;
        debug!(ok = result.is_ok(), "step: callback finished");

        if let Some(pending) = pending {
            match pending.settle().await {
                Ok(_) => {}
                // The callback's own error takes precedence over a failed auto-answer.
                Err(e) if result.is_err() => {
                    warn!(error = %e, "Auto-answer after failed callback also failed");
                }
                Err(e) => return Err(e),
            }
        }

        result
    }
}
