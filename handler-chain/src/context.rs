//! Contexts handed to callbacks: one update plus the shared bot handle.
//!
//! [`Context`] exposes validated accessors over the update; the kind-specific wrappers
//! ([`MessageContext`], [`TextContext`], [`QueryContext`]) are checked once when built and
//! add the calls that make sense for that kind of update (reply, edit, answer).

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dbot_core::{
    Bot, CallbackQuery, Chat, InlineKeyboardMarkup, Message, RawObject, Result, Update,
    UpdateKind, User,
};
use tracing::{debug, warn};

/// Builds a context from a matched update. Implemented by every context type a
/// [`CallbackHandler`](crate::CallbackHandler) can hand to its callback.
pub trait DispatchContext: Sized + Send + 'static {
    /// Fails with a field access error when `update` is not of the kind this context wraps.
    fn build(update: Update, bot: Arc<dyn Bot>) -> Result<Self>;

    /// Answer owed to the platform once the callback is done, if any.
    fn pending_answer(&self) -> Option<PendingAnswer> {
        None
    }
}

/// An update together with the bot handle.
pub struct Context {
    bot: Arc<dyn Bot>,
    update: Update,
}

impl Context {
    pub fn new(update: Update, bot: Arc<dyn Bot>) -> Self {
        Self { bot, update }
    }

    pub fn bot(&self) -> &Arc<dyn Bot> {
        &self.bot
    }

    pub fn update(&self) -> &Update {
        &self.update
    }

    /// The new message of a message update.
    pub fn message(&self) -> Result<&Message> {
        Ok(self
            .update
            .get_validated_field("message", self.update.message())?)
    }

    /// The callback query of a button-press update.
    pub fn query(&self) -> Result<&CallbackQuery> {
        Ok(self
            .update
            .get_validated_field("callback_query", self.update.callback_query())?)
    }

    pub fn effective_message(&self) -> Result<&Message> {
        Ok(self
            .update
            .get_validated_field("effective_message", self.update.effective_message())?)
    }

    pub fn effective_chat(&self) -> Result<&Chat> {
        Ok(self
            .update
            .get_validated_field("effective_chat", self.update.effective_chat())?)
    }

    pub fn effective_user(&self) -> Result<&User> {
        Ok(self
            .update
            .get_validated_field("effective_user", self.update.effective_user())?)
    }
}

impl DispatchContext for Context {
    fn build(update: Update, bot: Arc<dyn Bot>) -> Result<Self> {
        Ok(Self::new(update, bot))
    }
}

/// Context for new or edited messages.
pub struct MessageContext {
    ctx: Context,
    chat_id: i64,
    message_id: i32,
}

impl MessageContext {
    pub fn chat_id(&self) -> i64 {
        self.chat_id
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    /// Sends `text` into the chat as a reply to the originating message.
    pub async fn reply(&self, text: &str, markup: Option<&InlineKeyboardMarkup>) -> Result<Message> {
        self.ctx
            .bot
            .send_message(self.chat_id, text, markup, Some(self.message_id))
            .await
    }

    /// Sends `text` into the chat without quoting the originating message.
    pub async fn send(&self, text: &str, markup: Option<&InlineKeyboardMarkup>) -> Result<Message> {
        self.ctx
            .bot
            .send_message(self.chat_id, text, markup, None)
            .await
    }

    /// Edits the originating message in place. The platform rejects this for messages the
    /// bot did not author or that are too old; that error is returned as is.
    pub async fn edit(&self, text: &str, markup: Option<&InlineKeyboardMarkup>) -> Result<Message> {
        self.ctx
            .bot
            .edit_message(self.chat_id, self.message_id, text, markup)
            .await
    }

    /// Copies the originating message into `to_chat_id`; returns the id of the copy.
    pub async fn copy_to(&self, to_chat_id: i64) -> Result<i32> {
        self.ctx
            .bot
            .copy_message(self.chat_id, to_chat_id, self.message_id)
            .await
    }
}

impl Deref for MessageContext {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl DispatchContext for MessageContext {
    fn build(update: Update, bot: Arc<dyn Bot>) -> Result<Self> {
        let message = match &update.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => Some(m),
            _ => None,
        };
        let message = update.get_validated_field("message", message)?;
        let (chat_id, message_id) = (message.chat.id, message.id);
        Ok(Self {
            ctx: Context::new(update, bot),
            chat_id,
            message_id,
        })
    }
}

/// Context for text messages. The text is checked when the context is built, so the
/// accessors below cannot fail.
pub struct TextContext {
    inner: MessageContext,
    text: String,
}

impl TextContext {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lower-cased, whitespace-separated words of the text.
    pub fn text_words(&self) -> Vec<String> {
        self.text
            .split_whitespace()
            .map(str::to_lowercase)
            .collect()
    }
}

impl Deref for TextContext {
    type Target = MessageContext;

    fn deref(&self) -> &MessageContext {
        &self.inner
    }
}

impl DispatchContext for TextContext {
    fn build(update: Update, bot: Arc<dyn Bot>) -> Result<Self> {
        let inner = MessageContext::build(update, bot)?;
        let message = inner.effective_message()?;
        let text = message.get_validated_field("text", message.text())?.to_string();
        Ok(Self { inner, text })
    }
}

/// Context for button presses.
///
/// Every query must be answered once, or the user's client keeps showing a loading
/// indicator. [`QueryContext::answer`] records that it ran; the handler answers with an
/// empty text afterwards if the callback did not.
pub struct QueryContext {
    ctx: Context,
    query_id: String,
    answered: Arc<AtomicBool>,
}

impl QueryContext {
    pub fn query_id(&self) -> &str {
        &self.query_id
    }

    /// Callback data of the pressed button.
    pub fn data(&self) -> Result<Option<&str>> {
        Ok(self.query()?.data_str()?)
    }

    pub fn is_answered(&self) -> bool {
        self.answered.load(Ordering::SeqCst)
    }

    /// Acknowledges the query, optionally showing `text` (as an alert if `show_alert`).
    /// Only the first successful answer is sent; later calls are ignored.
    pub async fn answer(&self, text: &str, show_alert: bool) -> Result<()> {
        if !claim(&self.answered) {
            warn!(query_id = %self.query_id, "Query already answered, ignoring");
            return Ok(());
        }
        let result = self
            .ctx
            .bot
            .answer_query(&self.query_id, text, show_alert)
            .await;
        if result.is_err() {
            self.answered.store(false, Ordering::SeqCst);
        }
        result
    }

    /// Edits the message the pressed button is attached to.
    pub async fn edit(&self, text: &str, markup: Option<&InlineKeyboardMarkup>) -> Result<Message> {
        let query = self.query()?;
        let message = query.get_validated_field("message", query.message.as_ref())?;
        self.ctx
            .bot
            .edit_message(message.chat.id, message.id, text, markup)
            .await
    }
}

impl Deref for QueryContext {
    type Target = Context;

    fn deref(&self) -> &Context {
        &self.ctx
    }
}

impl DispatchContext for QueryContext {
    fn build(update: Update, bot: Arc<dyn Bot>) -> Result<Self> {
        let query_id = update
            .get_validated_field("callback_query", update.callback_query())?
            .id
            .clone();
        Ok(Self {
            ctx: Context::new(update, bot),
            query_id,
            answered: Arc::new(AtomicBool::new(false)),
        })
    }

    fn pending_answer(&self) -> Option<PendingAnswer> {
        Some(PendingAnswer {
            bot: self.ctx.bot.clone(),
            query_id: self.query_id.clone(),
            answered: self.answered.clone(),
        })
    }
}

/// The empty answer a query handler owes if its callback never answered.
pub struct PendingAnswer {
    bot: Arc<dyn Bot>,
    query_id: String,
    answered: Arc<AtomicBool>,
}

impl PendingAnswer {
    /// Sends the empty answer unless the query was already answered.
    /// Returns whether an answer was sent.
    pub async fn settle(self) -> Result<bool> {
        if !claim(&self.answered) {
            return Ok(false);
        }
        if let Err(e) = self.bot.answer_query(&self.query_id, "", false).await {
            self.answered.store(false, Ordering::SeqCst);
            return Err(e);
        }
        debug!(query_id = %self.query_id, "step: query auto-answered");
        Ok(true)
    }
}

/// Sets the answered flag; false if some other answer already holds it. Whoever claims the
/// flag sends the answer and releases it again if the call fails.
fn claim(answered: &AtomicBool) -> bool {
    answered
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}
