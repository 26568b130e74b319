//! Wraps teloxide::Bot and implements [`dbot_core::Bot`]. Production code talks to Telegram;
//! tests substitute another Bot impl.

use async_trait::async_trait;
use dbot_core::{Bot as CoreBot, DbotError, InlineKeyboardMarkup, Message, Result, ToCoreMessage};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId, MessageId, ReplyParameters};
use tracing::{debug, instrument};

use crate::adapters::{markup_to_telegram, TelegramMessageWrapper};

/// Thin wrapper around teloxide::Bot that implements dbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    /// Creates an adapter from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn platform_error(e: teloxide::RequestError) -> DbotError {
    DbotError::Platform(e.to_string())
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    #[instrument(skip(self, text, markup))]
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
        reply_to: Option<i32>,
    ) -> Result<Message> {
        let mut request = self.bot.send_message(ChatId(chat_id), text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup_to_telegram(markup));
        }
        if let Some(id) = reply_to {
            request = request.reply_parameters(ReplyParameters::new(MessageId(id)));
        }
        let sent = request.await.map_err(platform_error)?;
        debug!(message_id = sent.id.0, "Message sent");
        Ok(TelegramMessageWrapper(&sent).to_core())
    }

    #[instrument(skip(self, text, markup))]
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        let mut request = self
            .bot
            .edit_message_text(ChatId(chat_id), MessageId(message_id), text);
        if let Some(markup) = markup {
            request = request.reply_markup(markup_to_telegram(markup));
        }
        let edited = request.await.map_err(platform_error)?;
        Ok(TelegramMessageWrapper(&edited).to_core())
    }

    #[instrument(skip(self, text))]
    async fn answer_query(&self, query_id: &str, text: &str, show_alert: bool) -> Result<()> {
        let mut request = self
            .bot
            .answer_callback_query(CallbackQueryId(query_id.to_string()));
        if !text.is_empty() {
            request = request.text(text);
        }
        if show_alert {
            request = request.show_alert(true);
        }
        request.await.map_err(platform_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn copy_message(
        &self,
        from_chat_id: i64,
        to_chat_id: i64,
        message_id: i32,
    ) -> Result<i32> {
        let copied = self
            .bot
            .copy_message(ChatId(to_chat_id), ChatId(from_chat_id), MessageId(message_id))
            .await
            .map_err(platform_error)?;
        Ok(copied.0)
    }
}
