//! Bot abstraction for the outbound platform calls.
//!
//! [`Bot`] is transport-agnostic; `dbot-telegram` implements it over teloxide and tests
//! substitute a recording mock. Every call reports its outcome to the caller; failures come
//! back as [`DbotError::Platform`](crate::DbotError::Platform) and no call is retried here.

use async_trait::async_trait;

use crate::error::Result;
use crate::markup::InlineKeyboardMarkup;
use crate::types::Message;

/// Shared handle to the chat platform client.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to `chat_id`, optionally as a reply to `reply_to` in that chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
        reply_to: Option<i32>,
    ) -> Result<Message>;

    /// Replaces the text (and markup) of an already-sent message.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message>;

    /// Acknowledges a callback query. An empty `text` shows nothing to the user.
    async fn answer_query(&self, query_id: &str, text: &str, show_alert: bool) -> Result<()>;

    /// Copies a message into another chat and returns the id of the copy.
    async fn copy_message(&self, from_chat_id: i64, to_chat_id: i64, message_id: i32)
        -> Result<i32>;
}
