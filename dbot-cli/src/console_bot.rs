//! [`Bot`] that prints outbound calls instead of talking to a platform. Used by `replay`.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Chat, InlineKeyboardMarkup, Message, Result};
use tracing::info;

const FIRST_MESSAGE_ID: i32 = 1000;

/// Prints each call as one transcript line and keeps the transcript for inspection.
pub struct ConsoleBot {
    next_message_id: AtomicI32,
    transcript: Mutex<Vec<String>>,
}

impl ConsoleBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_message_id: AtomicI32::new(FIRST_MESSAGE_ID),
            transcript: Mutex::new(Vec::new()),
        })
    }

    /// Every call made so far, in call order.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, line: String) {
        info!(call = %line, "step: outbound call");
        println!("{}", line);
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line);
    }

    fn message(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
        reply_to: Option<i32>,
    ) -> Message {
        Message {
            id: message_id,
            chat: Chat {
                id: chat_id,
                chat_type: "private".to_string(),
            },
            from: None,
            date: Utc::now(),
            text: Some(text.to_string()),
            reply_to_message_id: reply_to,
            reply_markup: markup.cloned(),
        }
    }
}

fn with_buttons(text: &str, markup: Option<&InlineKeyboardMarkup>) -> String {
    match markup {
        Some(markup) => {
            let labels: Vec<&str> = markup.buttons().map(|b| b.text.as_str()).collect();
            format!("{} [{}]", text, labels.join(" | "))
        }
        None => text.to_string(),
    }
}

#[async_trait]
impl Bot for ConsoleBot {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
        reply_to: Option<i32>,
    ) -> Result<Message> {
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.record(format!("send {}: {}", chat_id, with_buttons(text, markup)));
        Ok(self.message(chat_id, id, text, markup, reply_to))
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        self.record(format!(
            "edit {}/{}: {}",
            chat_id,
            message_id,
            with_buttons(text, markup)
        ));
        Ok(self.message(chat_id, message_id, text, markup, None))
    }

    async fn answer_query(&self, query_id: &str, text: &str, show_alert: bool) -> Result<()> {
        let alert = if show_alert { " (alert)" } else { "" };
        self.record(format!("answer {}: {}{}", query_id, text, alert));
        Ok(())
    }

    async fn copy_message(
        &self,
        from_chat_id: i64,
        to_chat_id: i64,
        message_id: i32,
    ) -> Result<i32> {
        let id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.record(format!(
            "copy {}/{} -> {}",
            from_chat_id, message_id, to_chat_id
        ));
        Ok(id)
    }
}
