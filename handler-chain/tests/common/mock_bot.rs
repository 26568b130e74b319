//! Mock implementation of [`dbot_core::Bot`] for integration tests.
//!
//! Records every outbound call so tests can assert on replies, edits and query answers
//! without hitting the platform. Edits can be made to fail to exercise platform errors.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use dbot_core::{Bot, Chat, DbotError, InlineKeyboardMarkup, Message, Result};

/// One recorded outbound call.
#[derive(Debug, Clone, PartialEq)]
pub enum BotCall {
    Send {
        chat_id: i64,
        text: String,
        reply_to: Option<i32>,
        markup: Option<InlineKeyboardMarkup>,
    },
    Edit {
        chat_id: i64,
        message_id: i32,
        text: String,
    },
    Answer {
        query_id: String,
        text: String,
        show_alert: bool,
    },
    Copy {
        from_chat_id: i64,
        to_chat_id: i64,
        message_id: i32,
    },
}

pub struct MockBot {
    calls: Mutex<Vec<BotCall>>,
    next_message_id: AtomicI32,
    fail_edits: bool,
    fail_answers: bool,
}

impl MockBot {
    fn with_failures(fail_edits: bool, fail_answers: bool) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            next_message_id: AtomicI32::new(1000),
            fail_edits,
            fail_answers,
        })
    }

    pub fn new() -> Arc<Self> {
        Self::with_failures(false, false)
    }

    /// A bot whose `edit_message` always fails like a stale message would.
    pub fn failing_edits() -> Arc<Self> {
        Self::with_failures(true, false)
    }

    /// A bot whose `answer_query` always fails (the call is still recorded).
    pub fn failing_answers() -> Arc<Self> {
        Self::with_failures(false, true)
    }

    pub fn calls(&self) -> Vec<BotCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Recorded `answer_query` calls only.
    pub fn answers(&self) -> Vec<BotCall> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, BotCall::Answer { .. }))
            .collect()
    }

    /// Texts of recorded `send_message` calls, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                BotCall::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: BotCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn sent(&self, chat_id: i64, text: &str, markup: Option<&InlineKeyboardMarkup>) -> Message {
        Message {
            id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            chat: Chat {
                id: chat_id,
                chat_type: "private".to_string(),
            },
            from: None,
            date: Utc::now(),
            text: Some(text.to_string()),
            reply_to_message_id: None,
            reply_markup: markup.cloned(),
        }
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
        reply_to: Option<i32>,
    ) -> Result<Message> {
        self.record(BotCall::Send {
            chat_id,
            text: text.to_string(),
            reply_to,
            markup: markup.cloned(),
        });
        let mut message = self.sent(chat_id, text, markup);
        message.reply_to_message_id = reply_to;
        Ok(message)
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i32,
        text: &str,
        markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        self.record(BotCall::Edit {
            chat_id,
            message_id,
            text: text.to_string(),
        });
        if self.fail_edits {
            return Err(DbotError::Platform(
                "Bad Request: message can't be edited".to_string(),
            ));
        }
        let mut message = self.sent(chat_id, text, markup);
        message.id = message_id;
        Ok(message)
    }

    async fn answer_query(&self, query_id: &str, text: &str, show_alert: bool) -> Result<()> {
        // Suspend like a network call would, so concurrent answers interleave.
        tokio::task::yield_now().await;
        self.record(BotCall::Answer {
            query_id: query_id.to_string(),
            text: text.to_string(),
            show_alert,
        });
        if self.fail_answers {
            return Err(DbotError::Platform("Bad Request: query is too old".to_string()));
        }
        Ok(())
    }

    async fn copy_message(
        &self,
        from_chat_id: i64,
        to_chat_id: i64,
        message_id: i32,
    ) -> Result<i32> {
        self.record(BotCall::Copy {
            from_chat_id,
            to_chat_id,
            message_id,
        });
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }
}
