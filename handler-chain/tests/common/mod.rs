//! Shared fixtures for handler-chain integration tests.

#![allow(dead_code)]

pub mod mock_bot;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use dbot_core::{CallbackQuery, Chat, Message, Update, UpdateKind, User};
use serde_json::Value;

pub const CHAT_ID: i64 = 456;
pub const USER_ID: i64 = 123;
pub const MESSAGE_ID: i32 = 77;

pub fn test_user() -> User {
    User {
        id: USER_ID,
        is_bot: false,
        username: Some("test_user".to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
    }
}

pub fn test_message(text: Option<&str>) -> Message {
    Message {
        id: MESSAGE_ID,
        chat: Chat {
            id: CHAT_ID,
            chat_type: "private".to_string(),
        },
        from: Some(test_user()),
        date: Utc::now(),
        text: text.map(str::to_string),
        reply_to_message_id: None,
        reply_markup: None,
    }
}

pub fn message_update(id: i64, text: &str) -> Update {
    Update::new(id, UpdateKind::Message(test_message(Some(text))))
}

/// A message update without text (e.g. a photo).
pub fn media_update(id: i64) -> Update {
    Update::new(id, UpdateKind::Message(test_message(None)))
}

pub fn query_update(id: i64, data: Value) -> Update {
    Update::new(
        id,
        UpdateKind::CallbackQuery(CallbackQuery {
            id: format!("query-{}", id),
            from: test_user(),
            message: Some(test_message(Some("Pick one"))),
            data: Some(data),
        }),
    )
}

pub fn button_update(id: i64, callback_data: &str) -> Update {
    query_update(id, Value::String(callback_data.to_string()))
}

pub fn other_update(id: i64) -> Update {
    Update::new(
        id,
        UpdateKind::Other {
            kind: "my_chat_member".to_string(),
        },
    )
}

/// Shared invocation counter for callbacks.
#[derive(Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}
