//! Core types: update, message, chat, user, callback query, and the Handler/Middleware traits.
//!
//! The JSON shape follows the platform's update payloads (`update_id` plus one event field),
//! so an [`Update`] can be decoded straight from a webhook body or a replay file.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bot::Bot;
use crate::error::{CallbackDataError, Result};
use crate::markup::InlineKeyboardMarkup;
use crate::raw::RawObject;

/// User identity (id, username, names).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// Chat (channel, group or private) identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default = "default_chat_type")]
    pub chat_type: String,
}

fn default_chat_type() -> String {
    "private".to_string()
}

/// A message in a chat. Outgoing calls through [`Bot`] return one of these for the sent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "message_id")]
    pub id: i32,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl Message {
    /// Returns the text of the message, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// True if the text starts with a `/`.
    pub fn is_command(&self) -> bool {
        self.text().is_some_and(|t| t.starts_with('/'))
    }
}

/// A button press on an inline keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Message the pressed button belongs to; absent when the message is too old or inaccessible.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    /// Raw callback data as delivered. Well-formed buttons always carry a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl CallbackQuery {
    /// Returns the callback data as a string; `Ok(None)` when no data was sent.
    pub fn data_str(&self) -> std::result::Result<Option<&str>, CallbackDataError> {
        match &self.data {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(CallbackDataError {
                query_id: self.id.clone(),
                found: json_type_name(other),
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The event carried by one [`Update`]. Exactly one kind per update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    CallbackQuery(CallbackQuery),
    /// Any other platform event (membership changes, polls, ...); only its tag is kept.
    Other { kind: String },
}

/// One inbound event from the chat platform.
///
/// Serialized as `{"update_id": .., "<event>": {..}}`. Event fields other than `message`,
/// `edited_message` and `callback_query` decode to [`UpdateKind::Other`] named after the field.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub id: i64,
    pub kind: UpdateKind,
}

const UPDATE_ID: &str = "update_id";

impl Serialize for Update {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(UPDATE_ID, &self.id)?;
        match &self.kind {
            UpdateKind::Message(m) => map.serialize_entry("message", m)?,
            UpdateKind::EditedMessage(m) => map.serialize_entry("edited_message", m)?,
            UpdateKind::CallbackQuery(q) => map.serialize_entry("callback_query", q)?,
            UpdateKind::Other { kind } => map.serialize_entry(kind, &Map::new())?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Update {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        let id = fields
            .remove(UPDATE_ID)
            .ok_or_else(|| de::Error::missing_field(UPDATE_ID))?;
        let id = i64::deserialize(id).map_err(de::Error::custom)?;

        let kind = if let Some(payload) = fields.remove("message") {
            UpdateKind::Message(Message::deserialize(payload).map_err(de::Error::custom)?)
        } else if let Some(payload) = fields.remove("edited_message") {
            UpdateKind::EditedMessage(Message::deserialize(payload).map_err(de::Error::custom)?)
        } else if let Some(payload) = fields.remove("callback_query") {
            UpdateKind::CallbackQuery(
                CallbackQuery::deserialize(payload).map_err(de::Error::custom)?,
            )
        } else {
            let kind = fields
                .into_iter()
                .next()
                .map(|(key, _)| key)
                .ok_or_else(|| de::Error::custom("update carries no event field"))?;
            UpdateKind::Other { kind }
        };
        Ok(Update { id, kind })
    }
}

impl Update {
    pub fn new(id: i64, kind: UpdateKind) -> Self {
        Self { id, kind }
    }

    /// Decodes an update from its JSON payload.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Name of the update kind, for logs and error messages.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            UpdateKind::Message(_) => "message",
            UpdateKind::EditedMessage(_) => "edited_message",
            UpdateKind::CallbackQuery(_) => "callback_query",
            UpdateKind::Other { .. } => "other",
        }
    }

    /// The new message carried by this update (not edits, not queries).
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn edited_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::EditedMessage(m) => Some(m),
            _ => None,
        }
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        match &self.kind {
            UpdateKind::CallbackQuery(q) => Some(q),
            _ => None,
        }
    }

    /// The message this update is about: the new or edited message, or the message a
    /// pressed button is attached to.
    pub fn effective_message(&self) -> Option<&Message> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => Some(m),
            UpdateKind::CallbackQuery(q) => q.message.as_ref(),
            UpdateKind::Other { .. } => None,
        }
    }

    pub fn effective_chat(&self) -> Option<&Chat> {
        self.effective_message().map(|m| &m.chat)
    }

    /// The user who caused this update: message sender or button presser.
    pub fn effective_user(&self) -> Option<&User> {
        match &self.kind {
            UpdateKind::Message(m) | UpdateKind::EditedMessage(m) => m.from.as_ref(),
            UpdateKind::CallbackQuery(q) => Some(&q.from),
            UpdateKind::Other { .. } => None,
        }
    }
}

impl RawObject for Update {
    fn describe(&self) -> String {
        format!("Update(id={}, kind={})", self.id, self.kind_name())
    }
}

impl RawObject for Message {
    fn describe(&self) -> String {
        format!("Message(id={}, chat={})", self.id, self.chat.id)
    }
}

impl RawObject for CallbackQuery {
    fn describe(&self) -> String {
        format!("CallbackQuery(id={})", self.id)
    }
}

impl RawObject for User {
    fn describe(&self) -> String {
        format!("User(id={})", self.id)
    }
}

impl RawObject for Chat {
    fn describe(&self) -> String {
        format!("Chat(id={})", self.id)
    }
}

/// Converts a transport-specific user type to core [`User`].
pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

/// Converts a transport-specific message type to core [`Message`].
pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Converts a transport-specific update type to core [`Update`].
pub trait ToCoreUpdate: Send + Sync {
    fn to_core(&self) -> Update;
}

/// Result of one dispatch pass over the registered handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler matched and its callback ran to completion.
    Handled,
    /// No handler matched; the update was dropped.
    Unhandled,
}

/// One dispatch target: decides whether it wants an update and handles it.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Whether this handler should handle `update`. Must not have side effects.
    fn check_update(&self, update: &Update) -> Result<bool>;

    /// Update kinds (by [`Update::kind_name`]) this handler can ever accept; `None` means any.
    fn update_kinds(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Handles an update for which [`Handler::check_update`] returned true.
    async fn handle(&self, update: Update, bot: Arc<dyn Bot>) -> Result<()>;
}

/// Hooks around one dispatch pass. `before` runs in registration order and may drop the
/// update by returning false; `after` runs in reverse order with the outcome.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn before(&self, _update: &Update) -> Result<bool> {
        Ok(true)
    }

    async fn after(&self, _update: &Update, _outcome: DispatchOutcome) -> Result<()> {
        Ok(())
    }
}
