//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, ToCoreMessage,
    ToCoreUpdate, ToCoreUser, Update, UpdateKind, User,
};
use serde_json::Value;
use teloxide::types::{self as tg, InlineKeyboardButtonKind};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a tg::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            is_bot: self.0.is_bot,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a tg::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        Message {
            id: self.0.id.0,
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            from: self.0.from.as_ref().map(|u| TelegramUserWrapper(u).to_core()),
            date: self.0.date,
            text: self.0.text().map(str::to_string),
            reply_to_message_id: self.0.reply_to_message().map(|m| m.id.0),
            reply_markup: self.0.reply_markup().map(markup_to_core),
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_group() {
            "group"
        } else if chat.is_supergroup() {
            "supergroup"
        } else {
            "channel"
        }
    }
}

/// Wraps a teloxide Update for conversion to core [`Update`]. Kinds the dispatch layer
/// does not model become [`UpdateKind::Other`] tagged with the platform field name.
pub struct TelegramUpdateWrapper<'a>(pub &'a tg::Update);

impl<'a> ToCoreUpdate for TelegramUpdateWrapper<'a> {
    fn to_core(&self) -> Update {
        let kind = match &self.0.kind {
            tg::UpdateKind::Message(m) => UpdateKind::Message(TelegramMessageWrapper(m).to_core()),
            tg::UpdateKind::EditedMessage(m) => {
                UpdateKind::EditedMessage(TelegramMessageWrapper(m).to_core())
            }
            tg::UpdateKind::CallbackQuery(q) => UpdateKind::CallbackQuery(CallbackQuery {
                id: q.id.to_string(),
                from: TelegramUserWrapper(&q.from).to_core(),
                message: q
                    .message
                    .as_ref()
                    .and_then(|m| m.regular_message())
                    .map(|m| TelegramMessageWrapper(m).to_core()),
                data: q.data.clone().map(Value::String),
            }),
            other => UpdateKind::Other {
                kind: other_kind_name(other).to_string(),
            },
        };
        Update::new(self.0.id.0 as i64, kind)
    }
}

fn other_kind_name(kind: &tg::UpdateKind) -> &'static str {
    match kind {
        tg::UpdateKind::ChannelPost(_) => "channel_post",
        tg::UpdateKind::EditedChannelPost(_) => "edited_channel_post",
        tg::UpdateKind::InlineQuery(_) => "inline_query",
        tg::UpdateKind::ChosenInlineResult(_) => "chosen_inline_result",
        tg::UpdateKind::Poll(_) => "poll",
        tg::UpdateKind::PollAnswer(_) => "poll_answer",
        tg::UpdateKind::MyChatMember(_) => "my_chat_member",
        tg::UpdateKind::ChatMember(_) => "chat_member",
        tg::UpdateKind::ChatJoinRequest(_) => "chat_join_request",
        _ => "unknown",
    }
}

/// Core markup from a received message. Only callback buttons are kept.
fn markup_to_core(markup: &tg::InlineKeyboardMarkup) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: markup
            .inline_keyboard
            .iter()
            .map(|row| {
                row.iter()
                    .filter_map(|button| match &button.kind {
                        InlineKeyboardButtonKind::CallbackData(data) => {
                            Some(InlineKeyboardButton::new(button.text.clone(), data.clone()))
                        }
                        _ => None,
                    })
                    .collect()
            })
            .collect(),
    }
}

/// Teloxide markup for an outgoing message.
pub(crate) fn markup_to_telegram(markup: &InlineKeyboardMarkup) -> tg::InlineKeyboardMarkup {
    tg::InlineKeyboardMarkup::new(markup.inline_keyboard.iter().map(|row| {
        row.iter()
            .map(|b| tg::InlineKeyboardButton::callback(b.text.clone(), b.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}
