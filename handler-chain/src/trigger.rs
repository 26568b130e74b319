//! Triggers: the matching rule a handler is registered with.
//!
//! A [`Trigger`] looks only at the [`Update`]; it never touches the network. Variants are a
//! closed set so every recognized option is spelled out here.

use std::fmt;
use std::sync::Arc;

use dbot_core::{InlineKeyboardButton, Result, Update};

/// Predicate used by [`Trigger::Filter`].
pub type FilterFn = Arc<dyn Fn(&Update) -> bool + Send + Sync>;

const MESSAGE_KINDS: &[&str] = &["message"];
const QUERY_KINDS: &[&str] = &["callback_query"];

/// Matching rule deciding whether a handler fires for an update.
#[derive(Clone)]
pub enum Trigger {
    /// A new message whose first word is `/name` (or `/name@botname`).
    Command(String),
    /// A callback query whose data equals the given string; `None` matches any query.
    Query(Option<String>),
    /// A new text message equal to the given literal (case-sensitive); `None` matches any
    /// text the command trigger would not match.
    Text(Option<String>),
    /// Arbitrary predicate over the update.
    Filter(FilterFn),
}

impl Trigger {
    /// Command trigger. A leading `/` in `name` is ignored.
    pub fn command(name: impl Into<String>) -> Self {
        let name = name.into();
        Trigger::Command(name.trim_start_matches('/').to_string())
    }

    /// Matches presses of exactly this button.
    pub fn query(button: &InlineKeyboardButton) -> Self {
        Trigger::Query(Some(button.callback_data.clone()))
    }

    /// Matches presses of any button.
    pub fn any_query() -> Self {
        Trigger::Query(None)
    }

    /// Matches any non-command text message.
    pub fn text() -> Self {
        Trigger::Text(None)
    }

    pub fn exact_text(literal: impl Into<String>) -> Self {
        Trigger::Text(Some(literal.into()))
    }

    pub fn filter<F>(f: F) -> Self
    where
        F: Fn(&Update) -> bool + Send + Sync + 'static,
    {
        Trigger::Filter(Arc::new(f))
    }

    /// Whether `update` satisfies this trigger.
    ///
    /// Fails with [`CallbackDataError`](dbot_core::CallbackDataError) when a query trigger
    /// sees callback data that is not a string.
    pub fn matches(&self, update: &Update) -> Result<bool> {
        match self {
            Trigger::Command(name) => Ok(update
                .message()
                .and_then(|m| m.text())
                .and_then(command_name)
                .is_some_and(|cmd| cmd == name)),
            Trigger::Query(expected) => {
                let Some(query) = update.callback_query() else {
                    return Ok(false);
                };
                let data = query.data_str()?;
                Ok(match expected {
                    None => true,
                    Some(expected) => data == Some(expected.as_str()),
                })
            }
            Trigger::Text(literal) => {
                let Some(text) = update.message().and_then(|m| m.text()) else {
                    return Ok(false);
                };
                Ok(match literal {
                    Some(literal) => text == literal,
                    None => command_name(text).is_none(),
                })
            }
            Trigger::Filter(f) => Ok(f(update)),
        }
    }

    /// Update kinds this trigger can match, by [`Update::kind_name`]. `None` means any kind.
    pub fn update_kinds(&self) -> Option<&'static [&'static str]> {
        match self {
            Trigger::Command(_) | Trigger::Text(_) => Some(MESSAGE_KINDS),
            Trigger::Query(_) => Some(QUERY_KINDS),
            Trigger::Filter(_) => None,
        }
    }
}

/// Extracts `name` from `/name`, `/name@bot` or `/name args`. The text must begin with `/`.
fn command_name(text: &str) -> Option<&str> {
    let first = text.split(char::is_whitespace).next()?;
    let cmd = first.strip_prefix('/')?;
    let cmd = cmd.split('@').next().unwrap_or(cmd);
    (!cmd.is_empty()).then_some(cmd)
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Command(name) => write!(f, "command(/{})", name),
            Trigger::Query(Some(data)) => write!(f, "query({})", data),
            Trigger::Query(None) => write!(f, "query(*)"),
            Trigger::Text(Some(literal)) => write!(f, "text({:?})", literal),
            Trigger::Text(None) => write!(f, "text(*)"),
            Trigger::Filter(_) => write!(f, "filter"),
        }
    }
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger::{}", self)
    }
}
