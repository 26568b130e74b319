//! # dbot-telegram
//!
//! Telegram transport for the dispatch framework: teloxide → core adapters, a
//! [`dbot_core::Bot`] implementation, minimal config, and a long-polling runner.
//! Handles only Telegram connectivity; dispatch lives in handler-chain.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUpdateWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::{allowed_updates, build_bot, run_polling, TelegramPolling};
