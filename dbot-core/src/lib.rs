//! # dbot-core
//!
//! Core types and traits for the dispatch framework: the [`Update`] model and its
//! [`RawObject`] field validation, the outbound [`Bot`] trait, [`Handler`] and [`Middleware`],
//! the error taxonomy, and tracing initialization. Transport-agnostic; used by
//! handler-chain, middleware, and dbot-telegram.

pub mod bot;
pub mod error;
pub mod logger;
pub mod markup;
pub mod raw;
pub mod types;

pub use bot::Bot;
pub use error::{CallbackDataError, DbotError, FieldAccessError, HandlerError, Result};
pub use logger::init_tracing;
pub use markup::{InlineKeyboardButton, InlineKeyboardMarkup};
pub use raw::RawObject;
pub use types::{
    CallbackQuery, Chat, DispatchOutcome, Handler, Message, Middleware, ToCoreMessage,
    ToCoreUpdate, ToCoreUser, Update, UpdateKind, User,
};
