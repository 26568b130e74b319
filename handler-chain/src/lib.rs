//! # Handler chain
//!
//! Declarative update dispatch: a [`Trigger`] decides whether an update is for a handler, a
//! [`CallbackHandler`] builds the matching context ([`MessageContext`], [`TextContext`],
//! [`QueryContext`]) and runs the application callback, a [`CompositeHandler`] routes each
//! update to the first matching handler, and the [`App`] drives the receive loop.

mod app;
mod composite;
mod context;
mod handler;
mod trigger;

pub use app::{App, AppConfig, UpdateSource};
pub use composite::CompositeHandler;
pub use context::{
    Context, DispatchContext, MessageContext, PendingAnswer, QueryContext, TextContext,
};
pub use handler::{Callback, CallbackHandler};
pub use trigger::{FilterFn, Trigger};

// Unit/integration tests live in tests/
