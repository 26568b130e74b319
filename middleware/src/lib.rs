//! # middleware
//!
//! [`dbot_core::Middleware`] implementations run by the dispatch loop around every update.

mod logging_auth;

#[cfg(test)]
mod test;

pub use logging_auth::{AuthMiddleware, LoggingMiddleware};
