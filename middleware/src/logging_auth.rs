//! Middleware for logging and optional auth (allowlist).

use std::collections::HashSet;

use async_trait::async_trait;
use dbot_core::{DispatchOutcome, HandlerError, Middleware, Result, Update};
use tracing::{debug, error, info, instrument};

/// Logs each update in before() and the dispatch outcome in after(); always continues.
pub struct LoggingMiddleware;

#[async_trait]
impl Middleware for LoggingMiddleware {
    #[instrument(skip(self, update))]
    async fn before(&self, update: &Update) -> Result<bool> {
        let user = update.effective_user();
        info!(
            update_id = update.id,
            kind = update.kind_name(),
            user_id = ?user.map(|u| u.id),
            username = %user.and_then(|u| u.username.as_deref()).unwrap_or("unknown"),
            chat_id = ?update.effective_chat().map(|c| c.id),
            text = ?update.effective_message().and_then(|m| m.text()),
            "Received update"
        );
        Ok(true)
    }

    #[instrument(skip(self, update))]
    async fn after(&self, update: &Update, outcome: DispatchOutcome) -> Result<()> {
        debug!(update_id = update.id, outcome = ?outcome, "Processed update");
        Ok(())
    }
}

/// Rejects updates whose effective user is not in the allowlist with
/// [`HandlerError::Unauthorized`]. Updates without a user (e.g. lifecycle events) pass.
pub struct AuthMiddleware {
    allowed_users: HashSet<i64>,
}

impl AuthMiddleware {
    /// Creates a middleware that allows only the given user ids.
    pub fn new(allowed_users: impl IntoIterator<Item = i64>) -> Self {
        Self {
            allowed_users: allowed_users.into_iter().collect(),
        }
    }
}

#[async_trait]
impl Middleware for AuthMiddleware {
    #[instrument(skip(self, update))]
    async fn before(&self, update: &Update) -> Result<bool> {
        let Some(user) = update.effective_user() else {
            return Ok(true);
        };
        if self.allowed_users.contains(&user.id) {
            debug!(user_id = user.id, "User authorized");
            Ok(true)
        } else {
            error!(user_id = user.id, update_id = update.id, "Unauthorized access attempt");
            Err(HandlerError::Unauthorized.into())
        }
    }
}
