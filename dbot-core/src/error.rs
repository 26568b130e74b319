use thiserror::Error;

/// A field expected on a raw platform object was absent for this kind of update.
///
/// Usually means a handler built the wrong context for the update it matched
/// (e.g. asking a plain message update for its callback query).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{object} has no field `{field}`")]
pub struct FieldAccessError {
    /// Short description of the wrapper that was asked, e.g. `Update(id=7, kind=message)`.
    pub object: String,
    pub field: &'static str,
}

/// Callback data was present but was not a string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("callback data of query {query_id} must be a string, found {found}")]
pub struct CallbackDataError {
    pub query_id: String,
    /// JSON type name of the offending payload.
    pub found: &'static str,
}

#[derive(Error, Debug)]
pub enum DbotError {
    #[error("Field access error: {0}")]
    FieldAccess(#[from] FieldAccessError),

    #[error("Callback data error: {0}")]
    CallbackData(#[from] CallbackDataError),

    /// Failure reported by the platform for an outbound call (send, edit, answer, copy).
    #[error("Platform call failed: {0}")]
    Platform(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by application callbacks and middleware.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Unauthorized access")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, DbotError>;
