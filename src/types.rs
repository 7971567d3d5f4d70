use thiserror::Error;

/// Errors surfaced by the remote accessors and the sync engines.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("remote service error: {0}")]
    Remote(String),
    #[error("no bot with id {0}")]
    BotNotFound(i64),
    #[error("engine has been shut down")]
    Closed,
}
