use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("config file does not exist: {0}")]
    MissingConfig(PathBuf),

    #[error("malformed item '{id}': {reason}")]
    MalformedItem { id: String, reason: String },

    #[error("embedding error: {0}")]
    Embedding(String),
}
