use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    ConfigValidation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event parse error: {0}")]
    EventParse(#[from] serde_json::Error),

    #[error("unsupported event: {0} (expected: issue_comment, pull_request_review)")]
    UnsupportedEvent(String),

    #[error("github api error: {0}")]
    GitHub(String),
}

pub type Result<T> = std::result::Result<T, Error>;
