use crate::core::dates::DateParseError;
use reqwest::StatusCode;

/// Custom Error and Result types to unify errors from all sources.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("Failed to fetch {feed} (HTTP {status})")]
    Fetch { feed: String, status: StatusCode },
    #[error("HTTP Error: {0}")]
    Http(String),
    #[error("Parse Error: {0}")]
    Parse(String),
    #[error("Cache Read Error: {0}")]
    CacheRead(String),
    #[error("Storage Error: {0}")]
    Storage(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Install Error: could not cache {url}. {reason}")]
    Install { url: String, reason: String },
    #[error("Template Error: {0}")]
    Template(String),
    #[error("Date Error: {0}")]
    DateParse(#[from] DateParseError),
}

impl From<reqwest::Error> for BoardError {
    fn from(error: reqwest::Error) -> Self {
        BoardError::Http(error.to_string())
    }
}

impl From<std::io::Error> for BoardError {
    fn from(error: std::io::Error) -> Self {
        BoardError::Storage(error.to_string())
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(error: serde_json::Error) -> Self {
        BoardError::CacheRead(error.to_string())
    }
}

impl From<figment::Error> for BoardError {
    fn from(error: figment::Error) -> Self {
        BoardError::Config(error.to_string())
    }
}

impl From<minijinja::Error> for BoardError {
    fn from(error: minijinja::Error) -> Self {
        BoardError::Template(error.to_string())
    }
}
