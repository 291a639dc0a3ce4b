//! Publisher error types

use thiserror::Error;

/// Publisher error type
#[derive(Error, Debug)]
pub enum PublisherError {
    /// Invalid relay URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// URL parse error
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Config(String),
}

/// Errors reported by a relay collaborator while connecting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Connection not established before the deadline
    #[error("Timeout error: {0}")]
    Timeout(String),
}

/// Publisher result type
pub type Result<T> = std::result::Result<T, PublisherError>;
