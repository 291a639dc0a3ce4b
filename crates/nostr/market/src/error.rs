//! Market payload error types

use thiserror::Error;

/// Market payload error type
#[derive(Error, Debug)]
pub enum MarketError {
    /// Payload could not be rendered as event content
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Market payload result type
pub type Result<T> = std::result::Result<T, MarketError>;
