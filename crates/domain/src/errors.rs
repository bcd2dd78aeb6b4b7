//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for StoreBridge
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum BridgeError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Remote error (HTTP {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Whether the failure is transient and the affected entity should keep
    /// its prior sync status so the next pass retries it.
    ///
    /// Transport failures are transient; a remote rejection or validation
    /// failure is not and the entity is marked `Error` instead.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for StoreBridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;
