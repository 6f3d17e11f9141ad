//! Error types for plant-mirror
//!
//! Per-URL fetch and storage failures are absorbed where they happen (logged
//! and turned into `None` results); the variants here cover everything that
//! is allowed to propagate — configuration problems, database failures, and
//! I/O errors outside the acquisition pipeline.

use thiserror::Error;

/// Result type alias for plant-mirror operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for plant-mirror
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The environment variable that caused the error (e.g., "MINIO_PORT")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Network error during an image probe or download
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Object storage backend error (bucket provisioning or object write)
    #[error("storage error: {0}")]
    Storage(String),

    /// Source URL could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Record not found
    #[error("record not found: {0}")]
    NotFound(String),
}
