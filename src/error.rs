//! Error types for Coachkit
//!
//! This module defines the error types raised at the crate's internal seams
//! (configuration, remote providers, stores), using `thiserror` for ergonomic
//! error handling. The public engine operations never surface these to the
//! hosting UI; they degrade to their local fallbacks instead.

use thiserror::Error;

/// Main error type for Coachkit operations
#[derive(Error, Debug)]
pub enum CoachError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote generation provider errors (transport, status, decoding)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Remote content provider errors (jokes, images)
    #[error("Content provider error: {0}")]
    Content(String),

    /// Session lifecycle errors (malformed record, missing session)
    #[error("Session error: {0}")]
    Session(String),

    /// Persistent store errors (sled, sqlite)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Terminal host command errors
    #[error("Command error: {0}")]
    Command(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Coachkit operations
///
/// Uses `anyhow::Error` so that callers can attach context while the
/// underlying [`CoachError`] stays downcastable.
pub type Result<T> = anyhow::Result<T>;
