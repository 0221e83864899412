//! # Error Types
//!
//! Custom error types for GS Link using `thiserror`.

use thiserror::Error;

/// Main error type for GS Link
#[derive(Debug, Error)]
pub enum GsLinkError {
    /// wfb-ng stats protocol errors (framing violations)
    #[error("stats protocol error: {0}")]
    StatsProtocol(String),

    /// msgpack decode errors on individual stats frames
    #[error("stats decode error: {0}")]
    StatsDecode(#[from] rmp_serde::decode::Error),

    /// Errors from forwarding requests to the remote peer
    #[error("forward error: {0}")]
    Forward(#[from] reqwest::Error),

    /// Service restart errors
    #[error("service control error: {0}")]
    ServiceControl(String),

    /// Radio settings (de)serialization errors
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for GS Link
pub type Result<T> = std::result::Result<T, GsLinkError>;
