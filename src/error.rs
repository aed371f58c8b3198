//! Error types for the voice controller

use thiserror::Error;

/// Result type alias for voice controller operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the voice controller
#[derive(Debug, Error)]
pub enum Error {
    /// No matching reply arrived before the listening deadline.
    ///
    /// Recovered locally by the session loop; never propagates past it.
    #[error("timed out waiting for a phrase")]
    ListeningTimeout,

    /// Bus transport error (connection lost, channel closed)
    #[error("bus error: {0}")]
    Bus(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
