//! Error types for vloop-player
//!
//! Defines module-specific error types using thiserror for clear error propagation.

use thiserror::Error;

/// Main error type for the vloop-player library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid player configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The scheduler task is no longer running
    #[error("Player is shut down: {0}")]
    Shutdown(String),
}

/// Convenience Result type using the vloop-player Error
pub type Result<T> = std::result::Result<T, Error>;
