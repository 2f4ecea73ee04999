//! Error types for harvest-world

use thiserror::Error;

/// Result type for harvest-world operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in harvest-world
#[derive(Debug, Error)]
pub enum Error {
    /// Core error
    #[error("core error: {0}")]
    Core(#[from] harvest_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// Configuration value out of range
    #[error("invalid config: {0}")]
    Config(String),
}

impl Error {
    /// The core error, if this wraps one
    pub fn as_core(&self) -> Option<&harvest_core::Error> {
        match self {
            Error::Core(err) => Some(err),
            _ => None,
        }
    }
}

// Compile-time check that Error is Send + Sync for thread-safe error propagation.
fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
