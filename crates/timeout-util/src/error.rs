//! Error types for timeoutd

use thiserror::Error;

/// Core error type for timeoutd operations
#[derive(Debug, Error)]
pub enum TimeoutError {
    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session already ended")]
    SessionEnded,

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

impl TimeoutError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn command(msg: impl Into<String>) -> Self {
        Self::InvalidCommand(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, TimeoutError>;
