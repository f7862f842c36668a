//! Shared activity store for timeoutd
//!
//! Provides:
//! - The single "last activity" timestamp every tab reads and writes
//! - Audit log (append-only)
//!
//! Two implementations: [`SqliteStore`] for tabs running as separate
//! processes against one database file, and [`MemoryStore`] for tabs sharing
//! an `Arc` inside one process.

mod audit;
mod memory;
mod sqlite;
mod traits;

pub use audit::*;
pub use memory::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
