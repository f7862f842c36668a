//! Host traits

use async_trait::async_trait;
use timeout_api::SignOutReason;
use thiserror::Error;

/// Errors from host operations
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type HostResult<T> = Result<T, HostError>;

/// The server side of a session
#[async_trait]
pub trait SessionHost: Send + Sync {
    /// Invalidate the server session. Called once, before the redirect.
    async fn sign_out(&self) -> HostResult<()>;

    /// Sign-in page to send the tab to, carrying `next` and the status flag
    /// for `reason`
    fn sign_in_location(&self, next: &str, reason: SignOutReason) -> HostResult<String>;
}
