//! Store trait definitions

use chrono::{DateTime, Local};

use crate::{AuditEvent, StoreResult};

/// Storage visible to every tab of the same session
pub trait Store: Send + Sync {
    // Shared activity

    /// Last activity recorded by any tab, if any
    fn last_activity(&self) -> StoreResult<Option<DateTime<Local>>>;

    /// Record activity at `at`. An older timestamp never replaces a newer one.
    fn record_activity(&self, at: DateTime<Local>) -> StoreResult<()>;

    // Audit log

    /// Append an audit event
    fn append_audit(&self, event: AuditEvent) -> StoreResult<()>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}
