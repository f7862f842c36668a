//! In-process store, shared between coordinators through an `Arc`

use chrono::{DateTime, Local};
use std::sync::Mutex;

use crate::{AuditEvent, Store, StoreResult};

/// Store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    last_activity: Mutex<Option<DateTime<Local>>>,
    audit: Mutex<Vec<AuditEvent>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn last_activity(&self) -> StoreResult<Option<DateTime<Local>>> {
        Ok(*self.last_activity.lock()?)
    }

    fn record_activity(&self, at: DateTime<Local>) -> StoreResult<()> {
        let mut last = self.last_activity.lock()?;
        if last.is_none_or(|prev| at > prev) {
            *last = Some(at);
        }
        Ok(())
    }

    fn append_audit(&self, mut event: AuditEvent) -> StoreResult<()> {
        let mut audit = self.audit.lock()?;
        event.id = audit.len() as i64 + 1;
        audit.push(event);
        Ok(())
    }

    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>> {
        let audit = self.audit.lock()?;
        Ok(audit.iter().rev().take(limit).cloned().collect())
    }

    fn is_healthy(&self) -> bool {
        !self.last_activity.is_poisoned() && !self.audit.is_poisoned()
    }
}
