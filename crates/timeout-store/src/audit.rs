//! Audit event types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use timeout_api::{DialogKind, SignOutReason, TimerKind};
use timeout_util::TabId;

/// Types of audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Coordinator started in a tab
    TabStarted {
        tab_id: TabId,
        logged_in_at: Option<DateTime<Local>>,
    },

    /// Coordinator stopped
    TabStopped { tab_id: TabId },

    /// Dialog shown
    DialogOpened { tab_id: TabId, dialog: DialogKind },

    /// Dialog closed
    DialogClosed { tab_id: TabId, dialog: DialogKind },

    /// Inactivity deadline pushed back by activity elsewhere
    DeadlineDeferred {
        tab_id: TabId,
        timer: TimerKind,
        until: DateTime<Local>,
    },

    /// User acknowledged a dialog and the inactivity cycle restarted
    InactivityReset { tab_id: TabId },

    /// Sign-out initiated
    SignedOut {
        tab_id: TabId,
        reason: SignOutReason,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Local>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType, timestamp: DateTime<Local>) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp,
            event,
        }
    }
}
