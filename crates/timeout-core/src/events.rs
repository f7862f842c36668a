//! Core events emitted by the coordinator

use chrono::{DateTime, Local};
use timeout_api::{DialogKind, SignOutReason, TimerKind};

/// Events emitted by the coordinator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    /// Dialog shown modally
    DialogOpened {
        dialog: DialogKind,
        message: Option<String>,
    },

    /// Dialog closed
    DialogClosed { dialog: DialogKind },

    /// Recent activity in the shared store pushed an inactivity deadline back
    DeadlineDeferred {
        timer: TimerKind,
        until: DateTime<Local>,
    },

    /// User acknowledged a dialog; inactivity timers restarted
    InactivityReset,

    /// The runtime must invalidate the server session and redirect
    SignOutDue { reason: SignOutReason },
}
