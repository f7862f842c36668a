//! Event types streamed from a tab coordinator to its consumer

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{DialogKind, Response, SessionSnapshot, SignOutReason, TimerKind, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload, timestamp: DateTime<Local>) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp,
            payload,
        }
    }
}

/// All possible events from the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Full state snapshot (sent on start and after each transition)
    StateChanged(SessionSnapshot),

    /// A dialog was shown modally
    DialogOpened {
        dialog: DialogKind,
        message: Option<String>,
    },

    /// A dialog was closed
    DialogClosed { dialog: DialogKind },

    /// Activity in another tab pushed an inactivity deadline back
    DeadlineDeferred {
        timer: TimerKind,
        until: DateTime<Local>,
    },

    /// Sign-out started
    SigningOut { reason: SignOutReason },

    /// The sign-out request failed; the redirect still follows
    SignOutFailed { error: String },

    /// Navigate to this location
    Redirect { location: String },

    /// Coordinator is shutting down
    Shutdown,
}

/// One line on the outbound stream
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    Response(Response),
    Event(Event),
}
