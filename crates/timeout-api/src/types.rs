//! Shared types for the timeoutd API

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use timeout_util::TabId;

/// The three dialogs a tab can show. At most one is open at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// Soft notice after `inactivity_warning_mins` without activity
    InactivityWarning,
    /// "Stay signed in" prompt after `inactivity_mins`; signs out when ignored
    InactivityLogout,
    /// Notice that the absolute session lifetime is about to end
    SessionExpiry,
}

impl DialogKind {
    /// Element id of the dialog in the server-rendered page
    pub fn element_id(&self) -> &'static str {
        match self {
            DialogKind::InactivityWarning => "activity-warning",
            DialogKind::InactivityLogout => "activity",
            DialogKind::SessionExpiry => "expiry",
        }
    }
}

/// Coordinator state for one tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutState {
    Active,
    WarningShown,
    LogoutShown,
    ExpiryWarningShown,
    /// Signed out for inactivity or by the user
    SignedOut,
    /// Absolute session lifetime reached
    Expired,
}

impl TimeoutState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TimeoutState::SignedOut | TimeoutState::Expired)
    }
}

/// Why the tab is signing out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// Logout dialog went unanswered
    Inactive,
    /// Absolute session lifetime reached
    Expired,
    /// "Sign out now" clicked
    UserRequested,
}

impl SignOutReason {
    /// Value of the `status` query parameter on the sign-in redirect
    pub fn status_flag(&self) -> Option<&'static str> {
        match self {
            SignOutReason::Inactive => Some("inactive"),
            SignOutReason::Expired => Some("expired"),
            SignOutReason::UserRequested => None,
        }
    }
}

/// Deferred callbacks a tab can have pending. One slot per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Opens the inactivity warning dialog
    InactivityWarningDialog,
    /// Opens the inactivity logout dialog
    InactivityLogoutDialog,
    /// Signs out when the logout dialog is left unanswered
    InactivityLogout,
    /// Opens the session expiry dialog
    ExpiryDialog,
    /// Signs out at the absolute session lifetime
    ExpiryLogout,
}

impl TimerKind {
    /// Timers pushed back by activity; the expiry pair never is
    pub fn is_inactivity(&self) -> bool {
        matches!(
            self,
            TimerKind::InactivityWarningDialog
                | TimerKind::InactivityLogoutDialog
                | TimerKind::InactivityLogout
        )
    }
}

/// A pending deferred callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArmedTimer {
    pub kind: TimerKind,
    pub due: DateTime<Local>,
}

/// Full snapshot of one tab
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub api_version: u32,
    pub tab_id: TabId,
    pub state: TimeoutState,
    pub open_dialog: Option<DialogKind>,
    pub logged_in_at: Option<DateTime<Local>>,
    pub session_expires_at: Option<DateTime<Local>>,
    pub last_activity: Option<DateTime<Local>>,
    /// Pending timers ordered by due time
    #[serde(default)]
    pub timers: Vec<ArmedTimer>,
}

/// Health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub live: bool,
    pub logged_in: bool,
    pub store_ok: bool,
}
