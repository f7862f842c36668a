//! Session-timeout coordinator

use chrono::{DateTime, Local};
use std::sync::Arc;
use std::time::Duration;
use timeout_api::{
    DialogKind, SessionSnapshot, SignOutReason, TimeoutState, TimerKind, API_VERSION,
};
use timeout_config::SessionTimings;
use timeout_store::{AuditEvent, AuditEventType, Store};
use timeout_util::{checked_deadline, saturating_until, Result, TabId, TimeoutError};
use tracing::{debug, info, warn};

use crate::{CoreEvent, DeferredTimers, DialogSet};

/// Coordinates the inactivity and expiry deadlines of one tab.
///
/// Deadlines are kept as deferred timers and fired from [`Coordinator::tick`].
/// Inactivity timers consult the shared store before acting, so activity
/// recorded by any tab pushes them back. The expiry pair is fixed at login.
///
/// A deadline past the end of the representable calendar is never armed.
pub struct Coordinator {
    tab_id: TabId,
    timings: SessionTimings,
    logged_in_at: Option<DateTime<Local>>,
    store: Arc<dyn Store>,
    dialogs: DialogSet,
    timers: DeferredTimers,
    ended: Option<SignOutReason>,
}

impl Coordinator {
    pub fn new(
        tab_id: TabId,
        timings: SessionTimings,
        logged_in_at: Option<DateTime<Local>>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            tab_id,
            timings,
            logged_in_at,
            store,
            dialogs: DialogSet::new(),
            timers: DeferredTimers::new(),
            ended: None,
        }
    }

    pub fn tab_id(&self) -> &TabId {
        &self.tab_id
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in_at.is_some()
    }

    pub fn logged_in_at(&self) -> Option<DateTime<Local>> {
        self.logged_in_at
    }

    /// Absolute end of the session
    pub fn session_expires_at(&self) -> Option<DateTime<Local>> {
        self.logged_in_at
            .and_then(|at| checked_deadline(at, self.timings.session_lifetime))
    }

    fn expiry_warning_at(&self) -> Option<DateTime<Local>> {
        self.logged_in_at
            .and_then(|at| checked_deadline(at, self.timings.expiry_warning))
    }

    pub fn state(&self) -> TimeoutState {
        match self.ended {
            Some(SignOutReason::Expired) => TimeoutState::Expired,
            Some(_) => TimeoutState::SignedOut,
            None => match self.dialogs.current() {
                None => TimeoutState::Active,
                Some(DialogKind::InactivityWarning) => TimeoutState::WarningShown,
                Some(DialogKind::InactivityLogout) => TimeoutState::LogoutShown,
                Some(DialogKind::SessionExpiry) => TimeoutState::ExpiryWarningShown,
            },
        }
    }

    pub fn open_dialog(&self) -> Option<DialogKind> {
        self.dialogs.current()
    }

    pub fn timers(&self) -> &DeferredTimers {
        &self.timers
    }

    /// Record the page load as activity and arm the deadlines
    pub fn start(&mut self, now: DateTime<Local>) {
        self.write_activity(now);
        self.audit(
            AuditEventType::TabStarted {
                tab_id: self.tab_id.clone(),
                logged_in_at: self.logged_in_at,
            },
            now,
        );

        if !self.is_logged_in() {
            info!(tab_id = %self.tab_id, "Not logged in, no deadlines armed");
            return;
        }

        match self.session_expires_at() {
            Some(expires_at) => self.timers.arm(TimerKind::ExpiryLogout, expires_at),
            None => warn!(tab_id = %self.tab_id, "Session lifetime out of range, expiry not armed"),
        }
        if let Some(expiry_warning_at) = self.expiry_warning_at()
            && expiry_warning_at > now
        {
            self.timers.arm(TimerKind::ExpiryDialog, expiry_warning_at);
        }
        self.arm_inactivity(now);

        info!(
            tab_id = %self.tab_id,
            expires_at = ?self.session_expires_at(),
            armed = self.timers.armed().len(),
            "Coordinator started"
        );
    }

    /// Fire every timer due at `now`, earliest first.
    ///
    /// A due expiry logout preempts everything else in the same tick.
    pub fn tick(&mut self, now: DateTime<Local>) -> Vec<CoreEvent> {
        let mut events = Vec::new();

        if self.ended.is_some() {
            return events;
        }

        if self
            .timers
            .due_at(TimerKind::ExpiryLogout)
            .is_some_and(|due| due <= now)
        {
            self.timers.cancel(TimerKind::ExpiryLogout);
            self.fire(TimerKind::ExpiryLogout, now, &mut events);
            return events;
        }

        while self.ended.is_none() {
            let Some(kind) = self.timers.pop_due(now) else {
                break;
            };
            self.fire(kind, now, &mut events);
        }

        events
    }

    fn fire(&mut self, kind: TimerKind, now: DateTime<Local>, events: &mut Vec<CoreEvent>) {
        debug!(tab_id = %self.tab_id, timer = ?kind, "Timer fired");

        match kind {
            TimerKind::InactivityWarningDialog => {
                if let Some(until) = self.deferral(self.timings.inactivity_warning, now) {
                    self.defer(kind, until, now, events);
                } else if self.dialogs.current().is_none() {
                    self.show(DialogKind::InactivityWarning, None, now, events);
                }
            }
            TimerKind::InactivityLogoutDialog => {
                if let Some(until) = self.deferral(self.timings.inactivity, now) {
                    self.defer(kind, until, now, events);
                } else if !self.dialogs.is_open(DialogKind::SessionExpiry) {
                    let message = self.session_time_remaining(now).map(time_remaining_message);
                    self.show(DialogKind::InactivityLogout, message, now, events);
                    if let Some(due) = checked_deadline(now, self.timings.logout_grace) {
                        self.timers.arm(TimerKind::InactivityLogout, due);
                    }
                }
            }
            TimerKind::InactivityLogout => {
                self.hide(DialogKind::InactivityLogout, now, events);
                self.sign_out(SignOutReason::Inactive, now, events);
            }
            TimerKind::ExpiryDialog => {
                self.timers.cancel_inactivity();
                self.show(DialogKind::SessionExpiry, None, now, events);
            }
            TimerKind::ExpiryLogout => {
                self.sign_out(SignOutReason::Expired, now, events);
            }
        }
    }

    /// When activity in the store is recent for `window`, the time the
    /// deadline moves to
    fn deferral(&self, window: Duration, now: DateTime<Local>) -> Option<DateTime<Local>> {
        let last = match self.store.last_activity() {
            Ok(last) => last?,
            Err(e) => {
                warn!(tab_id = %self.tab_id, error = %e, "Failed to read last activity");
                return None;
            }
        };

        let until = checked_deadline(last, window)?;
        (until > now).then_some(until)
    }

    fn defer(
        &mut self,
        timer: TimerKind,
        until: DateTime<Local>,
        now: DateTime<Local>,
        events: &mut Vec<CoreEvent>,
    ) {
        self.timers.arm(timer, until);

        debug!(tab_id = %self.tab_id, timer = ?timer, until = %until, "Deadline deferred");

        self.audit(
            AuditEventType::DeadlineDeferred {
                tab_id: self.tab_id.clone(),
                timer,
                until,
            },
            now,
        );

        events.push(CoreEvent::DeadlineDeferred { timer, until });
    }

    fn show(
        &mut self,
        dialog: DialogKind,
        message: Option<String>,
        now: DateTime<Local>,
        events: &mut Vec<CoreEvent>,
    ) {
        if let Some(displaced) = self.dialogs.open(dialog) {
            self.audit_closed(displaced, now);
            events.push(CoreEvent::DialogClosed { dialog: displaced });
        }

        info!(tab_id = %self.tab_id, dialog = ?dialog, "Dialog opened");

        self.audit(
            AuditEventType::DialogOpened {
                tab_id: self.tab_id.clone(),
                dialog,
            },
            now,
        );

        events.push(CoreEvent::DialogOpened { dialog, message });
    }

    fn hide(&mut self, dialog: DialogKind, now: DateTime<Local>, events: &mut Vec<CoreEvent>) {
        if self.dialogs.close(dialog) {
            self.audit_closed(dialog, now);
            events.push(CoreEvent::DialogClosed { dialog });
        }
    }

    fn audit_closed(&self, dialog: DialogKind, now: DateTime<Local>) {
        debug!(tab_id = %self.tab_id, dialog = ?dialog, "Dialog closed");
        self.audit(
            AuditEventType::DialogClosed {
                tab_id: self.tab_id.clone(),
                dialog,
            },
            now,
        );
    }

    fn audit(&self, event: AuditEventType, now: DateTime<Local>) {
        let _ = self.store.append_audit(AuditEvent::new(event, now));
    }

    fn sign_out(&mut self, reason: SignOutReason, now: DateTime<Local>, events: &mut Vec<CoreEvent>) {
        if self.ended.is_some() {
            return;
        }

        self.timers.cancel_all();
        if let Some(dialog) = self.dialogs.close_any() {
            self.audit_closed(dialog, now);
            events.push(CoreEvent::DialogClosed { dialog });
        }
        self.ended = Some(reason);

        info!(tab_id = %self.tab_id, reason = ?reason, "Signing out");

        self.audit(
            AuditEventType::SignedOut {
                tab_id: self.tab_id.clone(),
                reason,
            },
            now,
        );

        events.push(CoreEvent::SignOutDue { reason });
    }

    fn write_activity(&self, now: DateTime<Local>) {
        if let Err(e) = self.store.record_activity(now) {
            warn!(tab_id = %self.tab_id, error = %e, "Failed to record activity");
        }
    }

    /// Arm the two inactivity dialog timers from `now`, unless the expiry
    /// dialog is already due
    fn arm_inactivity(&mut self, now: DateTime<Local>) {
        if !self.is_logged_in() || self.expiry_warning_at().is_some_and(|at| now >= at) {
            return;
        }
        if let Some(due) = checked_deadline(now, self.timings.inactivity_warning) {
            self.timers.arm(TimerKind::InactivityWarningDialog, due);
        }
        if let Some(due) = checked_deadline(now, self.timings.inactivity) {
            self.timers.arm(TimerKind::InactivityLogoutDialog, due);
        }
    }

    /// Restart the inactivity cycle. The expiry timers are left alone.
    fn reset_inactivity(&mut self, now: DateTime<Local>, events: &mut Vec<CoreEvent>) {
        self.timers.cancel_inactivity();
        self.write_activity(now);
        self.arm_inactivity(now);

        debug!(tab_id = %self.tab_id, "Inactivity timers reset");

        self.audit(
            AuditEventType::InactivityReset {
                tab_id: self.tab_id.clone(),
            },
            now,
        );

        events.push(CoreEvent::InactivityReset);
    }

    fn ensure_running(&self) -> Result<()> {
        if self.ended.is_some() {
            return Err(TimeoutError::SessionEnded);
        }
        if !self.is_logged_in() {
            return Err(TimeoutError::NotLoggedIn);
        }
        Ok(())
    }

    fn require_open(&self, dialog: DialogKind) -> Result<()> {
        if self.dialogs.is_open(dialog) {
            Ok(())
        } else {
            Err(TimeoutError::command(format!(
                "{} dialog is not open",
                dialog.element_id()
            )))
        }
    }

    /// "Stay signed in" on the logout dialog
    pub fn stay_signed_in(&mut self, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        self.ensure_running()?;
        self.require_open(DialogKind::InactivityLogout)?;

        let mut events = Vec::new();
        self.hide(DialogKind::InactivityLogout, now, &mut events);
        self.reset_inactivity(now, &mut events);
        Ok(events)
    }

    /// Close button on the inactivity warning dialog
    pub fn close_warning(&mut self, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        self.ensure_running()?;
        self.require_open(DialogKind::InactivityWarning)?;

        let mut events = Vec::new();
        self.hide(DialogKind::InactivityWarning, now, &mut events);
        self.reset_inactivity(now, &mut events);
        Ok(events)
    }

    /// "Ok, continue" on the expiry dialog. Deadlines are unchanged.
    pub fn continue_session(&mut self, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        self.ensure_running()?;
        self.require_open(DialogKind::SessionExpiry)?;

        let mut events = Vec::new();
        self.hide(DialogKind::SessionExpiry, now, &mut events);
        Ok(events)
    }

    /// User-initiated sign-out
    pub fn sign_out_now(&mut self, now: DateTime<Local>) -> Result<Vec<CoreEvent>> {
        self.ensure_running()?;

        let mut events = Vec::new();
        self.sign_out(SignOutReason::UserRequested, now, &mut events);
        Ok(events)
    }

    /// A page request in this tab. Only the shared store is touched; every
    /// tab, this one included, sees it when its next inactivity timer fires.
    pub fn record_activity(&self, now: DateTime<Local>) -> Result<()> {
        if self.ended.is_some() {
            return Err(TimeoutError::SessionEnded);
        }
        self.store
            .record_activity(now)
            .map_err(|e| TimeoutError::store(e.to_string()))
    }

    /// Disarm everything when the runtime shuts down
    pub fn stop(&mut self, now: DateTime<Local>) {
        self.timers.cancel_all();
        self.audit(
            AuditEventType::TabStopped {
                tab_id: self.tab_id.clone(),
            },
            now,
        );
        info!(tab_id = %self.tab_id, "Coordinator stopped");
    }

    /// Time left until the absolute end of the session
    pub fn session_time_remaining(&self, now: DateTime<Local>) -> Option<Duration> {
        self.session_expires_at()
            .map(|expires_at| saturating_until(expires_at, now))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            api_version: API_VERSION,
            tab_id: self.tab_id.clone(),
            state: self.state(),
            open_dialog: self.dialogs.current(),
            logged_in_at: self.logged_in_at,
            session_expires_at: self.session_expires_at(),
            last_activity: self.store.last_activity().ok().flatten(),
            timers: self.timers.armed(),
        }
    }
}

/// Text shown on the logout dialog for the time left in the session
pub fn time_remaining_message(remaining: Duration) -> String {
    match remaining.as_secs() / 60 {
        0 => "You have less than a minute remaining in your session.".to_string(),
        1 => "You have 1 minute remaining in your session.".to_string(),
        mins => format!("You have {mins} minutes remaining in your session."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use timeout_store::MemoryStore;

    fn login() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 12, 25, 9, 0, 0).unwrap()
    }

    fn at_mins(mins: i64) -> DateTime<Local> {
        login() + chrono::Duration::minutes(mins)
    }

    fn tab(store: &Arc<MemoryStore>) -> Coordinator {
        let store: Arc<dyn Store> = store.clone();
        let mut coordinator = Coordinator::new(
            TabId::new(),
            SessionTimings::default(),
            Some(login()),
            store,
        );
        coordinator.start(login());
        coordinator
    }

    fn opened(events: &[CoreEvent]) -> Vec<DialogKind> {
        events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::DialogOpened { dialog, .. } => Some(*dialog),
                _ => None,
            })
            .collect()
    }

    fn sign_outs(events: &[CoreEvent]) -> Vec<SignOutReason> {
        events
            .iter()
            .filter_map(|e| match e {
                CoreEvent::SignOutDue { reason } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn start_arms_all_deadlines() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = tab(&store);
        let timers = coordinator.timers();

        assert_eq!(timers.due_at(TimerKind::InactivityWarningDialog), Some(at_mins(20)));
        assert_eq!(timers.due_at(TimerKind::InactivityLogoutDialog), Some(at_mins(28)));
        assert_eq!(timers.due_at(TimerKind::ExpiryDialog), Some(at_mins(358)));
        assert_eq!(timers.due_at(TimerKind::ExpiryLogout), Some(at_mins(360)));
        assert!(!timers.is_armed(TimerKind::InactivityLogout));
        assert_eq!(store.last_activity().unwrap(), Some(login()));
        assert_eq!(coordinator.state(), TimeoutState::Active);
    }

    #[test]
    fn not_logged_in_arms_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator =
            Coordinator::new(TabId::new(), SessionTimings::default(), None, store.clone());
        coordinator.start(login());

        assert!(coordinator.timers().is_empty());
        assert!(coordinator.tick(at_mins(1000)).is_empty());
        assert_eq!(store.last_activity().unwrap(), Some(login()));
        assert!(matches!(
            coordinator.sign_out_now(login()),
            Err(TimeoutError::NotLoggedIn)
        ));
    }

    #[test]
    fn page_loaded_after_expiry_warning_only_arms_expiry_logout() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = Coordinator::new(
            TabId::new(),
            SessionTimings::default(),
            Some(login()),
            store,
        );
        coordinator.start(at_mins(359));

        let kinds: Vec<TimerKind> = coordinator.timers().armed().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TimerKind::ExpiryLogout]);
    }

    #[test]
    fn warning_opens_within_one_tick_of_deadline() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);
        let step = chrono::Duration::milliseconds(250);
        let deadline = at_mins(20);

        let mut now = login();
        let opened_at = loop {
            let events = coordinator.tick(now);
            if opened(&events).contains(&DialogKind::InactivityWarning) {
                break now;
            }
            assert!(now < deadline + step, "warning never opened");
            now += step;
        };

        assert!(opened_at >= deadline);
        assert!(opened_at < deadline + step);
        assert_eq!(coordinator.state(), TimeoutState::WarningShown);
    }

    #[test]
    fn activity_in_other_tab_suppresses_warning() {
        let store = Arc::new(MemoryStore::new());
        let tab_a = tab(&store);
        let mut tab_b = tab(&store);

        tab_a.record_activity(at_mins(10)).unwrap();

        let events = tab_b.tick(at_mins(20));
        assert!(opened(&events).is_empty());
        assert_eq!(
            events,
            vec![CoreEvent::DeadlineDeferred {
                timer: TimerKind::InactivityWarningDialog,
                until: at_mins(30),
            }]
        );

        // Logout dialog timer is deferred too.
        let events = tab_b.tick(at_mins(28));
        assert_eq!(
            events,
            vec![CoreEvent::DeadlineDeferred {
                timer: TimerKind::InactivityLogoutDialog,
                until: at_mins(38),
            }]
        );

        assert!(tab_b.tick(at_mins(29)).is_empty());

        let events = tab_b.tick(at_mins(30));
        assert_eq!(opened(&events), vec![DialogKind::InactivityWarning]);
    }

    #[test]
    fn logout_dialog_replaces_warning_and_carries_message() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        coordinator.tick(at_mins(20));
        let events = coordinator.tick(at_mins(28));

        assert_eq!(
            events,
            vec![
                CoreEvent::DialogClosed {
                    dialog: DialogKind::InactivityWarning
                },
                CoreEvent::DialogOpened {
                    dialog: DialogKind::InactivityLogout,
                    message: Some("You have 332 minutes remaining in your session.".into()),
                },
            ]
        );
        assert_eq!(
            coordinator.timers().due_at(TimerKind::InactivityLogout),
            Some(at_mins(30))
        );
    }

    #[test]
    fn unanswered_logout_dialog_signs_out_inactive() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        coordinator.tick(at_mins(28));
        let events = coordinator.tick(at_mins(30));

        assert_eq!(
            events,
            vec![
                CoreEvent::DialogClosed {
                    dialog: DialogKind::InactivityLogout
                },
                CoreEvent::SignOutDue {
                    reason: SignOutReason::Inactive
                },
            ]
        );
        assert_eq!(coordinator.state(), TimeoutState::SignedOut);
        assert!(coordinator.timers().is_empty());
        assert!(coordinator.tick(at_mins(400)).is_empty());
    }

    #[test]
    fn stay_signed_in_restarts_cycle_keeping_expiry() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        coordinator.tick(at_mins(28));
        assert_eq!(coordinator.state(), TimeoutState::LogoutShown);

        let events = coordinator.stay_signed_in(at_mins(29)).unwrap();
        assert_eq!(
            events,
            vec![
                CoreEvent::DialogClosed {
                    dialog: DialogKind::InactivityLogout
                },
                CoreEvent::InactivityReset,
            ]
        );

        let timers = coordinator.timers();
        assert!(!timers.is_armed(TimerKind::InactivityLogout));
        assert_eq!(timers.due_at(TimerKind::InactivityWarningDialog), Some(at_mins(49)));
        assert_eq!(timers.due_at(TimerKind::InactivityLogoutDialog), Some(at_mins(57)));
        assert_eq!(timers.due_at(TimerKind::ExpiryDialog), Some(at_mins(358)));
        assert_eq!(timers.due_at(TimerKind::ExpiryLogout), Some(at_mins(360)));
        assert_eq!(store.last_activity().unwrap(), Some(at_mins(29)));

        // The grace period no longer applies.
        assert!(coordinator.tick(at_mins(31)).is_empty());
        assert_eq!(coordinator.state(), TimeoutState::Active);
    }

    #[test]
    fn close_warning_resets_inactivity() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        assert!(coordinator.close_warning(at_mins(5)).is_err());

        coordinator.tick(at_mins(20));
        coordinator.close_warning(at_mins(21)).unwrap();

        assert_eq!(coordinator.open_dialog(), None);
        assert_eq!(
            coordinator.timers().due_at(TimerKind::InactivityLogoutDialog),
            Some(at_mins(49))
        );
    }

    #[test]
    fn expiry_dialog_cancels_inactivity_and_continue_keeps_deadline() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        // Keep the inactivity dialogs away until the expiry warning.
        for mins in (10..358).step_by(10) {
            store.record_activity(at_mins(mins)).unwrap();
            coordinator.tick(at_mins(mins));
        }
        assert_eq!(coordinator.open_dialog(), None);

        let events = coordinator.tick(at_mins(358));
        assert_eq!(opened(&events), vec![DialogKind::SessionExpiry]);
        let kinds: Vec<TimerKind> = coordinator.timers().armed().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TimerKind::ExpiryLogout]);

        coordinator.continue_session(at_mins(359)).unwrap();
        assert_eq!(coordinator.state(), TimeoutState::Active);
        assert_eq!(
            coordinator.timers().due_at(TimerKind::ExpiryLogout),
            Some(at_mins(360))
        );
    }

    #[test]
    fn expiry_closes_dialogs_and_signs_out_once() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        coordinator.tick(at_mins(358));
        assert_eq!(coordinator.open_dialog(), Some(DialogKind::SessionExpiry));

        let events = coordinator.tick(at_mins(360));
        assert_eq!(
            events,
            vec![
                CoreEvent::DialogClosed {
                    dialog: DialogKind::SessionExpiry
                },
                CoreEvent::SignOutDue {
                    reason: SignOutReason::Expired
                },
            ]
        );
        assert_eq!(coordinator.state(), TimeoutState::Expired);
        assert!(coordinator.tick(at_mins(361)).is_empty());
        assert!(matches!(
            coordinator.stay_signed_in(at_mins(361)),
            Err(TimeoutError::SessionEnded)
        ));
    }

    #[test]
    fn expiry_preempts_other_due_timers() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        // Everything is due at once, e.g. after the host slept.
        let events = coordinator.tick(at_mins(500));

        assert!(opened(&events).is_empty());
        assert_eq!(sign_outs(&events), vec![SignOutReason::Expired]);
        assert_eq!(coordinator.state(), TimeoutState::Expired);
    }

    #[test]
    fn sign_out_now_has_no_status_and_ends_session() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);

        coordinator.tick(at_mins(28));
        let events = coordinator.sign_out_now(at_mins(28)).unwrap();

        assert_eq!(sign_outs(&events), vec![SignOutReason::UserRequested]);
        assert_eq!(coordinator.state(), TimeoutState::SignedOut);
        assert!(coordinator.record_activity(at_mins(29)).is_err());

        let audits = store.get_recent_audits(1).unwrap();
        assert!(matches!(
            audits[0].event,
            AuditEventType::SignedOut {
                reason: SignOutReason::UserRequested,
                ..
            }
        ));
    }

    #[test]
    fn snapshot_reports_state() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);
        coordinator.tick(at_mins(20));

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.state, TimeoutState::WarningShown);
        assert_eq!(snapshot.open_dialog, Some(DialogKind::InactivityWarning));
        assert_eq!(snapshot.session_expires_at, Some(at_mins(360)));
        assert_eq!(snapshot.last_activity, Some(login()));
        assert_eq!(snapshot.timers[0].kind, TimerKind::InactivityLogoutDialog);
    }

    #[test]
    fn audits_carry_the_given_time() {
        let store = Arc::new(MemoryStore::new());
        let mut coordinator = tab(&store);
        coordinator.tick(at_mins(20));
        coordinator.stop(at_mins(21));

        let audits = store.get_recent_audits(10).unwrap();
        assert!(matches!(audits[0].event, AuditEventType::TabStopped { .. }));
        assert_eq!(audits[0].timestamp, at_mins(21));
        assert!(matches!(audits[1].event, AuditEventType::DialogOpened { .. }));
        assert_eq!(audits[1].timestamp, at_mins(20));
        let first = audits.last().unwrap();
        assert!(matches!(first.event, AuditEventType::TabStarted { .. }));
        assert_eq!(first.timestamp, login());
    }

    #[test]
    fn lifetime_past_the_calendar_is_not_armed() {
        for session_lifetime in [Duration::from_secs(10_000_000_000_000), Duration::MAX] {
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            let timings = SessionTimings {
                session_lifetime,
                ..Default::default()
            };
            let mut coordinator = Coordinator::new(TabId::new(), timings, Some(login()), store);
            coordinator.start(login());

            assert_eq!(coordinator.session_expires_at(), None);
            assert!(!coordinator.timers().is_armed(TimerKind::ExpiryLogout));
            assert_eq!(
                coordinator.timers().due_at(TimerKind::InactivityWarningDialog),
                Some(at_mins(20))
            );
            assert_eq!(
                opened(&coordinator.tick(at_mins(20))),
                vec![DialogKind::InactivityWarning]
            );
        }
    }

    fn mins(value: f64) -> chrono::Duration {
        chrono::Duration::from_std(timeout_config::minutes_to_duration(value)).unwrap()
    }

    /// (warning, logout dialog, grace, expiry dialog, lifetime), all minutes
    const TUPLES: [(f64, f64, f64, f64, f64); 5] = [
        (20.0, 28.0, 2.0, 358.0, 360.0),
        (1.0, 2.0, 0.5, 5.0, 6.0),
        (0.1, 0.2, 0.05, 0.5, 1.0),
        (0.25, 0.75, 0.3, 1.5, 2.0),
        (5.0, 10.0, 1.0, 12.0, 12.5),
    ];

    fn timings_from(tuple: (f64, f64, f64, f64, f64)) -> SessionTimings {
        let (w, i, g, e, s) = tuple;
        let timings = SessionTimings {
            inactivity_warning: timeout_config::minutes_to_duration(w),
            inactivity: timeout_config::minutes_to_duration(i),
            logout_grace: timeout_config::minutes_to_duration(g),
            expiry_warning: timeout_config::minutes_to_duration(e),
            session_lifetime: timeout_config::minutes_to_duration(s),
        };
        assert!(timings.is_ordered(), "{:?}", tuple);
        timings
    }

    #[test]
    fn idle_tab_follows_every_ordered_tuple() {
        let step = chrono::Duration::milliseconds(250);

        for tuple in TUPLES {
            let (w, i, g, _, s) = tuple;
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            let mut coordinator =
                Coordinator::new(TabId::new(), timings_from(tuple), Some(login()), store);
            coordinator.start(login());

            let mut warning_at = None;
            let mut logout_at = None;
            let mut signed_out = None;
            let mut now = login();
            while signed_out.is_none() && now <= login() + mins(s) + step {
                let events = coordinator.tick(now);
                for dialog in opened(&events) {
                    match dialog {
                        DialogKind::InactivityWarning => warning_at = warning_at.or(Some(now)),
                        DialogKind::InactivityLogout => logout_at = logout_at.or(Some(now)),
                        DialogKind::SessionExpiry => {}
                    }
                }
                if let Some(reason) = sign_outs(&events).first() {
                    signed_out = Some((now, *reason));
                }
                now += step;
            }

            let within =
                |at: Option<DateTime<Local>>, deadline: DateTime<Local>, slack: chrono::Duration| {
                    at.is_some_and(|at| at >= deadline && at < deadline + slack)
                };
            assert!(within(warning_at, login() + mins(w), step), "{:?}", tuple);
            assert!(within(logout_at, login() + mins(i), step), "{:?}", tuple);
            let (at, reason) = signed_out.unwrap();
            assert_eq!(reason, SignOutReason::Inactive, "{:?}", tuple);
            assert!(within(Some(at), login() + mins(i) + mins(g), step * 2), "{:?}", tuple);
            assert_eq!(coordinator.state(), TimeoutState::SignedOut);
        }
    }

    #[test]
    fn busy_tab_expires_on_every_ordered_tuple() {
        let step = chrono::Duration::milliseconds(250);

        for tuple in TUPLES {
            let (_, _, _, e, s) = tuple;
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            let mut coordinator =
                Coordinator::new(TabId::new(), timings_from(tuple), Some(login()), store);
            coordinator.start(login());

            let mut expiry_dialog_at = None;
            let mut signed_out = None;
            let mut now = login();
            while signed_out.is_none() && now <= login() + mins(s) + step {
                coordinator.record_activity(now).unwrap();
                let events = coordinator.tick(now);
                let dialogs = opened(&events);
                assert!(!dialogs.contains(&DialogKind::InactivityWarning), "{:?}", tuple);
                assert!(!dialogs.contains(&DialogKind::InactivityLogout), "{:?}", tuple);
                if dialogs.contains(&DialogKind::SessionExpiry) {
                    expiry_dialog_at = expiry_dialog_at.or(Some(now));
                }
                if let Some(reason) = sign_outs(&events).first() {
                    signed_out = Some((now, *reason));
                }
                now += step;
            }

            let expiry_dialog_at = expiry_dialog_at.unwrap();
            assert!(expiry_dialog_at >= login() + mins(e), "{:?}", tuple);
            assert!(expiry_dialog_at < login() + mins(e) + step, "{:?}", tuple);
            assert_eq!(
                signed_out,
                Some((login() + mins(s), SignOutReason::Expired)),
                "{:?}",
                tuple
            );
        }
    }

    #[test]
    fn time_remaining_wording() {
        assert_eq!(
            time_remaining_message(Duration::from_secs(59)),
            "You have less than a minute remaining in your session."
        );
        assert_eq!(
            time_remaining_message(Duration::from_secs(119)),
            "You have 1 minute remaining in your session."
        );
        assert_eq!(
            time_remaining_message(Duration::from_secs(330)),
            "You have 5 minutes remaining in your session."
        );
    }
}
