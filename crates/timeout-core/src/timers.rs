//! Deferred timers

use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use timeout_api::{ArmedTimer, TimerKind};

/// Pending deferred callbacks, one slot per [`TimerKind`].
///
/// Arming a kind that is already armed replaces its deadline, the same way a
/// cleared-then-reset browser timeout would.
#[derive(Debug, Default, Clone)]
pub struct DeferredTimers {
    slots: BTreeMap<TimerKind, DateTime<Local>>,
}

impl DeferredTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` to fire at `due`, replacing any earlier arming
    pub fn arm(&mut self, kind: TimerKind, due: DateTime<Local>) {
        self.slots.insert(kind, due);
    }

    /// Cancel `kind`, returning whether it was armed
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.slots.remove(&kind).is_some()
    }

    /// Cancel the timers that activity pushes back
    pub fn cancel_inactivity(&mut self) {
        self.slots.retain(|kind, _| !kind.is_inactivity());
    }

    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    pub fn due_at(&self, kind: TimerKind) -> Option<DateTime<Local>> {
        self.slots.get(&kind).copied()
    }

    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slots.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Remove and return the earliest timer due at or before `now`.
    /// Ties go to the lower kind.
    pub fn pop_due(&mut self, now: DateTime<Local>) -> Option<TimerKind> {
        let kind = self
            .slots
            .iter()
            .filter(|(_, due)| **due <= now)
            .min_by_key(|(kind, due)| (**due, **kind))
            .map(|(kind, _)| *kind)?;
        self.slots.remove(&kind);
        Some(kind)
    }

    /// Pending timers ordered by due time
    pub fn armed(&self) -> Vec<ArmedTimer> {
        let mut armed: Vec<ArmedTimer> = self
            .slots
            .iter()
            .map(|(kind, due)| ArmedTimer {
                kind: *kind,
                due: *due,
            })
            .collect();
        armed.sort_by_key(|t| (t.due, t.kind));
        armed
    }
}
