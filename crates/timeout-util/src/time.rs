//! Time utilities for timeoutd
//!
//! All deadlines are wall-clock: the login timestamp comes from the server and
//! the last-activity timestamp is shared between tabs, so a process-local
//! monotonic clock cannot be compared against either.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `TIMEOUT_MOCK_TIME` environment variable can be set
//! to override the system time. Mock time advances at the real rate from the
//! given starting point.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::OnceLock;
use std::time::Duration;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "TIMEOUT_MOCK_TIME";

/// Format accepted by [`MOCK_TIME_ENV_VAR`]
pub const MOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Local::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            let mock_time_str = std::env::var(MOCK_TIME_ENV_VAR).ok()?;
            match parse_mock_time(&mock_time_str) {
                Some(mock_dt) => {
                    let offset = mock_dt.signed_duration_since(chrono::Local::now());
                    tracing::info!(
                        mock_time = %mock_time_str,
                        offset_secs = offset.num_seconds(),
                        "Mock time enabled"
                    );
                    Some(offset)
                }
                None => {
                    tracing::warn!(
                        mock_time = %mock_time_str,
                        expected_format = MOCK_TIME_FORMAT,
                        "Invalid mock time"
                    );
                    None
                }
            }
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

#[cfg_attr(not(debug_assertions), allow(dead_code))]
fn parse_mock_time(s: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(s, MOCK_TIME_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single()
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current local time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Local> {
    let real_now = chrono::Local::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// `at + d`, or `None` when the result falls outside chrono's calendar
pub fn checked_deadline(at: DateTime<Local>, d: Duration) -> Option<DateTime<Local>> {
    at.checked_add_signed(chrono::Duration::from_std(d).ok()?)
}

/// Duration from `now` until `later`, or zero if `later` has passed
pub fn saturating_until(later: DateTime<Local>, now: DateTime<Local>) -> Duration {
    later
        .signed_duration_since(now)
        .to_std()
        .unwrap_or(Duration::ZERO)
}

/// Helper to format durations in human-readable form
pub fn format_duration(d: Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
