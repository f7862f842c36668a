//! Validated policy structures

use crate::schema::{RawConfig, RawServiceConfig, RawSessionConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Validated configuration ready for use by the coordinator and runtime
#[derive(Debug, Clone, Default)]
pub struct TimeoutPolicy {
    pub service: ServiceConfig,
    pub timings: SessionTimings,
}

impl TimeoutPolicy {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            service: ServiceConfig::from_raw(raw.service),
            timings: SessionTimings::from_raw(&raw.session),
        }
    }
}

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    pub sign_out_path: String,
    pub sign_in_path: String,
    pub data_dir: PathBuf,
    pub tick_interval: Duration,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        let defaults = Self::default();
        Self {
            base_url: raw.base_url.unwrap_or(defaults.base_url),
            sign_out_path: raw.sign_out_path.unwrap_or(defaults.sign_out_path),
            sign_in_path: raw.sign_in_path.unwrap_or(defaults.sign_in_path),
            data_dir: raw.data_dir.unwrap_or(defaults.data_dir),
            tick_interval: raw
                .tick_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            request_timeout: raw
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6012".into(),
            sign_out_path: "/sign-out".into(),
            sign_in_path: "/sign-in".into(),
            data_dir: timeout_util::default_data_dir(),
            tick_interval: Duration::from_millis(250),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// The nested deadlines of a session.
///
/// Invariant after validation:
/// `inactivity_warning < inactivity < expiry_warning < session_lifetime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimings {
    /// Inactivity before the soft warning dialog
    pub inactivity_warning: Duration,
    /// Inactivity before the logout dialog
    pub inactivity: Duration,
    /// How long the logout dialog waits for an answer
    pub logout_grace: Duration,
    /// Time after login before the expiry dialog
    pub expiry_warning: Duration,
    /// Absolute session lifetime after login
    pub session_lifetime: Duration,
}

/// Longest accepted session timing. Every deadline is an offset from login
/// or from the last activity, so this keeps them well inside the calendar.
pub const MAX_SESSION_DURATION: Duration = Duration::from_secs(366 * 24 * 60 * 60);

impl SessionTimings {
    pub(crate) fn from_raw(raw: &RawSessionConfig) -> Self {
        let defaults = Self::default();
        Self {
            inactivity_warning: raw
                .inactivity_warning_mins
                .map(minutes_to_duration)
                .unwrap_or(defaults.inactivity_warning),
            inactivity: raw
                .inactivity_mins
                .map(minutes_to_duration)
                .unwrap_or(defaults.inactivity),
            logout_grace: raw
                .inactivity_warning_duration
                .map(minutes_to_duration)
                .unwrap_or(defaults.logout_grace),
            expiry_warning: raw
                .expiry_warning_mins
                .map(minutes_to_duration)
                .unwrap_or(defaults.expiry_warning),
            session_lifetime: raw
                .permanent_session_lifetime
                .map(seconds_to_duration)
                .unwrap_or(defaults.session_lifetime),
        }
    }

    /// Check the ordering invariant
    pub fn is_ordered(&self) -> bool {
        self.inactivity_warning < self.inactivity
            && self.inactivity < self.expiry_warning
            && self.expiry_warning < self.session_lifetime
            && !self.logout_grace.is_zero()
    }
}

impl Default for SessionTimings {
    fn default() -> Self {
        Self {
            inactivity_warning: Duration::from_secs(20 * 60),
            inactivity: Duration::from_secs(28 * 60),
            logout_grace: Duration::from_secs(2 * 60),
            expiry_warning: Duration::from_secs((5 * 60 + 58) * 60),
            session_lifetime: Duration::from_secs(6 * 60 * 60),
        }
    }
}

/// Convert fractional minutes to a duration, rounded to the millisecond
pub fn minutes_to_duration(mins: f64) -> Duration {
    Duration::from_millis((mins * 60_000.0).round() as u64)
}

/// Convert fractional seconds to a duration, rounded to the millisecond
pub fn seconds_to_duration(secs: f64) -> Duration {
    Duration::from_millis((secs * 1000.0).round() as u64)
}
