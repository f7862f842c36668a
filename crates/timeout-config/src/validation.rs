//! Configuration validation

use crate::policy::{MAX_SESSION_DURATION, SessionTimings};
use crate::schema::{RawConfig, RawServiceConfig, RawSessionConfig};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("'{field}' must be a positive, finite number (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("'{field}' is below one millisecond (got {value})")]
    RoundsToZero { field: &'static str, value: f64 },

    #[error("'{field}' is longer than {max_days} days (got {value})")]
    TooLong {
        field: &'static str,
        value: f64,
        max_days: u64,
    },

    #[error("'{earlier}' must be shorter than '{later}'")]
    OutOfOrder {
        earlier: &'static str,
        later: &'static str,
    },

    #[error("'{field}' must start with http:// or https:// (got '{value}')")]
    InvalidBaseUrl { field: &'static str, value: String },

    #[error("'{field}' must be an absolute path starting with '/' (got '{value}')")]
    InvalidPath { field: &'static str, value: String },

    #[error("'{field}' must be greater than zero")]
    ZeroInterval { field: &'static str },
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = validate_session(&config.session);
    errors.extend(validate_service(&config.service));
    errors
}

fn validate_session(session: &RawSessionConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let fields = [
        ("inactivity_warning_mins", session.inactivity_warning_mins),
        ("inactivity_mins", session.inactivity_mins),
        ("inactivity_warning_duration", session.inactivity_warning_duration),
        ("expiry_warning_mins", session.expiry_warning_mins),
        ("permanent_session_lifetime", session.permanent_session_lifetime),
    ];
    for (field, value) in fields {
        if let Some(value) = value
            && !(value.is_finite() && value > 0.0)
        {
            errors.push(ValidationError::NotPositive { field, value });
        }
    }

    if !errors.is_empty() {
        return errors;
    }

    let timings = SessionTimings::from_raw(session);
    let resolved = [
        (fields[0], timings.inactivity_warning),
        (fields[1], timings.inactivity),
        (fields[2], timings.logout_grace),
        (fields[3], timings.expiry_warning),
        (fields[4], timings.session_lifetime),
    ];
    for ((field, value), duration) in resolved {
        let Some(value) = value else { continue };
        if duration.is_zero() {
            errors.push(ValidationError::RoundsToZero { field, value });
        } else if duration > MAX_SESSION_DURATION {
            errors.push(ValidationError::TooLong {
                field,
                value,
                max_days: MAX_SESSION_DURATION.as_secs() / 86_400,
            });
        }
    }

    // Ordering is only meaningful once every value is usable
    if !errors.is_empty() {
        return errors;
    }

    let chain = [
        ("inactivity_warning_mins", timings.inactivity_warning),
        ("inactivity_mins", timings.inactivity),
        ("expiry_warning_mins", timings.expiry_warning),
        ("permanent_session_lifetime", timings.session_lifetime),
    ];

    for pair in chain.windows(2) {
        let (earlier, earlier_value) = pair[0];
        let (later, later_value) = pair[1];
        if earlier_value >= later_value {
            errors.push(ValidationError::OutOfOrder { earlier, later });
        }
    }

    errors
}

fn validate_service(service: &RawServiceConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(base_url) = &service.base_url
        && !(base_url.starts_with("http://") || base_url.starts_with("https://"))
    {
        errors.push(ValidationError::InvalidBaseUrl {
            field: "base_url",
            value: base_url.clone(),
        });
    }

    for (field, path) in [
        ("sign_out_path", &service.sign_out_path),
        ("sign_in_path", &service.sign_in_path),
    ] {
        if let Some(path) = path
            && !path.starts_with('/')
        {
            errors.push(ValidationError::InvalidPath {
                field,
                value: path.clone(),
            });
        }
    }

    if service.tick_interval_ms == Some(0) {
        errors.push(ValidationError::ZeroInterval {
            field: "tick_interval_ms",
        });
    }
    if service.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroInterval {
            field: "request_timeout_secs",
        });
    }

    errors
}
