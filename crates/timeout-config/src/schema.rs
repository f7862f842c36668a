//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Runtime settings
    #[serde(default)]
    pub service: RawServiceConfig,

    /// Session timings, as rendered into the page by the server
    #[serde(default)]
    pub session: RawSessionConfig,
}

/// Runtime settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Origin of the web application (scheme and host)
    pub base_url: Option<String>,

    /// Path that invalidates the server session
    pub sign_out_path: Option<String>,

    /// Sign-in page the tab is redirected to
    pub sign_in_path: Option<String>,

    /// Directory holding the shared activity store
    pub data_dir: Option<PathBuf>,

    /// How often due timers are checked, in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Timeout for the sign-out request, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Session timings. Minute values may be fractional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawSessionConfig {
    /// Minutes without activity before the soft warning dialog
    pub inactivity_warning_mins: Option<f64>,

    /// Minutes without activity before the logout dialog
    pub inactivity_mins: Option<f64>,

    /// Minutes the logout dialog stays up before signing out
    pub inactivity_warning_duration: Option<f64>,

    /// Minutes after login before the expiry dialog
    pub expiry_warning_mins: Option<f64>,

    /// Absolute session lifetime, in seconds
    pub permanent_session_lifetime: Option<f64>,
}
