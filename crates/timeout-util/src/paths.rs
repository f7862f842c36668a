//! Default paths for timeoutd components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/timeoutd/config.toml` or `~/.config/timeoutd/config.toml`
//! - Data: `$XDG_DATA_HOME/timeoutd` or `~/.local/share/timeoutd`
//!
//! Every tab of the same session must resolve the same data directory, since
//! the shared activity store lives there.

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const TIMEOUT_CONFIG_ENV: &str = "TIMEOUT_CONFIG";

/// Environment variable for overriding the data directory
pub const TIMEOUT_DATA_DIR_ENV: &str = "TIMEOUT_DATA_DIR";

/// Filename of the shared activity store within the data directory
pub const STORE_FILENAME: &str = "activity.db";

const CONFIG_FILENAME: &str = "config.toml";

/// Application subdirectory name
const APP_DIR: &str = "timeoutd";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$TIMEOUT_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/timeoutd/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/timeoutd/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(TIMEOUT_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$TIMEOUT_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/timeoutd` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/timeoutd` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(TIMEOUT_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Path of the shared activity store inside `data_dir`
pub fn store_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join(STORE_FILENAME)
}
