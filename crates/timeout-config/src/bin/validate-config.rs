//! Config validation CLI tool
//!
//! Validates a timeoutd configuration file and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use timeout_config::{ConfigError, CURRENT_CONFIG_VERSION};
use timeout_util::{default_config_path, format_duration};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a timeoutd configuration file.");
            eprintln!();
            eprintln!("Default location: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match timeout_config::load_config(&config_path) {
        Ok(policy) => {
            let timings = policy.timings;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", CURRENT_CONFIG_VERSION);
            println!("  Sign-out: {}{}", policy.service.base_url, policy.service.sign_out_path);
            println!("  Store: {}", timeout_util::store_path(&policy.service.data_dir).display());
            println!();
            println!("Timings:");
            println!("  Inactivity warning after: {}", format_duration(timings.inactivity_warning));
            println!("  Inactivity logout dialog after: {}", format_duration(timings.inactivity));
            println!("  Logout dialog grace: {}", format_duration(timings.logout_grace));
            println!("  Expiry dialog after login: {}", format_duration(timings.expiry_warning));
            println!("  Session lifetime: {}", format_duration(timings.session_lifetime));

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
