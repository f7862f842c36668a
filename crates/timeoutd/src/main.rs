//! timeoutd - one tab's session-timeout coordinator
//!
//! This is the main entry point for a tab process.
//! It wires together all the components:
//! - Configuration loading
//! - Shared activity store
//! - Coordinator
//! - HTTP host (sign-out and sign-in redirect)
//! - JSON-line commands on stdin, JSON-line events on stdout
//!
//! Logs go to stderr so stdout carries only the event stream.

mod runtime;
mod tab;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use timeout_config::{load_config, TimeoutPolicy};
use timeout_core::Coordinator;
use timeout_host_http::HttpHost;
use timeout_store::{SqliteStore, Store};
use timeout_util::{default_config_path, store_path, TabId};
use tokio::io::BufReader;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::runtime::serve;
use crate::tab::Tab;

/// timeoutd - session-timeout coordinator for one browser tab
#[derive(Parser, Debug)]
#[command(name = "timeoutd")]
#[command(about = "Session-timeout coordinator for one browser tab", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/timeoutd/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// When the server session began (RFC 3339). Omit when not logged in.
    #[arg(long, env = "TIMEOUT_LOGGED_IN_AT", value_parser = parse_logged_in_at)]
    logged_in_at: Option<DateTime<Local>>,

    /// Path of the current page, sent back as `next` on the sign-in redirect
    #[arg(long, default_value = "/")]
    current_page: String,

    /// Data directory override (or set TIMEOUT_DATA_DIR env var)
    #[arg(short, long, env = "TIMEOUT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Tab identifier (default: random)
    #[arg(long)]
    tab_id: Option<TabId>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn parse_logged_in_at(s: &str) -> std::result::Result<DateTime<Local>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|e| format!("expected an RFC 3339 timestamp: {}", e))
}

/// Main process state
struct Service {
    tab: Tab,
    policy: TimeoutPolicy,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        // Load configuration; a missing default file means built-in defaults
        let policy = if args.config.exists() {
            load_config(&args.config)
                .with_context(|| format!("Failed to load config from {:?}", args.config))?
        } else {
            warn!(
                config_path = %args.config.display(),
                "Config file not found, using defaults"
            );
            TimeoutPolicy::default()
        };

        info!(
            config_path = %args.config.display(),
            inactivity_warning = %timeout_util::format_duration(policy.timings.inactivity_warning),
            inactivity = %timeout_util::format_duration(policy.timings.inactivity),
            session_lifetime = %timeout_util::format_duration(policy.timings.session_lifetime),
            "Configuration loaded"
        );

        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| policy.service.data_dir.clone());

        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        // Initialize the shared activity store
        let db_path = store_path(&data_dir);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );

        info!(db_path = %db_path.display(), "Store initialized");

        let host = Arc::new(
            HttpHost::new(&policy.service).context("Failed to initialize HTTP host")?,
        );

        info!(sign_out_url = %host.sign_out_url(), "HTTP host initialized");

        let tab_id = args.tab_id.clone().unwrap_or_default();
        let coordinator =
            Coordinator::new(tab_id, policy.timings, args.logged_in_at, store.clone());
        let tab = Tab::new(coordinator, host, store, args.current_page.clone());

        Ok(Self { tab, policy })
    }

    async fn run(mut self) -> Result<()> {
        // Set up signal handlers
        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup())
            .context("Failed to create SIGHUP handler")?;

        let shutdown = async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down gracefully"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down gracefully"),
                _ = sighup.recv() => info!("Received SIGHUP, shutting down gracefully"),
            }
        };

        let mut stdout = tokio::io::stdout();
        let stdin = BufReader::new(tokio::io::stdin());

        serve(
            &mut self.tab,
            stdin,
            &mut stdout,
            self.policy.service.tick_interval,
            shutdown,
        )
        .await?;

        info!("Shutdown complete");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        mock_time = timeout_util::is_mock_time_active(),
        "timeoutd starting"
    );

    let service = Service::new(&args)?;
    service.run().await
}
