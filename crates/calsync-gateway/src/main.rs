//! calsync-gateway: calsync main binary
//!
//! Links Slack users to their Google Calendar and answers slash commands
//! with upcoming events.
//!
//! Usage:
//!   calsync-gateway [CONFIG]   - Start the server (default config: config.yml)
//!   calsync-gateway --help     - Show help
//!   calsync-gateway --version  - Show version

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use calsync_api::{AppState, CommandRouter, spawn_session_sweeper, start_server};
use calsync_core::{AuthorizationSessions, Config, IdentityDirectory};
use calsync_google::{GoogleCalendarClient, OAuth2Broker};
use calsync_slack::SlackApiClient;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Run mode
enum RunMode {
    /// Start the HTTP server
    Server { config_path: Option<PathBuf> },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = match parse_args() {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("calsync-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server { config_path } => config_path,
    };

    // Load .env file
    dotenvy::dotenv().ok();

    let config_path = config_path.or_else(|| std::env::var_os("CALSYNC_CONFIG").map(PathBuf::from));
    let config = Config::load(config_path.as_deref())
        .map_err(|e| anyhow!("Config error: {}", e))?;

    let _log_guard = init_logging(config.log_file.as_deref())?;

    tracing::info!("Starting calsync-gateway...");
    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> RunMode {
    let mut config_path = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => return RunMode::Help,
            "--version" | "-v" => return RunMode::Version,
            _ if config_path.is_none() => config_path = Some(PathBuf::from(arg)),
            _ => {}
        }
    }

    RunMode::Server { config_path }
}

/// Print help message
fn print_help() {
    println!("calsync-gateway - Slack to Google Calendar linker");
    println!();
    println!("Usage:");
    println!("  calsync-gateway [CONFIG]   Start the server (default: config.yml)");
    println!("  calsync-gateway --help     Show this help message");
    println!("  calsync-gateway --version  Show version");
    println!();
    println!("Slash command text:");
    println!("  connect                    Link a Google account");
    println!("  get <email>                List upcoming events of a linked account");
    println!();
    println!("Environment Variables:");
    println!("  CALSYNC_CONFIG             Config file path");
    println!("  SLACK_TOKEN                Slack bot token (required)");
    println!("  SLACK_SIGNING_SECRET       Slack signing secret (required)");
    println!("  BOT_ID                     Slack bot user ID");
    println!("  SLACK_TEAM_DOMAIN          Workspace subdomain for redirects");
    println!("  CALSYNC_PORT               HTTP port (default: 8080)");
    println!("  GOOGLE_CREDENTIALS_PATH    OAuth client file (default: credentials.json)");
    println!("  CALSYNC_LOG_FILE           Also write logs to this file");
    println!("  RUST_LOG                   Log filter (default: info)");
}

/// Log to stderr, and to `log_file` as well when given.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(log_file: Option<&str>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let path = Path::new(path);
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));

            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

/// Wire up the gateway and serve until Ctrl+C
async fn run_server(config: Config) -> anyhow::Result<()> {
    let timeout = config.http_timeout();

    let slack = SlackApiClient::new(&config.slack_token, timeout)?;
    match slack.auth_test().await {
        Ok(identity) => {
            tracing::info!("Connected to Slack team {} as {}", identity.team, identity.user);
            if let (Some(expected), Some(actual)) = (&config.bot_id, &identity.bot_id) {
                if expected != actual {
                    tracing::warn!("Configured bot_id {} does not match token bot {}", expected, actual);
                }
            }
        }
        Err(e) => tracing::warn!("Slack auth test failed: {}", e),
    }

    if !Path::new(&config.google.credentials_path).exists() {
        tracing::warn!(
            "Google credential file {} not found; connect will fail until it exists",
            config.google.credentials_path
        );
    }

    let sessions = AuthorizationSessions::new();
    let broker = OAuth2Broker::new(&config.google.credentials_path, sessions.clone(), timeout)?;
    let calendar = GoogleCalendarClient::new(timeout)?;

    let router = CommandRouter::new(
        broker,
        IdentityDirectory::new(),
        Arc::new(calendar),
        Arc::new(slack),
    );

    let sweeper = spawn_session_sweeper(sessions, config.authorization_ttl());

    tracing::info!("calsync-gateway initialized successfully");
    tracing::info!("Press Ctrl+C to exit");

    start_server(AppState::new(config, router), shutdown_signal()).await?;

    if let Some(handle) = sweeper {
        handle.abort();
    }
    tracing::info!("calsync-gateway stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}
