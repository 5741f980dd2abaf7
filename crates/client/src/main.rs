//! Lottery client binary.
//!
//! Main entry point for the lottery client.
//!
//! # Architecture
//!
//! This binary is the composition root that assembles:
//! 1. Session backends (EVM ledger and wallet) via SessionBuilder
//! 2. Frontend (UI) - CLI, GUI, etc.
//!
//! Both are built independently and injected into the Client container.
//!
//! # Features
//!
//! - `frontend-cli`: line-oriented terminal UI (default)
//!
//! # Examples
//!
//! ```bash
//! LOTTERY_RPC_URL=http://127.0.0.1:8545 cargo run -p lottery-client
//! ```

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _guard = setup_logging()?;

    #[cfg(feature = "frontend-cli")]
    {
        run_cli().await?;
    }

    #[cfg(not(feature = "frontend-cli"))]
    {
        compile_error!("At least one frontend feature must be enabled (frontend-cli, ...)");
    }

    Ok(())
}

/// Run the CLI frontend.
#[cfg(feature = "frontend-cli")]
async fn run_cli() -> Result<()> {
    use client_bootstrap::{ClientConfig, SessionBuilder};
    use client_frontend_cli::{CliConfig, CliFrontend};
    use lottery_client::Client;

    // 1. Load configuration from environment
    let config = ClientConfig::from_env()?;
    let cli_config = CliConfig::from_env();

    tracing::info!("Starting lottery client");
    tracing::info!("Network: {} ({})", config.evm.network, config.evm.rpc_url);
    tracing::info!("Contract: {}", config.evm.contract);

    // 2. Build session backends (independent layer)
    let sessions = SessionBuilder::evm(&config)?;

    // 3. Build Frontend (independent layer)
    let frontend = CliFrontend::stdio(cli_config, &config.frontend);

    // 4. Build and run
    let client = Client::builder()
        .sessions(sessions)
        .frontend(frontend)
        .build()?;

    client.run().await
}

/// Setup logging to both stderr and a per-run log file.
///
/// The returned guard flushes the file writer when dropped.
fn setup_logging() -> Result<WorkerGuard> {
    let run_id = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| format!("run_{}", elapsed.as_secs()))
        .unwrap_or_else(|_| "run_0".to_string());

    let run_log_dir = log_directory().join(&run_id);
    std::fs::create_dir_all(&run_log_dir)
        .with_context(|| format!("Failed to create log directory {}", run_log_dir.display()))?;

    let file_appender = tracing_appender::rolling::never(&run_log_dir, "client.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    tracing::info!("Logging initialized: {}", run_id);
    tracing::info!("Log file: {}/client.log", run_log_dir.display());

    Ok(guard)
}

/// Platform cache directory for logs, falling back to the temp dir.
fn log_directory() -> PathBuf {
    ProjectDirs::from("", "", "lottery")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("lottery").join("logs"))
}
