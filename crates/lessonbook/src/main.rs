use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use lessonbook::{config::Config, notify::LogNotifier, state::AppState};
use lessonbook_core::clock::SystemClock;
use tokio::signal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(not(feature = "sqlite"))]
use lessonbook::storage::InMemoryRepository;
#[cfg(feature = "sqlite")]
use lessonbook::storage::SqliteRepository;

/// Lessonbook - Timeline scheduling backend for a tutoring platform
#[derive(Parser, Debug)]
#[command(name = "lessonbook")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Run a single inactivity check and exit
    #[arg(long)]
    once: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "lessonbook=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    let config = Config::from_env();
    let repo = open_repository(&config).await?;
    let state = AppState::new(repo, Arc::new(SystemClock), Arc::new(LogNotifier), &config);

    if cli.once {
        state.inactivity.run().await?;
        return Ok(());
    }

    tracing::info!(
        interval_seconds = config.inactivity_check_interval_seconds,
        window_days = config.inactivity_window_days,
        "Starting inactivity check loop"
    );

    let mut ticker = tokio::time::interval(config.inactivity_check_interval());
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                if let Err(e) = state.inactivity.run().await {
                    tracing::error!(error = %e, "Inactivity check failed");
                }
            }
        }
    }

    tracing::info!("Stopped");
    Ok(())
}

#[cfg(feature = "sqlite")]
async fn open_repository(config: &Config) -> Result<Arc<SqliteRepository>> {
    tracing::info!(path = %config.sqlite_path, "Opening SQLite database");
    Ok(Arc::new(SqliteRepository::new(&config.sqlite_path).await?))
}

#[cfg(not(feature = "sqlite"))]
async fn open_repository(_config: &Config) -> Result<Arc<InMemoryRepository>> {
    tracing::warn!("Built without the sqlite feature, data is kept in memory");
    Ok(Arc::new(InMemoryRepository::new()))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
