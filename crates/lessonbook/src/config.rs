use std::{env, time::Duration};

use lessonbook_core::market::DEFAULT_INACTIVITY_WINDOW_DAYS;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file (default: "lessonbook.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    pub sqlite_path: String,
    /// Seconds between inactivity checks (default: 3600)
    pub inactivity_check_interval_seconds: u64,
    /// Days without a subscription class before a student is reminded (default: 7)
    pub inactivity_window_days: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `SQLITE_PATH` - SQLite database path (default: "lessonbook.db")
    /// - `INACTIVITY_CHECK_INTERVAL_SECONDS` - Inactivity check period (default: 3600)
    /// - `INACTIVITY_WINDOW_DAYS` - Inactivity window in days (default: 7)
    pub fn from_env() -> Self {
        Self {
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "lessonbook.db".to_string()),
            inactivity_check_interval_seconds: env::var("INACTIVITY_CHECK_INTERVAL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v| v > 0)
                .unwrap_or(3600),
            inactivity_window_days: env::var("INACTIVITY_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INACTIVITY_WINDOW_DAYS),
        }
    }

    /// Get the inactivity check period as a Duration.
    pub fn inactivity_check_interval(&self) -> Duration {
        Duration::from_secs(self.inactivity_check_interval_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
