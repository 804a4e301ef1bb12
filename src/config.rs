//! Reporter configuration from environment variables
//!
//! Nothing in `report_core` reads the environment; this layer turns env vars
//! (and an optional `--backend` flag) into the inputs a session needs.

use crate::report_core::DedupMode;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Discord,
    File,
}

impl BackendType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "discord" => Some(BackendType::Discord),
            "file" => Some(BackendType::File),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Configuration for the `reporter` binary
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    /// CSV log written by the test harness
    pub results_path: PathBuf,

    /// Publish interval in milliseconds
    pub interval_ms: u64,

    pub backend: BackendType,

    /// Bot token (Discord backend only)
    pub discord_token: String,

    /// Channel the report is posted to (Discord backend only)
    pub discord_channel_id: String,

    /// Existing report message to edit instead of creating one
    pub message_id: Option<String>,

    /// Report file (file backend only)
    pub output_path: PathBuf,

    pub dedup_mode: DedupMode,
}

impl ReporterConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `RESULTS_PATH` (default: result_tests.csv)
    /// - `REPORT_INTERVAL_MS` (default: 7500)
    /// - `REPORT_BACKEND` (discord | file, default: discord; `--backend` overrides)
    /// - `DISCORD_TOKEN`, `DISCORD_CHANNEL_ID` (required for discord)
    /// - `REPORT_MESSAGE_ID` (optional)
    /// - `REPORT_OUTPUT_PATH` (default: report.md)
    /// - `DEDUP_MODE` (content | position, default: content)
    pub fn from_env() -> Result<Self, ConfigError> {
        let args: Vec<String> = env::args().collect();
        Self::from_lookup(|key| env::var(key).ok(), &args)
    }

    pub fn from_lookup<F>(lookup: F, args: &[String]) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_ms = match lookup("REPORT_INTERVAL_MS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue(format!("REPORT_INTERVAL_MS must be an integer, got '{}'", raw))
            })?,
            None => 7_500,
        };
        if interval_ms == 0 {
            return Err(ConfigError::InvalidValue(
                "REPORT_INTERVAL_MS must be greater than 0".to_string(),
            ));
        }

        let backend_raw = parse_backend_from_args(args)
            .or_else(|| lookup("REPORT_BACKEND"))
            .unwrap_or_else(|| "discord".to_string());
        let backend = BackendType::from_str(&backend_raw).ok_or_else(|| {
            ConfigError::InvalidValue(format!("unknown report backend '{}'", backend_raw))
        })?;

        let dedup_raw = lookup("DEDUP_MODE").unwrap_or_else(|| "content".to_string());
        let dedup_mode = DedupMode::from_str(&dedup_raw.to_lowercase()).ok_or_else(|| {
            ConfigError::InvalidValue(format!("DEDUP_MODE must be content or position, got '{}'", dedup_raw))
        })?;

        let (discord_token, discord_channel_id) = match backend {
            BackendType::Discord => (
                lookup("DISCORD_TOKEN")
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ConfigError::MissingVariable("DISCORD_TOKEN".to_string()))?,
                lookup("DISCORD_CHANNEL_ID")
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ConfigError::MissingVariable("DISCORD_CHANNEL_ID".to_string()))?,
            ),
            BackendType::File => (String::new(), String::new()),
        };

        Ok(Self {
            results_path: lookup("RESULTS_PATH")
                .unwrap_or_else(|| "result_tests.csv".to_string())
                .into(),
            interval_ms,
            backend,
            discord_token,
            discord_channel_id,
            message_id: lookup("REPORT_MESSAGE_ID").filter(|v| !v.is_empty()),
            output_path: lookup("REPORT_OUTPUT_PATH")
                .unwrap_or_else(|| "report.md".to_string())
                .into(),
            dedup_mode,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn parse_backend_from_args(args: &[String]) -> Option<String> {
    args.iter()
        .position(|x| x == "--backend")
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}
