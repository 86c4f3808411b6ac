//! Optional configuration file for the monitor

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{chart::poller::DEFAULT_INTERVAL, fetcher::DEFAULT_TIMEOUT, scanner::DEFAULT_CONCURRENCY};

/// Monitor configuration
///
/// Every field has a default, so the file is optional and may be partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address prefixes scanned by `autofind` (hosts .1 to .254)
    #[serde(default = "default_scan_ranges")]
    pub scan_ranges: Vec<String>,

    /// Per-request timeout in seconds (default: 2)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum in-flight requests during a scan (default: 100)
    #[serde(default = "default_scan_concurrency")]
    pub scan_concurrency: usize,

    /// Chart refresh interval in milliseconds (default: 1000)
    #[serde(default = "default_chart_interval")]
    pub chart_interval_ms: u64,

    /// Log level written to the log file (default: info)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_scan_ranges() -> Vec<String> {
    vec!["192.168.0".to_string(), "10.10.0".to_string()]
}

fn default_request_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_scan_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_chart_interval() -> u64 {
    DEFAULT_INTERVAL.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file, or use defaults if there is none
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path
            .map(|p| p.to_path_buf())
            .or_else(|| crate::util::default_config_path().filter(|p| p.exists()));

        let Some(path) = config_path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = toml::from_str::<Config>(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        trace!("loaded config: {config:?}");
        Ok(config)
    }

    /// Reject settings the monitor cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be at least 1"
        );
        ensure!(
            self.chart_interval_ms > 0,
            "chart_interval_ms must be at least 1"
        );
        ensure!(
            self.scan_concurrency > 0,
            "scan_concurrency must be at least 1"
        );
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chart_interval(&self) -> Duration {
        Duration::from_millis(self.chart_interval_ms)
    }

    pub fn log_filter(&self) -> tracing::level_filters::LevelFilter {
        self.log_level
            .parse()
            .unwrap_or(tracing::level_filters::LevelFilter::INFO)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan_ranges: default_scan_ranges(),
            request_timeout_secs: default_request_timeout(),
            scan_concurrency: default_scan_concurrency(),
            chart_interval_ms: default_chart_interval(),
            log_level: default_log_level(),
        }
    }
}
