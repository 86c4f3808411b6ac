//! Miner Monitor Shell
//!
//! Interactive shell for polling, charting and alerting on BitAxe miners
//! running AxeOS.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use axe_monitor::{
    chart::ChartRunner,
    config::Config,
    fetcher::{HttpFetcher, TelemetrySource},
    shell::Shell,
    util,
};

#[derive(Parser, Debug)]
#[command(name = "axe-monitor")]
#[command(about = "Interactive monitor shell for BitAxe miners", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address prefix scanned by autofind, e.g. 192.168.1 (overrides config file)
    #[arg(short, long = "range", value_name = "PREFIX")]
    ranges: Vec<String>,

    /// Per-request timeout in seconds (overrides config file)
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    // Override with CLI args if provided
    let config = Config {
        scan_ranges: if args.ranges.is_empty() {
            config.scan_ranges
        } else {
            args.ranges
        },
        request_timeout_secs: args.timeout.unwrap_or(config.request_timeout_secs),
        ..config
    };
    config.validate().context("Invalid settings")?;

    init_logging(&config);

    info!("starting axe-monitor");

    let source: Arc<dyn TelemetrySource> = Arc::new(
        HttpFetcher::new(config.request_timeout()).context("Failed to create HTTP client")?,
    );
    let charts = chart_runner(source.clone(), config.chart_interval());

    let stdin = io::stdin();
    let mut shell = Shell::new(stdin.lock(), io::stdout(), source, charts, config);
    shell.run().await?;

    info!("axe-monitor stopped");

    Ok(())
}

/// Logs go to a file so they never corrupt the shell or the chart view
fn init_logging(config: &Config) {
    let log_path = util::default_log_path();

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_max_level(config.log_filter())
                .with_ansi(false)
                .with_writer(file)
                .init();
        }
        Err(_) => {
            // If we can't create a log file, use a minimal stderr logger that only shows errors
            tracing_subscriber::fmt()
                .with_target(false)
                .with_level(true)
                .with_max_level(tracing::Level::ERROR)
                .with_writer(io::stderr)
                .init();
        }
    }
}

#[cfg(feature = "dashboard")]
fn chart_runner(source: Arc<dyn TelemetrySource>, interval: Duration) -> Arc<dyn ChartRunner> {
    Arc::new(axe_monitor::chart::TerminalChartRunner::new(source, interval))
}

#[cfg(not(feature = "dashboard"))]
fn chart_runner(_source: Arc<dyn TelemetrySource>, _interval: Duration) -> Arc<dyn ChartRunner> {
    Arc::new(NoDashboard)
}

/// Stand-in when built without the terminal chart view
#[cfg(not(feature = "dashboard"))]
struct NoDashboard;

#[cfg(not(feature = "dashboard"))]
#[async_trait::async_trait]
impl ChartRunner for NoDashboard {
    async fn run(
        &self,
        _request: axe_monitor::chart::ChartRequest,
    ) -> Result<axe_monitor::chart::ChartSummary> {
        anyhow::bail!("Chart view not available. Build with --features dashboard")
    }
}
