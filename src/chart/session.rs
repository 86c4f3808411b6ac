//! Chart sessions: the single-session guard and the runner seam used by the shell

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(feature = "dashboard")]
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use crate::{alerts::AlertThresholds, registry::Device};
#[cfg(feature = "dashboard")]
use crate::fetcher::TelemetrySource;

use super::{ChartError, metric::ChartMetric, state::ChartState};

/// Everything needed to start a chart session
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub device: Device,
    pub metrics: Vec<ChartMetric>,
    /// Snapshot of the thresholds at the time the chart was opened
    pub thresholds: AlertThresholds,
}

/// What a finished session did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartSummary {
    pub ticks: u64,
    pub skipped: u64,
    pub alerts: Vec<String>,
}

impl ChartSummary {
    pub fn from_state(state: &ChartState) -> Self {
        Self {
            ticks: state.ticks,
            skipped: state.skipped,
            alerts: state.alerts.iter().map(|alert| alert.message()).collect(),
        }
    }
}

/// Runs a chart session to completion (until the view is closed).
#[async_trait]
pub trait ChartRunner: Send + Sync {
    async fn run(&self, request: ChartRequest) -> Result<ChartSummary>;
}

/// Allows at most one chart session at a time.
#[derive(Debug, Clone, Default)]
pub struct ChartSlot {
    active: Arc<AtomicBool>,
}

impl ChartSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot; fails while another session holds it.
    pub fn try_begin(&self) -> Result<ChartGuard, ChartError> {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ChartError::AlreadyRunning)?;

        Ok(ChartGuard {
            active: self.active.clone(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Releases the chart slot when dropped
#[derive(Debug)]
pub struct ChartGuard {
    active: Arc<AtomicBool>,
}

impl Drop for ChartGuard {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
    }
}

/// Draws the chart in the terminal, taking over the screen until closed.
#[cfg(feature = "dashboard")]
pub struct TerminalChartRunner {
    source: Arc<dyn TelemetrySource>,
    interval: Duration,
    slot: ChartSlot,
}

#[cfg(feature = "dashboard")]
impl TerminalChartRunner {
    pub fn new(source: Arc<dyn TelemetrySource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            slot: ChartSlot::new(),
        }
    }
}

#[cfg(feature = "dashboard")]
#[async_trait]
impl ChartRunner for TerminalChartRunner {
    async fn run(&self, request: ChartRequest) -> Result<ChartSummary> {
        let _guard = self.slot.try_begin()?;

        let (reading_tx, reading_rx) = tokio::sync::mpsc::channel(32);
        let poller = super::poller::PollerHandle::spawn(
            self.source.clone(),
            request.device.address.clone(),
            self.interval,
            reading_tx,
        );

        let state = ChartState::new(request.device, request.metrics, request.thresholds);
        let mut app = super::app::ChartApp::new(state, reading_rx);

        let result = app.run().await;

        if let Err(e) = poller.shutdown().await {
            tracing::debug!("poller already stopped: {e:#}");
        }

        result?;
        Ok(ChartSummary::from_state(app.state()))
    }
}
