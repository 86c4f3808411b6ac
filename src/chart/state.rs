//! Per-session chart state
//!
//! The chart view is the only writer: it applies each reading forwarded by
//! the poller, then redraws.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tracing::trace;

use crate::{
    MinerInfo,
    alerts::{Alert, AlertThresholds, CHARTED_ALERTS},
    registry::Device,
};

use super::{
    metric::{ChartMetric, Series},
    window::MetricWindow,
};

/// Maximum number of alerts kept for the alert panel
const MAX_ALERTS_BUFFER: usize = 50;

/// What a single tick did to the state
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The reading carried an error indicator and was ignored
    Skipped,

    /// Windows were updated; any alerts raised on this tick
    Updated { alerts: Vec<Alert> },
}

pub struct ChartState {
    /// Device being charted
    pub device: Device,

    /// Selected metric panels, in display order
    pub metrics: Vec<ChartMetric>,

    /// Alert log, oldest first
    pub alerts: VecDeque<Alert>,

    /// Readings applied to the windows
    pub ticks: u64,

    /// Readings ignored because the device reported an error
    pub skipped: u64,

    pub last_update: Option<DateTime<Utc>>,

    thresholds: AlertThresholds,

    windows: HashMap<Series, MetricWindow>,
}

impl ChartState {
    pub fn new(device: Device, metrics: Vec<ChartMetric>, thresholds: AlertThresholds) -> Self {
        let windows = metrics
            .iter()
            .flat_map(|metric| metric.series())
            .map(|series| (*series, MetricWindow::new()))
            .collect();

        Self {
            device,
            metrics,
            alerts: VecDeque::new(),
            ticks: 0,
            skipped: 0,
            last_update: None,
            thresholds,
            windows,
        }
    }

    /// Apply one successful fetch.
    ///
    /// Fields the device did not report are left out of their window for
    /// this tick. Hash rate is checked against its threshold when charted.
    pub fn apply(&mut self, reading: &MinerInfo) -> TickOutcome {
        if reading.is_error() {
            self.skipped += 1;
            trace!("{}: skipping error reading", self.device.address);
            return TickOutcome::Skipped;
        }

        let mut alerts = Vec::new();

        for metric in &self.metrics {
            for series in metric.series() {
                let Some(value) = series.value_in(reading) else {
                    continue;
                };

                if let Some(window) = self.windows.get_mut(series) {
                    window.push(value);
                }
            }

            if *metric == ChartMetric::HashRate {
                alerts.extend(
                    CHARTED_ALERTS
                        .iter()
                        .filter_map(|alert_metric| self.thresholds.evaluate(*alert_metric, reading)),
                );
            }
        }

        for alert in &alerts {
            self.alerts.push_back(alert.clone());

            if self.alerts.len() > MAX_ALERTS_BUFFER {
                self.alerts.pop_front();
            }
        }

        self.ticks += 1;
        self.last_update = Some(Utc::now());

        TickOutcome::Updated { alerts }
    }

    pub fn window(&self, series: Series) -> Option<&MetricWindow> {
        self.windows.get(&series)
    }
}
