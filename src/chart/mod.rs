//! Live chart for a single device
//!
//! A chart session runs a [`poller::ChartPoller`] in the background and a
//! terminal view in the foreground. The view owns the [`state::ChartState`],
//! applies every forwarded reading and redraws. Closing the view ends the
//! session.
//!
//! ```text
//! Idle ──select device + metrics──► Running ──close view──► Idle
//! ```

#[cfg(feature = "dashboard")]
mod app;
pub mod metric;
pub mod poller;
pub mod session;
pub mod state;
#[cfg(feature = "dashboard")]
mod ui;
pub mod window;

pub use metric::{ChartMetric, Series};
pub use session::{ChartRequest, ChartRunner, ChartSlot, ChartSummary};
#[cfg(feature = "dashboard")]
pub use session::TerminalChartRunner;
pub use state::{ChartState, TickOutcome};
pub use window::{MetricWindow, WINDOW_CAPACITY};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChartError {
    #[error("Unknown metric '{0}'. Available metrics: power, voltage, hashRate, temp, shares, all")]
    UnknownMetric(String),

    #[error("No metrics selected")]
    NoMetricsSelected,

    #[error("A chart is already running, close it first")]
    AlreadyRunning,
}
