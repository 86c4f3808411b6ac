//! ChartPoller - fetches one device on a fixed interval for the chart view
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → fetch → Some(reading) → reading channel → chart view
//!     ↑                 None → skipped
//!     └─── Commands (PollNow, Shutdown)
//! ```
//!
//! The poller stops on `Shutdown` or once the chart view has dropped the
//! receiving end of the reading channel.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, instrument, trace};

use crate::{MinerInfo, fetcher::TelemetrySource};

/// Default chart refresh interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Shortest interval the poller will tick at
const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug)]
pub enum PollerCommand {
    /// Fetch immediately; responds with whether a reading was forwarded
    PollNow { respond_to: oneshot::Sender<bool> },

    /// Stop polling
    Shutdown,
}

pub struct ChartPoller {
    source: Arc<dyn TelemetrySource>,

    address: String,

    interval_duration: Duration,

    command_rx: mpsc::Receiver<PollerCommand>,

    reading_tx: mpsc::Sender<MinerInfo>,
}

impl ChartPoller {
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        address: String,
        interval_duration: Duration,
        command_rx: mpsc::Receiver<PollerCommand>,
        reading_tx: mpsc::Sender<MinerInfo>,
    ) -> Self {
        Self {
            source,
            address,
            interval_duration: interval_duration.max(MIN_INTERVAL),
            command_rx,
            reading_tx,
        }
    }

    #[instrument(skip(self), fields(device = %self.address))]
    pub async fn run(mut self) {
        debug!("starting chart poller");

        let mut ticker = interval(self.interval_duration);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.poll().await && self.reading_tx.is_closed() {
                        debug!("chart view closed");
                        break;
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    match cmd {
                        PollerCommand::PollNow { respond_to } => {
                            let forwarded = self.poll().await;
                            let _ = respond_to.send(forwarded);
                        }

                        PollerCommand::Shutdown => {
                            debug!("received shutdown command");
                            break;
                        }
                    }
                }

                else => {
                    debug!("command channel closed, shutting down");
                    break;
                }
            }
        }

        debug!("chart poller stopped");
    }

    /// Fetch once and forward the reading. Failed fetches are skipped.
    async fn poll(&self) -> bool {
        let Some(reading) = self.source.fetch(&self.address).await else {
            trace!("no reading this tick");
            return false;
        };

        self.reading_tx.send(reading).await.is_ok()
    }
}

/// Handle for controlling a [`ChartPoller`]
#[derive(Clone)]
pub struct PollerHandle {
    sender: mpsc::Sender<PollerCommand>,
}

impl PollerHandle {
    /// Spawn a poller for `address`, forwarding readings to `reading_tx`.
    pub fn spawn(
        source: Arc<dyn TelemetrySource>,
        address: String,
        interval_duration: Duration,
        reading_tx: mpsc::Sender<MinerInfo>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);

        let poller = ChartPoller::new(source, address, interval_duration, cmd_rx, reading_tx);
        tokio::spawn(poller.run());

        Self { sender: cmd_tx }
    }

    /// Fetch immediately, bypassing the interval timer
    pub async fn poll_now(&self) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::PollNow { respond_to: tx })
            .await
            .context("failed to send PollNow command")?;

        rx.await.context("failed to receive response")
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(PollerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
