//! Helper functions for integration tests

use std::collections::{HashSet, VecDeque};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axe_monitor::{
    MinerInfo,
    chart::{
        ChartRequest, ChartRunner, ChartState, ChartSummary, poller::PollerHandle,
    },
    config::Config,
    fetcher::TelemetrySource,
    shell::Shell,
};
use tokio::sync::mpsc;
use wiremock::MockServer;

/// `host:port` of a mock server, the way devices are addressed
pub fn mock_address(mock_server: &MockServer) -> String {
    let mock_url = url::Url::parse(&mock_server.uri()).unwrap();
    format!(
        "{}:{}",
        mock_url.host_str().unwrap(),
        mock_url.port().unwrap()
    )
}

/// A system info body as reported by AxeOS
pub fn create_mock_system_info(hostname: &str, hash_rate: f64) -> serde_json::Value {
    serde_json::json!({
        "power": 13.2,
        "voltage": 5.1,
        "current": 2580.5,
        "temp": 58.25,
        "hashRate": hash_rate,
        "bestDiff": "4.29G",
        "sharesAccepted": 1200,
        "sharesRejected": 3,
        "fanspeed": 75,
        "hostname": hostname,
        "ssid": "farm",
        "version": "v2.1.0",
        "ASICModel": "BM1366"
    })
}

pub fn reading(ip: &str, hostname: &str, hash_rate: f64) -> MinerInfo {
    MinerInfo {
        ip: ip.to_string(),
        hostname: Some(hostname.to_string()),
        hash_rate: Some(hash_rate),
        ..MinerInfo::default()
    }
}

/// Returns the scripted readings in order, then nothing
pub struct ScriptedMiner {
    readings: Mutex<VecDeque<MinerInfo>>,
}

impl ScriptedMiner {
    pub fn new(readings: impl IntoIterator<Item = MinerInfo>) -> Self {
        Self {
            readings: Mutex::new(readings.into_iter().collect()),
        }
    }
}

#[async_trait]
impl TelemetrySource for ScriptedMiner {
    async fn fetch(&self, address: &str) -> Option<MinerInfo> {
        let mut reading = self.readings.lock().unwrap().pop_front()?;
        reading.ip = address.to_string();
        Some(reading)
    }
}

/// A subnet in which only some hosts answer. Tracks peak concurrency.
pub struct SimulatedSubnet {
    responsive: HashSet<String>,
    latency: Duration,
    in_flight: AtomicUsize,
    pub peak: AtomicUsize,
    pub probes: AtomicUsize,
}

impl SimulatedSubnet {
    pub fn new(prefix: &str, hosts: &[u8], latency: Duration) -> Self {
        Self {
            responsive: hosts.iter().map(|h| format!("{prefix}.{h}")).collect(),
            latency,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TelemetrySource for SimulatedSubnet {
    async fn fetch(&self, address: &str) -> Option<MinerInfo> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        tokio::time::sleep(self.latency).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.responsive.contains(address).then(|| {
            let host = address.rsplit('.').next().unwrap_or_default();
            reading(address, &format!("bitaxe-{host}"), 500.0)
        })
    }
}

/// Runs a chart session headless: polls `readings` times and applies them
pub struct HeadlessCharts {
    source: Arc<dyn TelemetrySource>,
    readings: usize,
}

impl HeadlessCharts {
    pub fn new(source: Arc<dyn TelemetrySource>, readings: usize) -> Self {
        Self { source, readings }
    }
}

#[async_trait]
impl ChartRunner for HeadlessCharts {
    async fn run(&self, request: ChartRequest) -> anyhow::Result<ChartSummary> {
        let (reading_tx, mut reading_rx) = mpsc::channel(16);
        // the first tick fires right away; the long interval keeps it the only one
        let poller = PollerHandle::spawn(
            self.source.clone(),
            request.device.address.clone(),
            Duration::from_secs(3600),
            reading_tx,
        );

        let mut state = ChartState::new(request.device, request.metrics, request.thresholds);

        for _ in 1..self.readings {
            poller.poll_now().await?;
        }

        for _ in 0..self.readings {
            let reading = tokio::time::timeout(Duration::from_secs(1), reading_rx.recv())
                .await?
                .ok_or_else(|| anyhow::anyhow!("poller stopped early"))?;
            state.apply(&reading);
        }

        poller.shutdown().await?;

        Ok(ChartSummary::from_state(&state))
    }
}

pub type TestShell = Shell<Cursor<Vec<u8>>, Vec<u8>>;

pub fn create_test_shell(
    script: &str,
    source: Arc<dyn TelemetrySource>,
    charts: Arc<dyn ChartRunner>,
) -> TestShell {
    Shell::new(
        Cursor::new(script.as_bytes().to_vec()),
        Vec::new(),
        source,
        charts,
        Config::default(),
    )
}

pub fn shell_output(shell: &TestShell) -> String {
    String::from_utf8_lossy(shell.output()).to_string()
}
