//! Interactive command shell
//!
//! Reads one command per line, dispatches it against the [`MonitorContext`]
//! and prints the result. Errors are printed as a single line and the shell
//! keeps going; only `quit`, `exit` or end of input end the loop.

mod command;
mod error;

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    MinerInfo,
    alerts::{AlertMetric, AlertThresholds},
    chart::{ChartMetric, ChartRequest, ChartRunner},
    config::Config,
    fetcher::TelemetrySource,
    registry::{Device, DeviceRegistry},
    scanner,
};

pub use command::{COMMANDS, Command, CommandHelp, help_for};
pub use error::ShellError;

pub const PROMPT: &str = "miner-monitor> ";

const INTRO: &str = "
    Welcome to the axe-monitor shell for BitAxe!

    Fetch data, add or remove devices, list all devices, and display
    real-time charts for power, voltage, hash rate, temperature and shares.
    Set alert thresholds to keep track of your miners, and call each miner
    by hostname instead of hunting for its address.

    Type ? to list commands, or help <command> for details on a specific command.
";

/// State the shell commands operate on
#[derive(Debug, Clone, Default)]
pub struct MonitorContext {
    pub registry: DeviceRegistry,
    pub thresholds: AlertThresholds,
}

/// Whether the loop should keep reading commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<R, W> {
    input: R,
    output: W,
    context: MonitorContext,
    source: Arc<dyn TelemetrySource>,
    charts: Arc<dyn ChartRunner>,
    config: Config,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(
        input: R,
        output: W,
        source: Arc<dyn TelemetrySource>,
        charts: Arc<dyn ChartRunner>,
        config: Config,
    ) -> Self {
        Self {
            input,
            output,
            context: MonitorContext::default(),
            source,
            charts,
            config,
        }
    }

    pub fn context(&self) -> &MonitorContext {
        &self.context
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    /// Run until quit or end of input
    pub async fn run(&mut self) -> Result<()> {
        writeln!(self.output, "{INTRO}")?;

        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                writeln!(self.output)?;
                self.quit()?;
                break;
            };

            if self.execute(&line).await? == Flow::Quit {
                break;
            }
        }

        Ok(())
    }

    /// Execute a single command line, printing any user-facing error.
    ///
    /// Only failures to write to the terminal are returned.
    pub async fn execute(&mut self, line: &str) -> Result<Flow> {
        let outcome = match Command::parse(line) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(flow) => Ok(flow),
            Err(e) if e.is_fatal() => Err(e.into()),
            Err(e) => {
                debug!("command failed: {e}");
                writeln!(self.output, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Flow, ShellError> {
        debug!("dispatching {command:?}");

        match command {
            Command::Empty => {}
            Command::Fetch { label } => self.fetch(label.as_deref()).await?,
            Command::Add { address, label } => self.add(address, label)?,
            Command::Remove { address } => self.remove(&address)?,
            Command::List => self.list()?,
            Command::Chart => self.chart().await?,
            Command::Stats => self.stats().await?,
            Command::SetAlert { metric, value } => self.set_alert(metric, &value)?,
            Command::Alerts => self.alerts()?,
            Command::Autofind { ranges } => self.autofind(ranges).await?,
            Command::Help { topic } => self.help(topic.as_deref())?,
            Command::Quit => {
                self.quit()?;
                return Ok(Flow::Quit);
            }
        }

        Ok(Flow::Continue)
    }

    async fn fetch(&mut self, label: Option<&str>) -> Result<(), ShellError> {
        let addresses: Vec<String> = match label {
            Some(label) => {
                let device = self
                    .context
                    .registry
                    .find_by_label(label)
                    .ok_or_else(|| ShellError::UnknownLabel(label.to_string()))?;
                vec![device.address.clone()]
            }
            None => self
                .context
                .registry
                .list()
                .iter()
                .map(|device| device.address.clone())
                .collect(),
        };

        for address in addresses {
            // unreachable devices are skipped silently
            let Some(reading) = self.source.fetch(&address).await else {
                continue;
            };

            if let Some(error) = reading.error_message() {
                writeln!(
                    self.output,
                    "IP Address: {} - Error: {}",
                    reading.ip, error
                )?;
            } else {
                self.print_reading(&reading)?;
                writeln!(self.output)?;
            }
        }

        Ok(())
    }

    fn add(&mut self, address: String, label: String) -> Result<(), ShellError> {
        writeln!(self.output, "Added IP: {address}, Hostname: {label}")?;
        self.context.registry.add(address, label);
        Ok(())
    }

    fn remove(&mut self, address: &str) -> Result<(), ShellError> {
        self.context.registry.remove(address);
        writeln!(self.output, "Removed IP: {address}")?;
        Ok(())
    }

    fn list(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "Miner Devices:")?;
        for device in self.context.registry.list() {
            writeln!(
                self.output,
                "  IP: {}, Hostname: {}",
                device.address, device.label
            )?;
        }
        Ok(())
    }

    async fn chart(&mut self) -> Result<(), ShellError> {
        let device = self.select_device()?;

        let answer = self.prompt(&format!(
            "Enter the metrics to display ({}, all): ",
            ChartMetric::ALL.map(|metric| metric.name()).join(", ")
        ))?;
        let metrics = ChartMetric::parse_selection(&answer)?;

        info!(
            "charting {} ({}) with {} panels",
            device.label,
            device.address,
            metrics.len()
        );

        let request = ChartRequest {
            device,
            metrics,
            thresholds: self.context.thresholds.clone(),
        };
        let summary = self
            .charts
            .run(request)
            .await
            .map_err(ShellError::Session)?;

        writeln!(
            self.output,
            "Chart closed after {} readings ({} skipped).",
            summary.ticks, summary.skipped
        )?;
        for alert in &summary.alerts {
            writeln!(self.output, "{alert}")?;
        }

        Ok(())
    }

    async fn stats(&mut self) -> Result<(), ShellError> {
        let device = self.select_device()?;

        let reading = self
            .source
            .fetch(&device.address)
            .await
            .ok_or(ShellError::FetchFailed)?;

        self.print_reading(&reading)
    }

    fn set_alert(&mut self, metric: AlertMetric, value: &str) -> Result<(), ShellError> {
        let threshold = self.context.thresholds.set(metric, value)?;
        info!("{metric} threshold set to {}", threshold.limit);
        writeln!(self.output, "Alert threshold set for {metric}: {value}")?;
        Ok(())
    }

    fn alerts(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "Alert thresholds:")?;
        for metric in AlertMetric::ALL {
            match self.context.thresholds.get(metric) {
                Some(threshold) => writeln!(self.output, "  {metric}: {}", threshold.raw)?,
                None => writeln!(self.output, "  {metric}: not set")?,
            }
        }
        Ok(())
    }

    async fn autofind(&mut self, ranges: Vec<String>) -> Result<(), ShellError> {
        let ranges = if ranges.is_empty() {
            self.config.scan_ranges.clone()
        } else {
            ranges
        };

        writeln!(self.output, "Starting autofind for miners in the network...")?;

        for range in &ranges {
            let range = range.trim_end_matches('.');
            writeln!(self.output, "Scanning IP range {range}.1-254...")?;
            self.output.flush()?;

            let readings = match scanner::scan_range(
                self.source.clone(),
                range,
                self.config.scan_concurrency,
            )
            .await
            {
                Ok(readings) => readings,
                Err(e) => {
                    // a bad prefix skips that range only
                    writeln!(self.output, "{e}")?;
                    continue;
                }
            };

            for device in scanner::merge_discovered(&mut self.context.registry, &readings) {
                writeln!(
                    self.output,
                    "Found and added device: IP={}, Hostname={}",
                    device.address, device.label
                )?;
            }
        }

        writeln!(self.output, "Autofind complete.")?;
        Ok(())
    }

    fn help(&mut self, topic: Option<&str>) -> Result<(), ShellError> {
        match topic {
            Some(name) => {
                let help = help_for(name).ok_or_else(|| ShellError::UnknownCommand(name.to_string()))?;
                writeln!(self.output, "{}\n\n  Usage: {}", help.summary, help.usage)?;
            }
            None => {
                writeln!(self.output, "Commands:")?;
                for help in COMMANDS {
                    writeln!(self.output, "  {:<28} {}", help.usage, help.summary)?;
                }
            }
        }
        Ok(())
    }

    fn quit(&mut self) -> Result<(), ShellError> {
        writeln!(self.output, "Quitting Miner Monitor Shell.")?;
        Ok(())
    }

    /// Print the numbered device list and read the operator's choice
    fn select_device(&mut self) -> Result<Device, ShellError> {
        if self.context.registry.is_empty() {
            return Err(ShellError::NoDevices);
        }

        writeln!(self.output, "Select a miner from the list:")?;
        for (idx, device) in self.context.registry.list().iter().enumerate() {
            writeln!(
                self.output,
                "{}. IP: {}, Hostname: {}",
                idx + 1,
                device.address,
                device.label
            )?;
        }

        let answer = self.prompt("Enter the number of the miner: ")?;
        let number: usize = answer.trim().parse().map_err(|_| ShellError::NotANumber)?;

        number
            .checked_sub(1)
            .and_then(|index| self.context.registry.get(index))
            .cloned()
            .ok_or(ShellError::InvalidSelection)
    }

    /// Ask a follow-up question; end of input reads as an empty answer
    fn prompt(&mut self, question: &str) -> Result<String, ShellError> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    /// Invalid UTF-8 is replaced rather than rejected
    fn read_line(&mut self) -> std::io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&buf);
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn print_reading(&mut self, reading: &MinerInfo) -> Result<(), ShellError> {
        for (key, value) in reading.fields() {
            writeln!(self.output, "{key}: {}", display_value(&value))?;
        }
        Ok(())
    }
}

/// Strings print bare, everything else as JSON
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
