//! Chartable metrics and the series they plot

use std::fmt;
use std::str::FromStr;

use crate::MinerInfo;

use super::ChartError;

/// A metric group the operator can select; each gets its own panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartMetric {
    Power,
    Voltage,
    HashRate,
    Temperature,
    Shares,
}

/// One plotted line. Shares plot two lines in one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Series {
    Power,
    Voltage,
    HashRate,
    Temperature,
    SharesAccepted,
    SharesRejected,
}

impl ChartMetric {
    pub const ALL: [ChartMetric; 5] = [
        ChartMetric::Power,
        ChartMetric::Voltage,
        ChartMetric::HashRate,
        ChartMetric::Temperature,
        ChartMetric::Shares,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChartMetric::Power => "power",
            ChartMetric::Voltage => "voltage",
            ChartMetric::HashRate => "hashRate",
            ChartMetric::Temperature => "temp",
            ChartMetric::Shares => "shares",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartMetric::Power => "Power Over Time",
            ChartMetric::Voltage => "Voltage Over Time",
            ChartMetric::HashRate => "Hash Rate Over Time",
            ChartMetric::Temperature => "Temperature Over Time",
            ChartMetric::Shares => "Shares Over Time",
        }
    }

    pub fn series(&self) -> &'static [Series] {
        match self {
            ChartMetric::Power => &[Series::Power],
            ChartMetric::Voltage => &[Series::Voltage],
            ChartMetric::HashRate => &[Series::HashRate],
            ChartMetric::Temperature => &[Series::Temperature],
            ChartMetric::Shares => &[Series::SharesAccepted, Series::SharesRejected],
        }
    }

    /// Parse a whitespace separated selection; `all` selects every metric.
    ///
    /// Duplicates are dropped and the order of first mention is kept.
    pub fn parse_selection(input: &str) -> Result<Vec<ChartMetric>, ChartError> {
        let mut selected = Vec::new();

        for word in input.split_whitespace() {
            if word == "all" {
                return Ok(ChartMetric::ALL.to_vec());
            }

            let metric = word.parse::<ChartMetric>()?;
            if !selected.contains(&metric) {
                selected.push(metric);
            }
        }

        if selected.is_empty() {
            return Err(ChartError::NoMetricsSelected);
        }

        Ok(selected)
    }
}

impl fmt::Display for ChartMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChartMetric {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartMetric::ALL
            .into_iter()
            .find(|metric| metric.name() == s)
            .ok_or_else(|| ChartError::UnknownMetric(s.to_string()))
    }
}

impl Series {
    pub fn label(&self) -> &'static str {
        match self {
            Series::Power => "Power (W)",
            Series::Voltage => "Voltage (V)",
            Series::HashRate => "Hash Rate (MH/s)",
            Series::Temperature => "Temperature (°C)",
            Series::SharesAccepted => "Shares Accepted",
            Series::SharesRejected => "Shares Rejected",
        }
    }

    pub fn value_in(&self, reading: &MinerInfo) -> Option<f64> {
        match self {
            Series::Power => reading.power,
            Series::Voltage => reading.voltage,
            Series::HashRate => reading.hash_rate,
            Series::Temperature => reading.temperature,
            Series::SharesAccepted => reading.shares_accepted.map(|v| v as f64),
            Series::SharesRejected => reading.shares_rejected.map(|v| v as f64),
        }
    }
}
