//! Alert thresholds and their evaluation against readings

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{MinerInfo, util::parse_difficulty};

/// Metrics an operator can set a threshold for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertMetric {
    HashRate,
    FanSpeed,
    BestShare,
}

/// Metrics evaluated on every chart tick. Fan speed and best share thresholds
/// are stored and listed, but not checked against live data.
pub const CHARTED_ALERTS: &[AlertMetric] = &[AlertMetric::HashRate];

impl AlertMetric {
    pub const ALL: [AlertMetric; 3] = [
        AlertMetric::HashRate,
        AlertMetric::FanSpeed,
        AlertMetric::BestShare,
    ];

    /// Name used on the command line and in the device API
    pub fn name(&self) -> &'static str {
        match self {
            AlertMetric::HashRate => "hashRate",
            AlertMetric::FanSpeed => "fanSpeed",
            AlertMetric::BestShare => "bestShare",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AlertMetric::HashRate => "Hash rate",
            AlertMetric::FanSpeed => "Fan speed",
            AlertMetric::BestShare => "Best share",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            AlertMetric::HashRate => " MH/s",
            AlertMetric::FanSpeed => "",
            AlertMetric::BestShare => "",
        }
    }

    /// Current value of this metric in a reading, if reported.
    pub fn value_in(&self, reading: &MinerInfo) -> Option<f64> {
        match self {
            AlertMetric::HashRate => reading.hash_rate,
            AlertMetric::FanSpeed => reading.fan_speed,
            AlertMetric::BestShare => reading.best_share.as_ref().and_then(|b| b.value()),
        }
    }
}

impl fmt::Display for AlertMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlertMetric {
    type Err = AlertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlertMetric::ALL
            .into_iter()
            .find(|metric| metric.name() == s)
            .ok_or_else(|| AlertError::UnknownMetric(s.to_string()))
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AlertError {
    #[error("Invalid metric '{0}'. Available metrics: hashRate, fanSpeed, bestShare")]
    UnknownMetric(String),

    #[error("Invalid value '{value}' for {metric}")]
    InvalidValue { metric: AlertMetric, value: String },
}

/// A configured bound, with the text the operator typed kept for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub raw: String,
    pub limit: f64,
}

/// Strict comparison: a value equal to the limit does not alert.
pub fn exceeds(value: f64, threshold: Option<&Threshold>) -> bool {
    threshold.is_some_and(|t| value > t.limit)
}

/// Thresholds for the fixed set of alertable metrics; all unset by default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlertThresholds {
    hash_rate: Option<Threshold>,
    fan_speed: Option<Threshold>,
    best_share: Option<Threshold>,
}

impl AlertThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and store a threshold. Best share accepts suffixed notation.
    pub fn set(&mut self, metric: AlertMetric, raw: &str) -> Result<&Threshold, AlertError> {
        let limit = match metric {
            AlertMetric::HashRate | AlertMetric::FanSpeed => raw.trim().parse::<f64>().ok(),
            AlertMetric::BestShare => parse_difficulty(raw),
        }
        .filter(|limit| limit.is_finite())
        .ok_or_else(|| AlertError::InvalidValue {
            metric,
            value: raw.to_string(),
        })?;

        let slot = self.slot_mut(metric);
        Ok(&*slot.insert(Threshold {
            raw: raw.trim().to_string(),
            limit,
        }))
    }

    pub fn get(&self, metric: AlertMetric) -> Option<&Threshold> {
        match metric {
            AlertMetric::HashRate => self.hash_rate.as_ref(),
            AlertMetric::FanSpeed => self.fan_speed.as_ref(),
            AlertMetric::BestShare => self.best_share.as_ref(),
        }
    }

    fn slot_mut(&mut self, metric: AlertMetric) -> &mut Option<Threshold> {
        match metric {
            AlertMetric::HashRate => &mut self.hash_rate,
            AlertMetric::FanSpeed => &mut self.fan_speed,
            AlertMetric::BestShare => &mut self.best_share,
        }
    }

    /// Compare one metric of a reading against its threshold.
    ///
    /// Readings carrying an error indicator never alert.
    pub fn evaluate(&self, metric: AlertMetric, reading: &MinerInfo) -> Option<Alert> {
        if reading.is_error() {
            return None;
        }

        let value = metric.value_in(reading)?;
        let threshold = self.get(metric);

        if !exceeds(value, threshold) {
            return None;
        }

        let alert = Alert {
            metric,
            address: reading.ip.clone(),
            value,
            limit: threshold?.limit,
            timestamp: Utc::now(),
        };
        warn!("{}: {}", alert.address, alert.message());

        Some(alert)
    }
}

/// A threshold that was exceeded
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub metric: AlertMetric,
    pub address: String,
    pub value: f64,
    pub limit: f64,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn message(&self) -> String {
        format!(
            "Alert: {} exceeded threshold! Current: {}{}",
            self.metric.title(),
            self.value,
            self.metric.unit()
        )
    }
}
