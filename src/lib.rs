pub mod alerts;
pub mod chart;
pub mod config;
pub mod fetcher;
pub mod registry;
pub mod scanner;
pub mod shell;
pub mod util;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key under which the fetcher records the address a reading came from.
pub const SOURCE_ADDRESS_KEY: &str = "ip";

/// One snapshot of the `/api/system/info` payload reported by a miner.
///
/// Only the fields the monitor works with are named; everything else the
/// firmware reports is kept in `extra` so it can still be displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinerInfo {
    #[serde(default)]
    pub ip: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(rename = "hashRate", default, skip_serializing_if = "Option::is_none")]
    pub hash_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<f64>,

    #[serde(rename = "temp", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,

    #[serde(
        rename = "sharesAccepted",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shares_accepted: Option<u64>,

    #[serde(
        rename = "sharesRejected",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub shares_rejected: Option<u64>,

    #[serde(
        rename = "fanspeed",
        alias = "fanSpeed",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub fan_speed: Option<f64>,

    #[serde(
        rename = "bestDiff",
        alias = "bestShare",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub best_share: Option<BestShare>,

    /// Set by the firmware when it could not produce a valid snapshot.
    /// Any value counts, `null` included.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<serde_json::Value>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Best share difficulty. Older firmware reports it pre-formatted (`"4.29G"`),
/// newer firmware as a plain number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BestShare {
    Number(f64),
    Text(String),
}

impl BestShare {
    pub fn value(&self) -> Option<f64> {
        match self {
            BestShare::Number(n) => Some(*n),
            BestShare::Text(text) => util::parse_difficulty(text),
        }
    }
}

impl std::fmt::Display for BestShare {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BestShare::Number(n) => write!(f, "{n}"),
            BestShare::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Keeps a key that is present with a `null` value as `Some(Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl MinerInfo {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The reported error as text; strings are shown without quotes.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|error| match error {
            serde_json::Value::String(message) => message.clone(),
            other => other.to_string(),
        })
    }

    /// Name shown for the device: the self-reported hostname, or the address.
    pub fn display_name(&self) -> &str {
        self.hostname.as_deref().unwrap_or(&self.ip)
    }

    /// All reported fields as `(key, value)` pairs, sorted by key.
    pub fn fields(&self) -> Vec<(String, serde_json::Value)> {
        let mut fields: Vec<_> = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => Vec::new(),
        };
        fields.sort_by(|(a, _), (b, _)| a.cmp(b));
        fields
    }
}
