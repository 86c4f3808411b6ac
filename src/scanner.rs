//! Network scanner used by `autofind`
//!
//! Probes hosts `.1` to `.254` of an address prefix with a bounded number of
//! requests in flight and keeps only the devices that answered.
//!
//! ```text
//! prefix ─► candidates (254) ─► JoinSet ─► Semaphore (N permits) ─► fetch
//!                                   │
//!                                   └─► completion order ─► Vec<MinerInfo>
//! ```

use std::net::Ipv4Addr;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument, trace};

use crate::{
    MinerInfo,
    fetcher::TelemetrySource,
    registry::{Device, DeviceRegistry},
};

/// Highest host identifier probed in a range
pub const MAX_HOST: u8 = 254;

/// Default cap on concurrent requests during a scan
pub const DEFAULT_CONCURRENCY: usize = 100;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid address range '{0}', expected three octets like 192.168.0")]
    InvalidRange(String),
}

/// Build `prefix.1` through `prefix.254`.
pub fn candidate_addresses(prefix: &str) -> Result<Vec<String>, ScanError> {
    let prefix = prefix.trim().trim_end_matches('.');

    if prefix.split('.').count() != 3 || format!("{prefix}.1").parse::<Ipv4Addr>().is_err() {
        return Err(ScanError::InvalidRange(prefix.to_string()));
    }

    Ok((1..=MAX_HOST).map(|host| format!("{prefix}.{host}")).collect())
}

/// Probe every candidate of `prefix` concurrently.
///
/// Non-responders are dropped without a trace; the result is in completion
/// order, not address order.
#[instrument(skip(source))]
pub async fn scan_range(
    source: Arc<dyn TelemetrySource>,
    prefix: &str,
    concurrency: usize,
) -> Result<Vec<MinerInfo>, ScanError> {
    let candidates = candidate_addresses(prefix)?;
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));

    debug!(
        "scanning {} hosts with {} in flight",
        candidates.len(),
        concurrency
    );

    let mut join_set = JoinSet::new();

    for address in candidates {
        let source = source.clone();
        let permits = permits.clone();

        join_set.spawn(async move {
            // the semaphore is never closed
            let _permit = permits.acquire_owned().await.ok()?;
            source.fetch(&address).await
        });
    }

    let mut found = Vec::new();
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok(Some(info)) => {
                trace!("{} answered", info.ip);
                found.push(info);
            }
            Ok(None) => {}
            Err(e) => error!("scan task failed: {e}"),
        }
    }

    info!("{prefix}: {} devices answered", found.len());

    Ok(found)
}

/// Add every discovered device whose address is not yet registered.
///
/// The label is the hostname the device reports about itself.
pub fn merge_discovered(registry: &mut DeviceRegistry, readings: &[MinerInfo]) -> Vec<Device> {
    let mut added = Vec::new();

    for reading in readings {
        if registry.find_by_address(&reading.ip).is_some() {
            continue;
        }

        let device = Device::new(reading.ip.clone(), reading.display_name());
        registry.add(device.address.clone(), device.label.clone());
        added.push(device);
    }

    added
}
