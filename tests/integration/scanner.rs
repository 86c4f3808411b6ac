//! Scanner tests over simulated subnets

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use assert_matches::assert_matches;
use axe_monitor::{
    registry::DeviceRegistry,
    scanner::{self, MAX_HOST, ScanError},
};
use pretty_assertions::assert_eq;

use crate::helpers::*;

#[tokio::test]
async fn test_scan_returns_exactly_the_responders() {
    let responders = [1, 7, 42, 100, 199, 254];
    let subnet = Arc::new(SimulatedSubnet::new(
        "192.168.0",
        &responders,
        Duration::from_millis(1),
    ));

    let found = scanner::scan_range(subnet.clone(), "192.168.0", 100)
        .await
        .unwrap();

    assert_eq!(found.len(), responders.len());
    assert_eq!(subnet.probes.load(Ordering::SeqCst), MAX_HOST as usize);

    let mut hosts: Vec<u8> = found
        .iter()
        .map(|info| info.ip.rsplit('.').next().unwrap().parse().unwrap())
        .collect();
    hosts.sort();
    assert_eq!(hosts, responders);
}

#[tokio::test]
async fn test_scan_respects_concurrency_cap() {
    let subnet = Arc::new(SimulatedSubnet::new("10.10.0", &[], Duration::from_millis(5)));

    let found = scanner::scan_range(subnet.clone(), "10.10.0", 100)
        .await
        .unwrap();

    assert!(found.is_empty());
    let peak = subnet.peak.load(Ordering::SeqCst);
    assert!(peak <= 100, "peak concurrency was {peak}");
    assert!(peak > 1, "scan should run requests in parallel");
}

#[tokio::test]
async fn test_scan_rejects_bad_prefix() {
    let subnet = Arc::new(SimulatedSubnet::new("10.10.0", &[], Duration::ZERO));

    assert_matches!(
        scanner::scan_range(subnet.clone(), "10.10", 100).await,
        Err(ScanError::InvalidRange(_))
    );
    assert_eq!(subnet.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeated_discovery_does_not_duplicate() {
    let subnet = Arc::new(SimulatedSubnet::new("10.10.0", &[5, 6], Duration::ZERO));
    let mut registry = DeviceRegistry::new();

    for _ in 0..2 {
        let found = scanner::scan_range(subnet.clone(), "10.10.0", 100)
            .await
            .unwrap();
        scanner::merge_discovered(&mut registry, &found);
    }

    assert_eq!(registry.len(), 2);
    assert_eq!(
        registry.find_by_address("10.10.0.5").unwrap().label,
        "bitaxe-5"
    );
}
