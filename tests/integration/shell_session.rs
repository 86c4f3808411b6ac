//! End-to-end shell sessions driven from a script

use std::sync::Arc;
use std::time::Duration;

use axe_monitor::shell::PROMPT;
use pretty_assertions::assert_eq;

use crate::helpers::*;

#[tokio::test]
async fn test_add_list_remove_list() {
    let subnet = Arc::new(SimulatedSubnet::new("10.0.0", &[], Duration::ZERO));
    let charts = Arc::new(HeadlessCharts::new(subnet.clone(), 0));
    let mut shell = create_test_shell(
        "add 192.168.0.190 Miner2\nlist\nremove 192.168.0.190\nlist\nquit\n",
        subnet,
        charts,
    );

    shell.run().await.unwrap();

    let out = shell_output(&shell);
    let transcript: Vec<&str> = out
        .split(PROMPT)
        .skip(1) // intro
        .collect();

    assert_eq!(
        transcript,
        vec![
            "Added IP: 192.168.0.190, Hostname: Miner2\n",
            "Miner Devices:\n  IP: 192.168.0.190, Hostname: Miner2\n",
            "Removed IP: 192.168.0.190\n",
            "Miner Devices:\n",
            "Quitting Miner Monitor Shell.\n",
        ]
    );
    assert!(shell.context().registry.is_empty());
}

#[tokio::test]
async fn test_set_alert_then_chart_reports_single_alert() {
    let miner = Arc::new(ScriptedMiner::new([
        reading("", "Miner1", 450.0),
        reading("", "Miner1", 550.0),
    ]));
    let charts = Arc::new(HeadlessCharts::new(miner.clone(), 2));
    let mut shell = create_test_shell(
        "add 192.168.0.50 Miner1\nset_alert hashRate 500\nchart\n1\nhashRate\nquit\n",
        miner,
        charts,
    );

    shell.run().await.unwrap();

    let out = shell_output(&shell);
    assert!(out.contains("Alert threshold set for hashRate: 500\n"));
    assert!(out.contains("Chart closed after 2 readings (0 skipped).\n"));
    assert_eq!(
        out.matches("Alert: Hash rate exceeded threshold!").count(),
        1
    );
    assert!(out.contains("Alert: Hash rate exceeded threshold! Current: 550 MH/s\n"));
    assert!(!out.contains("Current: 450"));
}

#[tokio::test]
async fn test_autofind_then_fetch_by_hostname() {
    let subnet = Arc::new(SimulatedSubnet::new("10.20.30", &[12, 99], Duration::ZERO));
    let charts = Arc::new(HeadlessCharts::new(subnet.clone(), 0));
    let mut shell = create_test_shell(
        "autofind 10.20.30\nfetch bitaxe-99\nlist\n",
        subnet,
        charts,
    );

    shell.run().await.unwrap();

    let out = shell_output(&shell);
    assert!(out.contains("Found and added device: IP=10.20.30.12, Hostname=bitaxe-12\n"));
    assert!(out.contains("Found and added device: IP=10.20.30.99, Hostname=bitaxe-99\n"));
    assert!(out.contains("hostname: bitaxe-99\nip: 10.20.30.99\n"));
    assert_eq!(shell.context().registry.len(), 2);
}

#[tokio::test]
async fn test_bad_input_never_ends_the_session() {
    let subnet = Arc::new(SimulatedSubnet::new("10.0.0", &[], Duration::ZERO));
    let charts = Arc::new(HeadlessCharts::new(subnet.clone(), 0));
    let mut shell = create_test_shell(
        "bogus\nstats\nset_alert hashRate fast\nautofind 300.1.1\nadd 10.0.0.1 ok\nlist\n",
        subnet,
        charts,
    );

    shell.run().await.unwrap();

    let out = shell_output(&shell);
    assert!(out.contains("Unknown command: bogus"));
    assert!(out.contains("No miners registered"));
    assert!(out.contains("Invalid value 'fast' for hashRate"));
    assert!(out.contains("invalid address range '300.1.1'"));
    assert!(out.contains("  IP: 10.0.0.1, Hostname: ok\n"));
    assert!(out.ends_with("Quitting Miner Monitor Shell.\n"));
}
