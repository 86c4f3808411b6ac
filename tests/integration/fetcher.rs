//! Fetcher tests against a mock AxeOS device

use std::time::Duration;

use axe_monitor::{
    BestShare,
    fetcher::{HttpFetcher, SYSTEM_INFO_PATH, TelemetrySource},
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

#[tokio::test]
async fn test_full_system_info_is_parsed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SYSTEM_INFO_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_mock_system_info("bitaxe-ultra", 498.7)),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let address = mock_address(&mock_server);
    let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();

    let info = fetcher.fetch(&address).await.expect("device should answer");

    assert_eq!(info.ip, address);
    assert_eq!(info.display_name(), "bitaxe-ultra");
    assert_eq!(info.hash_rate, Some(498.7));
    assert_eq!(info.temperature, Some(58.25));
    assert_eq!(info.shares_accepted, Some(1200));
    assert_eq!(info.shares_rejected, Some(3));
    assert_eq!(info.fan_speed, Some(75.0));
    assert_eq!(info.best_share, Some(BestShare::Text("4.29G".to_string())));
    assert_eq!(info.extra.get("ASICModel"), Some(&serde_json::json!("BM1366")));
    assert!(!info.is_error());
}

#[tokio::test]
async fn test_every_field_is_listed_for_stats() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SYSTEM_INFO_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(create_mock_system_info("rig", 500.0)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
    let info = fetcher.fetch(&mock_address(&mock_server)).await.unwrap();

    let keys: Vec<String> = info.fields().into_iter().map(|(key, _)| key).collect();
    for expected in ["ASICModel", "bestDiff", "current", "fanspeed", "hashRate", "ip", "ssid", "version"] {
        assert!(keys.contains(&expected.to_string()), "missing {expected}");
    }
}

#[tokio::test]
async fn test_device_error_is_passed_through() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SYSTEM_INFO_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "error": "ASIC not detected" })),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();
    let info = fetcher.fetch(&mock_address(&mock_server)).await.unwrap();

    assert!(info.is_error());
    assert_eq!(info.error_message().as_deref(), Some("ASIC not detected"));
}

#[tokio::test]
async fn test_not_found_is_no_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SYSTEM_INFO_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();

    assert!(fetcher.fetch(&mock_address(&mock_server)).await.is_none());
}

#[tokio::test]
async fn test_non_json_body_is_no_data() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SYSTEM_INFO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>router login</html>"))
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(Duration::from_secs(2)).unwrap();

    assert!(fetcher.fetch(&mock_address(&mock_server)).await.is_none());
}
