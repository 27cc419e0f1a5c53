//! End-to-end iteration tests against a mocked exchange API.
//!
//! These exercise the real HTTP path: one wiremock server stands in for the
//! exchange and the assertions follow the metrics side channel, which is the
//! only place probe outcomes are visible.

use idxprobe_core::{LoadProfile, MetricsRegistry, Stage};
use idxprobe_runner::config::TargetConfig;
use idxprobe_runner::probes::{self, ProbeClient};
use idxprobe_runner::runner;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn target_for(server: &MockServer) -> TargetConfig {
    TargetConfig {
        base_url: server.uri(),
        user_agent: "idxprobe-test".to_string(),
        insecure_skip_tls_verify: false,
    }
}

fn valid_bodies() -> Vec<(&'static str, Value)> {
    vec![
        ("/server_time", json!({"timezone": "UTC", "server_time": 1714646400000u64})),
        ("/ticker/btcidr", json!({"ticker": {"last": "1000500000", "buy": "1000400000"}})),
        ("/ticker/ethidr", json!({"ticker": {"last": "52000000"}})),
        ("/ticker/usdtidr", json!({"ticker": {"last": "16250"}})),
        ("/pairs", json!([{"id": "btcidr", "symbol": "BTCIDR"}, {"id": "ethidr", "symbol": "ETHIDR"}])),
        ("/price_increments", json!({"increments": {"btcidr": "1000", "ethidr": "100"}})),
        ("/summaries", json!({"tickers": {"btc_idr": {"last": "1000500000"}}})),
    ]
}

async fn mount_valid_except(server: &MockServer, skip: &[&str]) {
    for (endpoint, body) in valid_bodies() {
        if skip.contains(&endpoint) {
            continue;
        }
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(server)
            .await;
    }
}

fn check(summary: &idxprobe_core::RunSummary, name: &str) -> (u64, u64) {
    let check = summary
        .checks
        .iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("check {name} not recorded"));
    (check.passes, check.failures)
}

#[tokio::test]
async fn healthy_iteration_records_all_checks_and_no_errors() {
    let server = MockServer::start().await;
    mount_valid_except(&server, &[]).await;

    let client = ProbeClient::new(&target_for(&server)).unwrap();
    let catalog = probes::catalog();
    let metrics = MetricsRegistry::new().unwrap();

    probes::run_iteration(&client, &catalog, &metrics).await;

    let summary = metrics.snapshot();
    assert_eq!(summary.total_requests, 7);
    assert_eq!(summary.failed_requests, 0);
    assert_eq!(summary.endpoints.len(), 7);

    // 3+3+2+2+3+2+2 named checks, all passing.
    assert_eq!(summary.checks.len(), 17);
    for check in &summary.checks {
        assert_eq!(check.passes, 1, "{} should pass", check.name);
        assert_eq!(check.failures, 0, "{} should not fail", check.name);
    }

    assert_eq!(summary.error_samples, 7);
    assert_eq!(summary.error_rate, 0.0);
}

#[tokio::test]
async fn failing_endpoint_does_not_stop_later_probes() {
    let server = MockServer::start().await;
    mount_valid_except(&server, &["/server_time"]).await;
    Mock::given(method("GET"))
        .and(path("/server_time"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProbeClient::new(&target_for(&server)).unwrap();
    let catalog = probes::catalog();
    let metrics = MetricsRegistry::new().unwrap();

    probes::run_iteration(&client, &catalog, &metrics).await;

    let summary = metrics.snapshot();
    assert_eq!(summary.total_requests, 7);
    assert_eq!(summary.failed_requests, 1);

    let server_time = summary.endpoints.iter().find(|e| e.name == "server_time").unwrap();
    assert_eq!(server_time.failures, 1);

    // The probes after the failing one still ran; the expect(1) counts on
    // every mock double-check that on teardown.
    let summaries = summary.endpoints.iter().find(|e| e.name == "summaries").unwrap();
    assert_eq!(summaries.requests, 1);

    assert_eq!(check(&summary, "server_time: status is 200"), (0, 1));
    assert_eq!(check(&summary, "server_time: has server_time"), (0, 1));
    assert_eq!(check(&summary, "summaries: has tickers"), (1, 0));

    // One probe out of seven contributed an error sample.
    assert_eq!(summary.error_samples, 7);
    assert!((summary.error_rate - 1.0 / 7.0).abs() < 1e-9);
}

#[tokio::test]
async fn empty_pairs_array_fails_only_the_has_data_check() {
    let server = MockServer::start().await;
    mount_valid_except(&server, &["/pairs"]).await;
    Mock::given(method("GET"))
        .and(path("/pairs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ProbeClient::new(&target_for(&server)).unwrap();
    let catalog = probes::catalog();
    let metrics = MetricsRegistry::new().unwrap();

    probes::run_iteration(&client, &catalog, &metrics).await;

    let summary = metrics.snapshot();
    assert_eq!(check(&summary, "pairs: status is 200"), (1, 0));
    assert_eq!(check(&summary, "pairs: response is array"), (1, 0));
    assert_eq!(check(&summary, "pairs: has data"), (0, 1));

    // The empty array is not a request failure, only a check failure.
    assert_eq!(summary.failed_requests, 0);
    assert!((summary.error_rate - 1.0 / 7.0).abs() < 1e-9);
}

#[tokio::test]
async fn probes_execute_in_catalog_order() {
    let server = MockServer::start().await;
    mount_valid_except(&server, &[]).await;

    let client = ProbeClient::new(&target_for(&server)).unwrap();
    let catalog = probes::catalog();
    let metrics = MetricsRegistry::new().unwrap();

    probes::run_iteration(&client, &catalog, &metrics).await;

    let received = server.received_requests().await.unwrap();
    let paths: Vec<String> = received.iter().map(|r| r.url.path().to_string()).collect();
    let expected: Vec<&str> = catalog.iter().map(|p| p.path).collect();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn short_run_drives_callers_through_the_scheduler() {
    let server = MockServer::start().await;
    for (endpoint, body) in valid_bodies() {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
    }

    let client = Arc::new(ProbeClient::new(&target_for(&server)).unwrap());
    let catalog = Arc::new(probes::catalog());
    let metrics = Arc::new(MetricsRegistry::new().unwrap());
    let profile = LoadProfile::new(vec![
        Stage { duration_secs: 0.1, target: 2 },
        Stage { duration_secs: 0.4, target: 2 },
    ])
    .unwrap();

    runner::run(
        client,
        catalog,
        &profile,
        Duration::from_millis(50),
        metrics.clone(),
    )
    .await;

    let summary = metrics.snapshot();
    // At least one full iteration completed and nothing failed.
    assert!(summary.total_requests >= 7, "got {} requests", summary.total_requests);
    assert_eq!(summary.failed_requests, 0);
    assert_eq!(summary.error_rate, 0.0);
}
