//! Retry driver and downstream failure handling against a mock Downstream-B.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use telemetry_testbed::config::TestbedConfig;
use telemetry_testbed::ServiceKind;

mod common;

const FAILURE: &str = r#"{"success":false,"error":"Service temporarily unavailable"}"#;

fn orchestrator_config(external: std::net::SocketAddr) -> TestbedConfig {
    let mut config = TestbedConfig::default();
    config.orchestrator.external_service_url = format!("http://{external}");
    config.orchestrator.internal_service_url = format!("http://{external}");
    config.retries.retry_delay_ms = 50;
    config.retries.attempt_timeout_ms = 1000;
    config
}

#[tokio::test]
async fn test_retry_succeeds_after_failures() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move |_| {
        let cc = cc.clone();
        async move {
            if cc.fetch_add(1, Ordering::SeqCst) < 2 {
                (500, FAILURE.to_string())
            } else {
                (200, r#"{"success":true,"data":{"randomValue":7}}"#.to_string())
            }
        }
    })
    .await;

    let (addr, shutdown) =
        common::spawn_service(ServiceKind::Orchestrator, orchestrator_config(backend)).await;

    let res = common::client()
        .get(format!("http://{addr}/api/trace/multiple-retries"))
        .send()
        .await
        .expect("orchestrator unreachable");

    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["attempt"], 3);
    assert_eq!(body["message"], "Retry scenario succeeded on attempt 3");
    assert_eq!(body["data"]["data"]["randomValue"], 7);
    assert!(body["duration"].as_u64().unwrap() >= 100);
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_retry_exhaustion_reports_last_error() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let backend = common::start_programmable_backend(move |_| {
        cc.fetch_add(1, Ordering::SeqCst);
        async { (500, FAILURE.to_string()) }
    })
    .await;

    let mut config = orchestrator_config(backend);
    config.retries.max_attempts = 3;
    let (addr, shutdown) = common::spawn_service(ServiceKind::Orchestrator, config).await;

    let res = common::client()
        .get(format!("http://{addr}/api/trace/multiple-retries"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["attempts"], 3);
    assert_eq!(body["error"], "Request failed with status code 500");
    assert_eq!(body["message"], "Retry scenario failed after 3 attempts");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    shutdown.trigger();
}

#[tokio::test]
async fn test_attempt_timeout_counts_as_failure() {
    let backend = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        (200, r#"{"success":true}"#.to_string())
    })
    .await;

    let mut config = orchestrator_config(backend);
    config.retries.max_attempts = 2;
    config.retries.attempt_timeout_ms = 50;
    let (addr, shutdown) = common::spawn_service(ServiceKind::Orchestrator, config).await;

    let res = common::client()
        .get(format!("http://{addr}/api/trace/multiple-retries"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["attempts"], 2);
    assert_eq!(body["error"], "timeout of 50ms exceeded");

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_forwarded_downstream() {
    let seen = Arc::new(Mutex::new(String::new()));
    let sink = seen.clone();
    let backend = common::start_programmable_backend(move |head| {
        *sink.lock().unwrap() = head.to_ascii_lowercase();
        async { (200, r#"{"success":true,"delay":42}"#.to_string()) }
    })
    .await;

    let (addr, shutdown) =
        common::spawn_service(ServiceKind::Orchestrator, orchestrator_config(backend)).await;

    let res = common::client()
        .get(format!("http://{addr}/api/trace/network-latency"))
        .header("x-request-id", "trace-abc")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["x-request-id"], "trace-abc");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["networkLatency"], 42);
    assert!(seen.lock().unwrap().contains("x-request-id: trace-abc"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_single_shot_failure_maps_to_500() {
    let backend = common::start_programmable_backend(|_| async {
        (503, r#"{"success":false,"error":"Service Unavailable"}"#.to_string())
    })
    .await;

    let (addr, shutdown) =
        common::spawn_service(ServiceKind::Orchestrator, orchestrator_config(backend)).await;

    let res = common::client()
        .get(format!("http://{addr}/api/trace/internal-service"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Request failed with status code 503");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_downstream_maps_to_500() {
    let mut config = TestbedConfig::default();
    config.orchestrator.internal_service_url = "http://127.0.0.1:1".into();
    let (addr, shutdown) = common::spawn_service(ServiceKind::Orchestrator, config).await;

    let res = common::client()
        .get(format!("http://{addr}/api/trace/internal-service"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["error"].as_str().unwrap().is_empty());

    shutdown.trigger();
}
