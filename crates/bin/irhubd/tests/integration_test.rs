//! End-to-end smoke tests for the full irhubd stack.
//!
//! Each test wires the real adapters (telnet sessions to a fake hub on a
//! loopback socket, reqwest calls to a `wiremock` dispatcher) into the real
//! services and axum router, then exercises the HTTP layer via
//! `tower::ServiceExt::oneshot`; no HTTP port is bound.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use irhub_adapter_gc_dispatcher::{DispatcherConfig, GcDispatcher};
use irhub_adapter_http_axum::router;
use irhub_adapter_http_axum::state::AppState;
use irhub_adapter_telnet::{TelnetConfig, TelnetConnector};
use irhub_app::pool::{ConnectionPool, PoolSettings};
use irhub_app::retry::RetryPolicy;
use irhub_app::services::device_registry::DeviceRegistry;
use irhub_app::services::health_service::HealthService;
use irhub_app::services::remote_service::RemoteService;
use irhub_domain::hardware::HardwareKind;
use irhub_domain::inventory::{DeviceBlock, Inventory};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Canned hub reply for one command line, newline-terminated.
fn hub_reply(command: &str) -> &'static str {
    if command.starts_with(r#"hubQuery="hub version""#) {
        "RedRat Hub (3.12)\n"
    } else if command.starts_with(r#"hubQuery="list datasets""#) {
        "{\nSKYHD\n}\n"
    } else if command.starts_with(r#"hubQuery="list redrats""#) {
        "{\n[IRNetBoxPro3] (00-11-22-33-44-55) at 10.0.0.5 (connected)\n}\n"
    } else if command.starts_with(r#"hardwareQuery="firmware version""#) {
        "2.1\n"
    } else if command.starts_with(r#"hardwareQuery="hardware type""#) {
        "IRNetBoxPro3\n"
    } else if command.contains(r#"signal="BADKEY""#) {
        "Failed to find signal BADKEY\n"
    } else {
        "OK\n"
    }
}

/// Start a fake hub; returns its port and the command log.
async fn fake_hub() -> (u16, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sessions_log = Arc::clone(&log);
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let log = Arc::clone(&sessions_log);
            tokio::spawn(async move {
                let (read, mut write) = socket.into_split();
                let mut lines = BufReader::new(read).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let reply = hub_reply(&line);
                    log.lock().unwrap().push(line);
                    if write.write_all(reply.as_bytes()).await.is_err() {
                        break;
                    }
                }
            });
        }
    });
    (port, log)
}

/// Build a fully-wired router: one irNetBox on the hub, one iTach behind
/// the dispatcher.
fn app(hub_port: u16, dispatcher: &MockServer) -> axum::Router {
    let pool = ConnectionPool::new(
        TelnetConnector::new(TelnetConfig {
            host: "127.0.0.1".to_string(),
            port: hub_port,
            read_timeout_ms: 2_000,
            connect_timeout_ms: 2_000,
        }),
        PoolSettings {
            size: 2,
            wait: Duration::from_secs(2),
        },
    );
    let dispatcher = GcDispatcher::new(DispatcherConfig {
        api_base: dispatcher.uri(),
        timeout_ms: 2_000,
    })
    .unwrap();
    let inventory = Inventory::expand(&[
        DeviceBlock {
            kind: HardwareKind::IrNetBoxPro3,
            host: "10.0.0.5".to_string(),
            name: None,
            port: None,
            count: 1,
            max_ports: 16,
        },
        DeviceBlock {
            kind: HardwareKind::Itach,
            host: "10.0.0.6".to_string(),
            name: None,
            port: None,
            count: 1,
            max_ports: 3,
        },
    ])
    .unwrap();

    let retry = RetryPolicy {
        max_retries: 2,
        backoff: Duration::from_millis(10),
    };
    let registry = Arc::new(DeviceRegistry::new(
        Some(pool),
        Some(Arc::new(dispatcher)),
        retry,
    ));
    let state = AppState::new(
        RemoteService::new(inventory, Arc::clone(&registry), Duration::from_secs(15)),
        HealthService::new(registry, retry, "0.1.0"),
    );
    router::build(state)
}

fn action(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&resp.into_body().collect().await.unwrap().to_bytes()).unwrap()
}

// ---------------------------------------------------------------------------
// Liveness
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let (hub_port, _) = fake_hub().await;
    let dispatcher = MockServer::start().await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Hub devices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_press_key_through_hub() {
    let (hub_port, log) = fake_hub().await;
    let dispatcher = MockServer::start().await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(action(
            "/api/devices/1/ports/3/actions",
            r#"{"keyset":"SKYHD","action":"press_key","key":"VOLUP"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["success"], true);
    let log = log.lock().unwrap();
    assert_eq!(log[0], r#"hubQuery="add irnetbox" ip="10.0.0.5""#);
    assert_eq!(log[1], r#"ip="10.0.0.5" dataset="SKYHD" signal="VOLUP" output="3""#);
}

#[tokio::test]
async fn should_tune_digit_by_digit_then_select() {
    let (hub_port, log) = fake_hub().await;
    let dispatcher = MockServer::start().await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(action(
            "/api/slots/2/actions",
            r#"{"keyset":"SKYHD","action":"tune","channel":"101","interval_ms":0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let signals: Vec<String> = log
        .lock()
        .unwrap()
        .iter()
        .filter_map(|line| {
            line.split("signal=\"")
                .nth(1)
                .and_then(|rest| rest.split('"').next())
                .map(ToString::to_string)
        })
        .collect();
    assert_eq!(signals, vec!["ONE", "ZERO", "ONE", "SELECT"]);
}

#[tokio::test]
async fn should_map_unknown_signal_to_bad_request() {
    let (hub_port, _) = fake_hub().await;
    let dispatcher = MockServer::start().await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(action(
            "/api/devices/1/ports/1/actions",
            r#"{"keyset":"SKYHD","action":"press_key","key":"BADKEY"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = json_body(resp).await;
    assert!(body["error"].as_str().unwrap().contains("BADKEY"));
}

// ---------------------------------------------------------------------------
// Dispatcher devices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_press_key_through_dispatcher() {
    let (hub_port, _) = fake_hub().await;
    let dispatcher = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/press_key"))
        .and(query_param("host", "10.0.0.6"))
        .and(query_param("ir_port_number", "2"))
        .and(query_param("key", "POWER_UP"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"result":"success"}"#))
        .expect(1)
        .mount(&dispatcher)
        .await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(action(
            "/api/devices/2/ports/2/actions",
            r#"{"keyset":"samsung","action":"press_key","key":"power up"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn should_reject_port_beyond_itach_outputs() {
    let (hub_port, _) = fake_hub().await;
    let dispatcher = MockServer::start().await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(action(
            "/api/devices/2/ports/4/actions",
            r#"{"keyset":"samsung","action":"press_key","key":"power"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_aggregate_hub_and_dispatcher_health() {
    let (hub_port, _) = fake_hub().await;
    let dispatcher = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": {
                "devices": [{
                    "host": "10.0.0.6",
                    "port": 4998,
                    "modules": [{"module": 1, "ports": 3, "type": "IR"}],
                    "health": {"available": true, "errors": []}
                }]
            }
        })))
        .mount(&dispatcher)
        .await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["is_healthy"], true);
    assert_eq!(body["version"]["MS_VERSION"], "0.1.0");
    assert_eq!(body["hw_devices"].as_array().unwrap().len(), 2);
    assert_eq!(body["dependencies"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn should_report_unhealthy_when_dispatcher_is_down() {
    let (hub_port, _) = fake_hub().await;
    let dispatcher = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&dispatcher)
        .await;

    let resp = app(hub_port, &dispatcher)
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(json_body(resp).await["is_healthy"], false);
}
