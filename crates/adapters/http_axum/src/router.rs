//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use irhub_app::ports::{ConnectionFactory, Dispatcher};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` next to a plain liveness check at `/health`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<F, D>(state: AppState<F, D>) -> Router
where
    F: ConnectionFactory,
    D: Dispatcher,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use irhub_app::pool::{ConnectionPool, PoolSettings};
    use irhub_app::ports::HubConnection;
    use irhub_app::retry::RetryPolicy;
    use irhub_app::services::device_registry::DeviceRegistry;
    use irhub_app::services::health_service::HealthService;
    use irhub_app::services::remote_service::RemoteService;
    use irhub_domain::error::IrHubError;
    use irhub_domain::framing::Terminator;
    use irhub_domain::hardware::HardwareKind;
    use irhub_domain::health::DispatcherHealth;
    use irhub_domain::inventory::{DeviceBlock, Inventory};
    use tower::ServiceExt;

    /// Hub that answers `OK` to everything and records what it was sent.
    #[derive(Clone, Default)]
    struct StubHub {
        sent: Arc<Mutex<Vec<String>>>,
    }

    struct StubConnection {
        hub: StubHub,
        connected: bool,
    }

    impl HubConnection for StubConnection {
        fn is_connected(&self) -> bool {
            self.connected
        }
        async fn connect(&mut self) -> Result<(), IrHubError> {
            self.connected = true;
            Ok(())
        }
        fn close(&mut self) {
            self.connected = false;
        }
        async fn send_command(&mut self, command: &str, _: Terminator) -> Result<String, IrHubError> {
            self.hub.sent.lock().unwrap().push(command.to_string());
            Ok("OK".to_string())
        }
    }

    impl ConnectionFactory for StubHub {
        type Connection = StubConnection;
        fn create(&self, _instance_id: u64) -> StubConnection {
            StubConnection {
                hub: self.clone(),
                connected: false,
            }
        }
        fn endpoint(&self) -> String {
            "stub-hub:40000".to_string()
        }
    }

    struct StubDispatcher;

    impl Dispatcher for StubDispatcher {
        async fn press_key(&self, _query: &str) -> Result<String, IrHubError> {
            Ok(r#"{"result":"success"}"#.to_string())
        }
        async fn health(&self) -> Result<DispatcherHealth, IrHubError> {
            Ok(DispatcherHealth::default())
        }
    }

    fn test_state(hub: &StubHub) -> AppState<StubHub, StubDispatcher> {
        let inventory = Inventory::expand(&[DeviceBlock {
            kind: HardwareKind::IrNetBoxPro3,
            host: "10.0.0.5".to_string(),
            name: None,
            port: None,
            count: 1,
            max_ports: 16,
        }])
        .unwrap();
        let registry = Arc::new(DeviceRegistry::new(
            Some(ConnectionPool::new(hub.clone(), PoolSettings::default())),
            Some(Arc::new(StubDispatcher)),
            RetryPolicy::default(),
        ));
        AppState::new(
            RemoteService::new(inventory, Arc::clone(&registry), Duration::from_secs(15)),
            HealthService::new(registry, RetryPolicy::default(), "0.1.0"),
        )
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(test_state(&StubHub::default()));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    #[tokio::test]
    async fn should_press_key_on_device_port() {
        let hub = StubHub::default();
        let app = build(test_state(&hub));

        let response = app
            .oneshot(post_json(
                "/api/devices/1/ports/3/actions",
                r#"{"keyset":"SKYHD","action":"press_key","key":"VOLUP"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"success":true}"#);
        assert!(
            hub.sent
                .lock()
                .unwrap()
                .contains(&r#"ip="10.0.0.5" dataset="SKYHD" signal="VOLUP" output="3""#.to_string())
        );
    }

    #[tokio::test]
    async fn should_reject_slot_outside_inventory() {
        let app = build(test_state(&StubHub::default()));

        let response = app
            .oneshot(post_json(
                "/api/slots/17/actions",
                r#"{"keyset":"SKYHD","action":"press_key","key":"VOLUP"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("slot 17"));
    }

    #[tokio::test]
    async fn should_reject_bad_channel_before_sending() {
        let hub = StubHub::default();
        let app = build(test_state(&hub));

        let response = app
            .oneshot(post_json(
                "/api/slots/1/actions",
                r#"{"keyset":"SKYHD","action":"tune","channel":"12a"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(
            !hub.sent
                .lock()
                .unwrap()
                .iter()
                .any(|c| c.contains("signal="))
        );
    }

    #[tokio::test]
    async fn should_press_key_on_device_addressed_by_uri() {
        let hub = StubHub::default();
        let app = build(test_state(&hub));

        let response = app
            .oneshot(post_json(
                "/api/remotes/actions?uri=irnetboxpro3://10.0.0.7&port=2",
                r#"{"keyset":"SKYHD","action":"press_key","key":"OK"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            hub.sent
                .lock()
                .unwrap()
                .contains(&r#"ip="10.0.0.7" dataset="SKYHD" signal="OK" output="2""#.to_string())
        );
    }

    #[tokio::test]
    async fn should_reject_unknown_uri_scheme() {
        let app = build(test_state(&StubHub::default()));

        let response = app
            .oneshot(post_json(
                "/api/remotes/actions?uri=zigbee://10.0.0.7&port=1",
                r#"{"keyset":"SKYHD","action":"press_key","key":"OK"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_list_inventory() {
        let app = build(test_state(&StubHub::default()));

        let response = app
            .oneshot(Request::builder().uri("/api/devices").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body[0]["host"], "10.0.0.5");
        assert_eq!(body[0]["number"], 1);
    }

    #[tokio::test]
    async fn should_describe_device_port() {
        let app = build(test_state(&StubHub::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/devices/1/ports/16")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["uri"], "irnetboxpro3://10.0.0.5");
        assert_eq!(body["ports"], 16);
    }

    #[tokio::test]
    async fn should_restart_hub_pool() {
        let app = build(test_state(&StubHub::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/health/restart")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
