//! # irhubd: irhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (file, env vars) and initialise tracing
//! - Expand the device inventory
//! - Build the hub connection pool (telnet) and the dispatcher client (HTTP)
//! - Construct the device registry and the remote and health services
//! - Build the axum router, bind, and serve until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use irhub_adapter_gc_dispatcher::GcDispatcher;
use irhub_adapter_http_axum::router;
use irhub_adapter_http_axum::state::AppState;
use irhub_adapter_telnet::TelnetConnector;
use irhub_app::pool::ConnectionPool;
use irhub_app::services::device_registry::DeviceRegistry;
use irhub_app::services::health_service::HealthService;
use irhub_app::services::remote_service::RemoteService;
use irhub_domain::hardware::Family;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging.filter);

    let inventory = config.inventory()?;
    tracing::info!(
        devices = inventory.len(),
        slots = inventory.slot_count(),
        "inventory loaded"
    );

    // Transports
    let hub = config.hub.enabled.then(|| {
        ConnectionPool::new(
            TelnetConnector::new(config.hub.telnet.clone()),
            config.hub.pool_settings(),
        )
    });
    if hub.is_none() && inventory.has_kind(|kind| kind.family() == Family::Hub) {
        tracing::warn!("hub disabled but hub devices are configured; they will be rejected");
    }
    let dispatcher = if config.dispatcher.is_enabled() {
        Some(Arc::new(
            GcDispatcher::new(config.dispatcher.clone()).context("failed to build dispatcher client")?,
        ))
    } else {
        None
    };
    if dispatcher.is_none() && inventory.has_kind(|kind| kind.family() == Family::Dispatcher) {
        tracing::warn!("no dispatcher api_base but dispatcher devices are configured; they will be rejected");
    }

    // Services
    let retry = config.retry.policy();
    let registry = Arc::new(DeviceRegistry::new(hub, dispatcher, retry));
    let remote_service = RemoteService::new(
        inventory,
        Arc::clone(&registry),
        config.hub.telnet.read_timeout(),
    );
    let health_service = HealthService::new(registry, retry, env!("CARGO_PKG_VERSION"));

    // HTTP
    let app = router::build(AppState::new(remote_service, health_service));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "irhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("irhubd stopped");
    Ok(())
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
