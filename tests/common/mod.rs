//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use cors_gate::config::{GateConfig, RawRule};
use cors_gate::{HttpServer, Shutdown};
use serde_json::Value;
use tokio::sync::mpsc;

pub const ALLOW_ORIGIN: &str = "access-control-allow-origin";

pub fn rule(route: Value, allowed_origin: Value) -> RawRule {
    RawRule {
        route: Some(route),
        allowed_origin: Some(allowed_origin),
    }
}

pub fn config_with(addr: SocketAddr, rules: Option<Vec<RawRule>>) -> GateConfig {
    let mut config = GateConfig::default();
    config.listener.bind_address = addr.to_string();
    config.cors.rules = rules;
    config
}

/// Start a gate on `addr`. Returns the shutdown handle and the sender used
/// to push reloaded configs.
pub async fn start_gate(
    addr: SocketAddr,
    config: GateConfig,
) -> (Shutdown, mpsc::UnboundedSender<GateConfig>) {
    let shutdown = Shutdown::new();
    let (updates_tx, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).expect("valid rules");
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    (shutdown, updates_tx)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// GET `path` with an optional Origin; returns the allow-origin header.
pub async fn allow_origin(
    addr: SocketAddr,
    path: &str,
    origin: Option<&str>,
) -> Option<String> {
    let mut req = client().get(format!("http://{}{}", addr, path));
    if let Some(origin) = origin {
        req = req.header("Origin", origin);
    }
    let res = req.send().await.expect("gate unreachable");
    assert_eq!(res.status(), 200);
    res.headers()
        .get(ALLOW_ORIGIN)
        .map(|v| v.to_str().unwrap().to_string())
}

/// Unique scratch file under the system temp dir.
pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("cors-gate-{}-{}", std::process::id(), name))
}
