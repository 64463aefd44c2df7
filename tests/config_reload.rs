//! Rule set replacement at runtime.

use std::net::SocketAddr;
use std::time::Duration;

use cors_gate::config::{load_config, watcher::ConfigWatcher, ConfigError};
use serde_json::json;

mod common;

use common::{allow_origin, config_with, rule, start_gate, temp_path};

#[tokio::test]
async fn test_reload_swaps_rule_set() {
    let addr: SocketAddr = "127.0.0.1:28481".parse().unwrap();
    let config = config_with(addr, Some(vec![rule(json!("*"), json!(["http://a.com"]))]));
    let (shutdown, updates) = start_gate(addr, config).await;

    assert_eq!(
        allow_origin(addr, "/x/y", Some("http://b.com")).await.as_deref(),
        Some("")
    );

    updates
        .send(config_with(addr, Some(vec![rule(json!("*"), json!(["http://b.com"]))])))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        allow_origin(addr, "/x/y", Some("http://b.com")).await.as_deref(),
        Some("http://b.com")
    );
    assert_eq!(
        allow_origin(addr, "/x/y", Some("http://a.com")).await.as_deref(),
        Some("")
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_invalid_reload_keeps_rule_set() {
    let addr: SocketAddr = "127.0.0.1:28482".parse().unwrap();
    let config = config_with(addr, Some(vec![rule(json!("*"), json!(["http://a.com"]))]));
    let (shutdown, updates) = start_gate(addr, config).await;

    updates
        .send(config_with(addr, Some(vec![rule(json!(123), json!("*"))])))
        .unwrap();
    updates.send(config_with(addr, None)).unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(
        allow_origin(addr, "/x/y", Some("http://a.com")).await.as_deref(),
        Some("http://a.com")
    );

    shutdown.trigger();
}

#[test]
fn test_load_config_rejects_bad_rules_from_file() {
    let path = temp_path("bad-rules.toml");
    std::fs::write(
        &path,
        "[[cors.rules]]\nroute = [\"site/*\"]\nallowedOrigin = [\"*.ok.com\", [1]]\n",
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    let _ = std::fs::remove_file(&path);

    match err {
        ConfigError::Policy(e) => {
            assert_eq!(e.field(), "allowedOrigin");
            assert_eq!(e.index(), 0);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_watcher_emits_reloaded_config() {
    let path = temp_path("watched.toml");
    std::fs::write(&path, "[cors]\ndefault_route = \"site/index\"\n").unwrap();

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _handle = watcher.run().unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    std::fs::write(
        &path,
        "[[cors.rules]]\nroute = \"*\"\nallowedOrigin = \"*.watched.io\"\n",
    )
    .unwrap();

    // Editors and filesystems may emit several events; wait for the one
    // carrying the new rules.
    let reloaded = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(config) = updates.recv().await {
            if config.cors.rules.is_some() {
                return Some(config);
            }
        }
        None
    })
    .await
    .expect("no reload within timeout")
    .expect("watcher channel closed");

    let _ = std::fs::remove_file(&path);
    let rules = reloaded.cors.rules.unwrap();
    assert_eq!(rules[0].allowed_origin, Some(json!("*.watched.io")));
}
