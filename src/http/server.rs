//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handler
//! - Wire up middleware (tracing, timeout, CORS)
//! - Bind server to listener
//! - Apply hot-reloaded rule sets
//! - Stop on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{Method, Uri},
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GateConfig;
use crate::http::middleware::{cors_middleware, CorsState};
use crate::observability::metrics;
use crate::policy::{ConfigurationError, OriginPolicy};
use crate::routing::PathRouteResolver;

/// HTTP server fronted by the CORS filter.
pub struct HttpServer {
    router: Router,
    config: GateConfig,
    policy: Arc<OriginPolicy>,
}

impl HttpServer {
    /// Create a server, compiling the configured rules.
    ///
    /// Fails if any rule is invalid; nothing is served under a broken policy.
    pub fn new(config: GateConfig) -> Result<Self, ConfigurationError> {
        let policy = OriginPolicy::new();
        if let Some(rules) = &config.cors.rules {
            policy.configure(rules)?;
        }
        Ok(Self::with_policy(config, Arc::new(policy)))
    }

    /// Create a server around an existing policy instance.
    pub fn with_policy(config: GateConfig, policy: Arc<OriginPolicy>) -> Self {
        let router = Self::build_router(&config, policy.clone());
        Self {
            router,
            config,
            policy,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, policy: Arc<OriginPolicy>) -> Router {
        let resolver = Arc::new(PathRouteResolver::new(config.cors.default_route.clone()));
        let cors_state = CorsState::new(policy, resolver);

        Router::new()
            .route("/{*path}", any(echo_handler))
            .route("/", any(echo_handler))
            .layer(from_fn_with_state(cors_state, cors_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Every config received on `config_updates` replaces the rule set. An
    /// invalid update, or one without rules, keeps the current set.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GateConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            configured = self.policy.is_configured(),
            "HTTP server starting"
        );

        let policy = self.policy.clone();
        let reloader = tokio::spawn(async move {
            while let Some(new_config) = config_updates.recv().await {
                apply_update(&policy, &new_config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Router with all layers applied, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn policy(&self) -> Arc<OriginPolicy> {
        self.policy.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// Swap in the rules of a reloaded config.
pub fn apply_update(policy: &OriginPolicy, config: &GateConfig) -> bool {
    let Some(rules) = &config.cors.rules else {
        tracing::warn!("Reloaded config has no CORS rules. Keeping current rule set.");
        metrics::record_reload(false);
        return false;
    };

    match policy.configure(rules) {
        Ok(count) => {
            tracing::info!(rules = count, "CORS rules reloaded");
            metrics::record_reload(true);
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected CORS rules. Keeping current rule set.");
            metrics::record_reload(false);
            false
        }
    }
}

/// Demo handler standing in for the host application.
async fn echo_handler(method: Method, uri: Uri) -> impl IntoResponse {
    format!("{} {}\n", method, uri.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawRule;
    use axum::body::Body;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;

    fn config_with(rules: Vec<RawRule>) -> GateConfig {
        let mut config = GateConfig::default();
        config.cors.rules = Some(rules);
        config
    }

    #[test]
    fn test_new_rejects_invalid_rules() {
        let result = HttpServer::new(config_with(vec![RawRule {
            route: Some(json!(123)),
            allowed_origin: Some(json!("*")),
        }]));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_update_keeps_rules_on_error() {
        let policy = OriginPolicy::from_rules(&[RawRule {
            route: Some(json!("*")),
            allowed_origin: Some(json!("*")),
        }])
        .unwrap();

        assert!(!apply_update(&policy, &GateConfig::default()));
        assert!(!apply_update(
            &policy,
            &config_with(vec![RawRule {
                route: Some(json!("*")),
                allowed_origin: Some(json!(456)),
            }])
        ));
        assert_eq!(policy.rule_set().map(|r| r.len()), Some(1));

        assert!(apply_update(&policy, &config_with(vec![])));
        assert_eq!(policy.rule_set().map(|r| r.len()), Some(0));
    }

    #[tokio::test]
    async fn test_router_echoes_allowed_origin() {
        let server = HttpServer::new(config_with(vec![RawRule {
            route: Some(json!("*")),
            allowed_origin: Some(json!(["*.trusted.com"])),
        }]))
        .unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/any/thing")
                    .header(ORIGIN, "http://a.trusted.com")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://a.trusted.com"
        );
    }
}
