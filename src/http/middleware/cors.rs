//! CORS Middleware.
//! Applies the origin policy to every request passing through the router.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::observability::metrics;
use crate::policy::OriginPolicy;
use crate::routing::RouteResolver;

/// State required by the CORS middleware.
#[derive(Clone, Debug)]
pub struct CorsState {
    pub policy: Arc<OriginPolicy>,
    pub resolver: Arc<dyn RouteResolver>,
}

impl CorsState {
    pub fn new(policy: Arc<OriginPolicy>, resolver: Arc<dyn RouteResolver>) -> Self {
        Self { policy, resolver }
    }
}

pub async fn cors_middleware(
    State(state): State<CorsState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Decide before the handler runs, write after it returns so the
    // policy overrides whatever the handler set.
    let route = state.resolver.resolve(&request);
    let decision = state.policy.handle_request_start(request.headers(), &route);

    tracing::debug!(route = %route, outcome = decision.outcome(), "CORS decision");
    metrics::record_decision(decision.outcome());

    let mut response = next.run(request).await;
    decision.apply(response.headers_mut());
    response
}
