//! Current-route resolution.
//!
//! # Responsibilities
//! - Produce the `controller/action` identifier the origin policy matches on
//! - Honor a route already resolved by an upstream layer
//! - Fall back to a configured default for the root path

use axum::body::Body;
use axum::http::Request;

/// Supplies the route identifier for a request.
pub trait RouteResolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, req: &Request<Body>) -> String;
}

/// Request extension carrying a route resolved elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentRoute(pub String);

/// Maps the URI path to a route: `/site/index/` → `site/index`.
#[derive(Debug, Clone)]
pub struct PathRouteResolver {
    default_route: String,
}

impl PathRouteResolver {
    /// `default_route` is returned for `/` and the empty path.
    pub fn new(default_route: impl Into<String>) -> Self {
        Self {
            default_route: default_route.into(),
        }
    }
}

impl RouteResolver for PathRouteResolver {
    fn resolve(&self, req: &Request<Body>) -> String {
        if let Some(CurrentRoute(route)) = req.extensions().get::<CurrentRoute>() {
            return route.clone();
        }

        let path = req.uri().path().trim_matches('/');
        if path.is_empty() {
            self.default_route.clone()
        } else {
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::default()).unwrap()
    }

    #[test]
    fn test_path_becomes_route() {
        let resolver = PathRouteResolver::new("site/index");
        assert_eq!(resolver.resolve(&request("http://example.com/api/list")), "api/list");
        assert_eq!(resolver.resolve(&request("/api/list/")), "api/list");
        assert_eq!(resolver.resolve(&request("/api/list?page=2")), "api/list");
    }

    #[test]
    fn test_root_uses_default_route() {
        let resolver = PathRouteResolver::new("home/welcome");
        assert_eq!(resolver.resolve(&request("/")), "home/welcome");
    }

    #[test]
    fn test_extension_wins() {
        let resolver = PathRouteResolver::new("site/index");
        let mut req = request("/whatever/path");
        req.extensions_mut()
            .insert(CurrentRoute("admin/dashboard".into()));
        assert_eq!(resolver.resolve(&req), "admin/dashboard");
    }
}
