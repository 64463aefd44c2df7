//! Route-scoped `Access-Control-Allow-Origin` filter for axum.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod policy;
pub mod routing;

pub use config::schema::GateConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use policy::{Decision, OriginPolicy};
