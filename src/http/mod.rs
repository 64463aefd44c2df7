//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → middleware/cors.rs (route + origin → Decision)
//!     → handler
//!     → middleware/cors.rs (write Access-Control-Allow-Origin)
//!     → Send to client
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{cors_middleware, CorsState};
pub use server::HttpServer;
