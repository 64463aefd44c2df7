//! Request middleware.

pub mod cors;

pub use cors::{cors_middleware, CorsState};
