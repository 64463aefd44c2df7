//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! CORS middleware, config reload:
//!     → logging.rs (structured log events)
//!     → metrics.rs (decision and reload counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
