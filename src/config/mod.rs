//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → policy::RuleSet::compile (rule shape checks)
//!     → GateConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → server applies new rules via OriginPolicy::configure
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Rules stay loosely typed here; the policy compiler owns their shape

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_from_str, ConfigError};
pub use schema::{CorsConfig, GateConfig, ListenerConfig, ObservabilityConfig, RawRule};
