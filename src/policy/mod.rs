//! Origin policy subsystem.
//!
//! # Data Flow
//! ```text
//! Configuration (RawRule[])
//!     → rules.rs (shape validation, compile to RuleSet)
//!     → OriginPolicy (atomic publish via ArcSwap)
//!
//! Per request:
//!     headers + current route
//!     → extract Origin (must parse as URL with a host)
//!     → first rule matching route AND origin
//!     → Decision (Skip / Allow / Deny)
//! ```
//!
//! # Design Decisions
//! - Rule set is immutable once published; reconfiguration swaps it whole
//! - Invalid configuration never replaces a working rule set
//! - Unparseable origins are a policy outcome, not an error

pub mod decision;
pub mod error;
pub mod rules;

pub use decision::Decision;
pub use error::ConfigurationError;
pub use rules::{OriginPattern, RoutePatterns, Rule, RuleSet};

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use axum::http::{header::ORIGIN, HeaderMap, HeaderValue};
use url::Url;

use crate::config::schema::RawRule;

/// Route-scoped allow-origin filter.
///
/// Starts unconfigured: every request is left untouched until the first
/// successful [`configure`](Self::configure). There is no way back to the
/// unconfigured state.
#[derive(Debug, Default)]
pub struct OriginPolicy {
    rules: ArcSwapOption<RuleSet>,
}

impl OriginPolicy {
    /// Create an unconfigured policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy already configured with `raw`.
    pub fn from_rules(raw: &[RawRule]) -> Result<Self, ConfigurationError> {
        let policy = Self::new();
        policy.configure(raw)?;
        Ok(policy)
    }

    /// Validate `raw` and, if every rule is valid, replace the active rule
    /// set. Returns the number of installed rules.
    pub fn configure(&self, raw: &[RawRule]) -> Result<usize, ConfigurationError> {
        let rules = RuleSet::compile(raw)?;
        let count = rules.len();
        self.install(rules);
        Ok(count)
    }

    /// Publish an already compiled rule set.
    pub fn install(&self, rules: RuleSet) {
        tracing::info!(rules = rules.len(), "CORS rule set installed");
        self.rules.store(Some(Arc::new(rules)));
    }

    pub fn is_configured(&self) -> bool {
        self.rules.load().is_some()
    }

    /// Snapshot of the active rule set.
    pub fn rule_set(&self) -> Option<Arc<RuleSet>> {
        self.rules.load_full()
    }

    /// Decide what the allow-origin header should be for a request on
    /// `route` carrying `headers`.
    pub fn handle_request_start(&self, headers: &HeaderMap, route: &str) -> Decision {
        let guard = self.rules.load();
        let Some(rules) = &*guard else {
            return Decision::Skip;
        };

        let Some(origin) = extract_origin(headers) else {
            return Decision::Skip;
        };

        if rules.is_empty() {
            return Decision::Skip;
        }

        // extract_origin only returns values that are valid UTF-8.
        let origin_str = origin.to_str().unwrap_or_default();
        match rules.find_match(route, origin_str) {
            Some(index) => {
                tracing::trace!(rule = index, route, origin = origin_str, "CORS rule matched");
                Decision::Allow(origin.clone())
            }
            None => Decision::Deny,
        }
    }
}

/// Returns the `Origin` header if it is a URL with a non-empty host.
pub fn extract_origin(headers: &HeaderMap) -> Option<&HeaderValue> {
    let value = headers.get(ORIGIN)?;
    let raw = value.to_str().ok()?;
    // Absolute URLs only: scheme-relative values like `//a.com` are treated as absent.
    let url = Url::parse(raw).ok()?;
    match url.host_str() {
        Some(host) if !host.is_empty() => Some(value),
        _ => None,
    }
}
