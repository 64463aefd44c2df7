//! Rule compilation and matching.
//!
//! # Responsibilities
//! - Turn loosely-typed rule candidates into typed, immutable rules
//! - Match the current route against a rule's route patterns
//! - Match the request origin against a rule's origin patterns
//!
//! # Design Decisions
//! - Shape checks happen once, at compile time; matching never inspects types
//! - Route sets are hashed; origin patterns keep declaration order
//! - No regex: suffix patterns reduce to `ends_with`

use std::collections::HashSet;

use serde_json::Value;

use super::error::ConfigurationError;
use crate::config::schema::RawRule;

const WILDCARD: &str = "*";

/// Routes a rule applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutePatterns {
    /// `route = "*"`: every route.
    Any,
    /// Explicit routes, either `controller/action` or `controller/*`.
    Set(HashSet<String>),
}

impl RoutePatterns {
    fn from_value(index: usize, value: &Value) -> Result<Self, ConfigurationError> {
        match value {
            Value::String(s) if s == WILDCARD => Ok(RoutePatterns::Any),
            Value::Array(items) => Self::from_entries(index, items.iter()),
            // Tables are accepted like arrays; only their values count.
            Value::Object(table) => Self::from_entries(index, table.values()),
            other => Err(ConfigurationError::InvalidRoute {
                index,
                found: kind(other),
            }),
        }
    }

    fn from_entries<'a>(
        index: usize,
        items: impl ExactSizeIterator<Item = &'a Value>,
    ) -> Result<Self, ConfigurationError> {
        if items.len() == 0 {
            return Err(ConfigurationError::EmptyRouteSet { index });
        }
        let mut routes = HashSet::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(route) => {
                    routes.insert(route.clone());
                }
                other => {
                    return Err(ConfigurationError::InvalidRouteEntry {
                        index,
                        found: kind(other),
                    })
                }
            }
        }
        Ok(RoutePatterns::Set(routes))
    }

    /// Returns true if `route`, or `route` with its last segment replaced by
    /// `*`, is covered by these patterns.
    pub fn matches(&self, route: &str) -> bool {
        match self {
            RoutePatterns::Any => true,
            RoutePatterns::Set(routes) => {
                routes.contains(route) || routes.contains(&wildcard_route(route))
            }
        }
    }
}

/// Replaces the final `/`-delimited segment of `route` with `*`.
///
/// `site/index` becomes `site/*`; a route without a slash becomes `*`.
pub fn wildcard_route(route: &str) -> String {
    match route.rfind('/') {
        Some(pos) => format!("{}{}", &route[..=pos], WILDCARD),
        None => WILDCARD.to_string(),
    }
}

/// A single allowed-origin entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPattern {
    /// `*`: any origin.
    Any,
    /// No wildcard: exact string equality.
    Exact(String),
    /// Contains a wildcard, e.g. `*.example.com`.
    Suffix {
        /// Pattern minus its leading wildcard (`.example.com`).
        suffix: String,
        /// Pattern minus wildcard and dot (`example.com`).
        bare: String,
    },
}

impl OriginPattern {
    pub fn parse(pattern: &str) -> Self {
        if pattern == WILDCARD {
            OriginPattern::Any
        } else if !pattern.contains('*') {
            OriginPattern::Exact(pattern.to_string())
        } else {
            OriginPattern::Suffix {
                suffix: skip_chars(pattern, 1).to_string(),
                bare: skip_chars(pattern, 2).to_string(),
            }
        }
    }

    pub fn matches(&self, origin: &str) -> bool {
        match self {
            OriginPattern::Any => true,
            OriginPattern::Exact(expected) => expected == origin,
            // `bare` covers the apex, with or without a scheme; `suffix`
            // covers subdomains on a dot boundary.
            OriginPattern::Suffix { suffix, bare } => {
                bare == origin || is_apex(origin, bare) || origin.ends_with(suffix.as_str())
            }
        }
    }
}

/// `scheme://bare`, optionally followed by `:port`.
fn is_apex(origin: &str, bare: &str) -> bool {
    let Some((_, authority)) = origin.split_once("://") else {
        return false;
    };
    match authority.strip_prefix(bare) {
        Some("") => true,
        Some(rest) => rest
            .strip_prefix(':')
            .is_some_and(|port| !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())),
        None => false,
    }
}

fn skip_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((pos, _)) => &s[pos..],
        None => "",
    }
}

/// A compiled route/origin rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    routes: RoutePatterns,
    origins: Vec<OriginPattern>,
}

impl Rule {
    pub fn new(routes: RoutePatterns, origins: Vec<OriginPattern>) -> Self {
        Self { routes, origins }
    }

    /// Compile one raw candidate. `index` is only used for error reporting.
    pub fn compile(index: usize, raw: &RawRule) -> Result<Self, ConfigurationError> {
        let route = raw
            .route
            .as_ref()
            .ok_or(ConfigurationError::MissingField { index, field: "route" })?;
        let allowed = raw
            .allowed_origin
            .as_ref()
            .ok_or(ConfigurationError::MissingField {
                index,
                field: "allowedOrigin",
            })?;

        let routes = RoutePatterns::from_value(index, route)?;
        let mut origins = Vec::new();
        collect_origins(index, allowed, &mut origins)?;

        Ok(Self { routes, origins })
    }

    pub fn routes(&self) -> &RoutePatterns {
        &self.routes
    }

    pub fn origins(&self) -> &[OriginPattern] {
        &self.origins
    }

    pub fn route_matches(&self, route: &str) -> bool {
        self.routes.matches(route)
    }

    /// First matching pattern wins; an empty pattern list never matches.
    pub fn origin_matches(&self, origin: &str) -> bool {
        self.origins.iter().any(|p| p.matches(origin))
    }
}

/// Flattens a string or arbitrarily nested list (or table) of strings, in order.
fn collect_origins(
    index: usize,
    value: &Value,
    out: &mut Vec<OriginPattern>,
) -> Result<(), ConfigurationError> {
    match value {
        Value::String(pattern) => {
            out.push(OriginPattern::parse(pattern));
            Ok(())
        }
        Value::Array(items) => {
            for item in items {
                collect_origins(index, item, out)?;
            }
            Ok(())
        }
        Value::Object(table) => {
            for item in table.values() {
                collect_origins(index, item, out)?;
            }
            Ok(())
        }
        other => Err(ConfigurationError::InvalidAllowedOrigin {
            index,
            found: kind(other),
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a table",
    }
}

/// Ordered, immutable rule set. Evaluated first-match-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Compile every candidate, stopping at the first invalid one.
    pub fn compile(raw: &[RawRule]) -> Result<Self, ConfigurationError> {
        let rules = raw
            .iter()
            .enumerate()
            .map(|(index, r)| Rule::compile(index, r))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    /// Index of the first rule matching both `route` and `origin`.
    pub fn find_match(&self, route: &str, origin: &str) -> Option<usize> {
        self.rules
            .iter()
            .position(|rule| rule.route_matches(route) && rule.origin_matches(origin))
    }
}
