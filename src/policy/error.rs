//! Rule set configuration errors.

use thiserror::Error;

/// Raised by [`OriginPolicy::configure`](super::OriginPolicy::configure) when a
/// rule candidate has the wrong shape. The first invalid rule aborts the whole
/// set; nothing is installed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("rule {index}: missing required field \"{field}\"")]
    MissingField { index: usize, field: &'static str },

    #[error("rule {index}: \"route\" must be an array (or table) of routes or the string \"*\", got {found}")]
    InvalidRoute { index: usize, found: &'static str },

    #[error("rule {index}: \"route\" must not be an empty array")]
    EmptyRouteSet { index: usize },

    #[error("rule {index}: every entry of \"route\" must be a string, got {found}")]
    InvalidRouteEntry { index: usize, found: &'static str },

    #[error("rule {index}: \"allowedOrigin\" must be a string or a list (or table) of strings, got {found}")]
    InvalidAllowedOrigin { index: usize, found: &'static str },
}

impl ConfigurationError {
    /// Name of the offending configuration field.
    pub fn field(&self) -> &'static str {
        match self {
            ConfigurationError::MissingField { field, .. } => field,
            ConfigurationError::InvalidRoute { .. }
            | ConfigurationError::EmptyRouteSet { .. }
            | ConfigurationError::InvalidRouteEntry { .. } => "route",
            ConfigurationError::InvalidAllowedOrigin { .. } => "allowedOrigin",
        }
    }

    /// Position of the offending rule in declaration order.
    pub fn index(&self) -> usize {
        match self {
            ConfigurationError::MissingField { index, .. }
            | ConfigurationError::InvalidRoute { index, .. }
            | ConfigurationError::EmptyRouteSet { index }
            | ConfigurationError::InvalidRouteEntry { index, .. }
            | ConfigurationError::InvalidAllowedOrigin { index, .. } => *index,
        }
    }
}
