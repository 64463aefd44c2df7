//! Route resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, extensions)
//!     → resolver.rs (CurrentRoute extension, else path)
//!     → Return: route identifier ("controller/action")
//! ```
//!
//! # Design Decisions
//! - Resolution is a trait so host applications can plug their own router
//! - An explicit `CurrentRoute` set upstream always wins
//! - Deterministic: same request always resolves to the same route

pub mod resolver;

pub use resolver::{CurrentRoute, PathRouteResolver, RouteResolver};
