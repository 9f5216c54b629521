//! routemeter core: route-keyed timer/counter bookkeeping for HTTP servers.
//!
//! This crate owns the metric registry, the key naming scheme, route
//! resolution, and the `MetricsManager` that fans one request observation out
//! into named series. It carries no async runtime or web framework
//! dependency; the axum integration lives in `routemeter-http`.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Registry conflicts surface as `RouteMeterError`, never as a crash on the
//! request path.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod keys;
pub mod manager;
pub mod registry;
pub mod route;

/// Shared result type.
pub use error::{Result, RouteMeterError};
pub use manager::{MetricsManager, Observation, Outcome};
pub use registry::{Counter, Registry, Series, SeriesKind, Timer};
pub use route::{DefaultRouteResolver, NormalizingRouteResolver, RouteIdentity, RouteResolver};
