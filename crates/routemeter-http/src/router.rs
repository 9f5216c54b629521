//! Axum router wiring.
//!
//! Every route, ops endpoints included, runs behind the metering middleware.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, meter, ops, services};

/// `(method, path)` of every served route, as the matched-path resolver
/// reports them. Used for pre-registration.
pub const ROUTES: &[(&str, &str)] = &[
    ("GET", "/healthz"),
    ("GET", "/metrics"),
    ("GET", "/widgets/:id"),
    ("POST", "/echo"),
];

pub fn build_router(state: AppState) -> Router {
    let http_meter = state.meter().clone();
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .route("/widgets/:id", get(services::get_widget))
        .route("/echo", post(services::echo))
        .layer(middleware::from_fn_with_state(http_meter, meter::track))
        .with_state(state)
}
