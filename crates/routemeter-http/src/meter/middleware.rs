use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use super::{HttpMeter, ObservedBody};

/// Time the request and meter its response.
///
/// ```ignore
/// let app = Router::new()
///     .route("/widgets/:id", get(get_widget))
///     .layer(axum::middleware::from_fn_with_state(meter.clone(), track));
/// ```
///
/// The route is resolved up front because the request is moved into the
/// inner service. Everything the observation needs is copied into the body
/// wrapper; nothing borrows from the request or response afterwards.
pub async fn track(State(meter): State<HttpMeter>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let route = meter.manager().resolve(&req);

    let response = next.run(req).await;

    let (parts, body) = response.into_parts();
    let body = ObservedBody::new(body, route, started, meter.recorder().clone())
        .with_status(parts.status);
    Response::from_parts(parts, Body::new(body))
}
