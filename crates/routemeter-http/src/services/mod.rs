//! Sample application routes served by the demo binary.

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Widget {
    pub id: u64,
    pub name: String,
}

/// Widget 0 does not exist.
pub async fn get_widget(Path(id): Path<u64>) -> Response {
    if id == 0 {
        return (StatusCode::NOT_FOUND, "no such widget").into_response();
    }
    Json(Widget {
        id,
        name: format!("widget-{id}"),
    })
    .into_response()
}

pub async fn echo(body: Bytes) -> Bytes {
    body
}
