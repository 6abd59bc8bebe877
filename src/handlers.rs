// src/handlers.rs

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

#[derive(Serialize)]
pub struct PingResponse {
    pub message: &'static str,
}

/// `GET /ping`
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse { message: "pong" })
}

/// `GET /health`
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
