use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{debug, info};

use crate::error::{AppError, Result};

/// Installs the Prometheus recorder as the global `metrics` recorder.
///
/// Points sent through [`crate::sender::FacadeSender`] show up in the handle's
/// rendered output from then on.
pub fn install_prometheus() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| AppError::Server(format!("failed to install Prometheus recorder: {e}")))?;
    info!("Prometheus recorder installed");
    Ok(handle)
}

/// Renders the current metrics in the Prometheus text format.
pub async fn metrics_handler(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    debug!("Metrics handler called");
    (StatusCode::OK, handle.render())
}
