// src/lib.rs

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod sender;

use crate::handlers::{health_check, ping};
use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::{AppConfig, EmitterConfig, PointTags, SinkKind};
pub use error::{AppError, Result, SendError};
pub use crate::metrics::{emit_metrics, WavefrontEmitter};
pub use sender::{DirectSender, MetricsSender};

/// Demo routes, wrapped by `emitter`.
pub fn create_router(emitter: &WavefrontEmitter) -> Router {
    let router = Router::new()
        .route("/ping", get(ping))
        .route("/health", get(health_check));

    emitter.apply(router)
}

/// Loads configuration, builds the emitter for the configured sink and
/// returns the demo router together with the sender that must be closed on
/// shutdown.
pub async fn run(
    config_path_override: Option<PathBuf>,
) -> Result<(Router, AppConfig, Arc<dyn MetricsSender>)> {
    info!("Starting Wavefront emitter demo server...");

    let app_config = setup_configuration(config_path_override)?;

    let (app, sender) = match app_config.sink {
        SinkKind::Direct => {
            let emitter = WavefrontEmitter::new(app_config.emitter.clone()).map_err(|e| {
                error!(error = %e, "Failed to create metrics emitter. Exiting.");
                e
            })?;
            (create_router(&emitter), emitter.sender())
        }
        SinkKind::Prometheus => prometheus_app(&app_config)?,
    };

    Ok((app.layer(TraceLayer::new_for_http()), app_config, sender))
}

#[cfg(feature = "prometheus")]
fn prometheus_app(app_config: &AppConfig) -> Result<(Router, Arc<dyn MetricsSender>)> {
    let handle = crate::metrics::exporters::install_prometheus()?;
    let emitter = WavefrontEmitter::with_sender(
        app_config.emitter.clone(),
        Arc::new(sender::FacadeSender::new()),
    );

    let metrics_route = Router::new()
        .route("/metrics", get(crate::metrics::exporters::metrics_handler))
        .with_state(handle);

    Ok((create_router(&emitter).merge(metrics_route), emitter.sender()))
}

#[cfg(not(feature = "prometheus"))]
fn prometheus_app(_app_config: &AppConfig) -> Result<(Router, Arc<dyn MetricsSender>)> {
    Err(AppError::config_validation(
        "sink 'prometheus' requires the 'prometheus' feature",
        Some("sink"),
    ))
}

/// Loads, validates and logs the application configuration.
fn setup_configuration(config_path_override: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = config_path_override.unwrap_or_else(|| PathBuf::from("config.yaml"));

    let config_path_display = config_path.display().to_string();
    if config_path.exists() {
        info!(config.path = %config_path_display, "Using configuration file");
    } else {
        info!(config.path = %config_path_display, "Optional configuration file not found. Using defaults and environment variables.");
    }

    let app_config = config::load_config(&config_path).map_err(|e| {
        error!(
            config.path = %config_path_display,
            error = ?e,
            "Failed to load or validate configuration. Exiting."
        );
        e
    })?;

    info!(
        emitter.source = %app_config.emitter.source,
        emitter.metric_prefix = %app_config.emitter.metric_prefix,
        emitter.point_tags = app_config.emitter.point_tags.len(),
        sink = ?app_config.sink,
        server.port = app_config.server.port,
        "Configuration loaded and validated successfully."
    );

    Ok(app_config)
}
