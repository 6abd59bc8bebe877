// src/config/loader.rs

use crate::config::{AppConfig, ConfigValidator};
use crate::error::{AppError, Result};
use secrecy::SecretString;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from file or environment variables
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    override_with_env(&mut config);

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|_| AppError::ConfigNotFound {
        path: config_path.display().to_string(),
    })?;

    serde_yaml::from_str(&content).map_err(|e| AppError::ConfigParse {
        message: format!("Failed to parse config file: {}", e),
        line: e.location().map(|loc| loc.line()),
    })
}

fn override_with_env(config: &mut AppConfig) {
    if let Ok(server) = std::env::var("WAVEFRONT_SERVER") {
        info!("Overriding ingestion server from environment variable");
        config.emitter.server = server;
    }

    if let Ok(token) = std::env::var("WAVEFRONT_TOKEN") {
        info!("Overriding API token from environment variable");
        config.emitter.token = SecretString::new(token);
    }

    if let Ok(source) = std::env::var("WAVEFRONT_SOURCE") {
        info!("Overriding source from environment variable: {}", source);
        config.emitter.source = source;
    }

    if let Ok(prefix) = std::env::var("WAVEFRONT_METRIC_PREFIX") {
        info!("Overriding metric prefix from environment variable: {}", prefix);
        config.emitter.metric_prefix = prefix;
    }

    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse::<u16>() {
            info!("Overriding server port from environment variable: {}", port);
            config.server.port = port;
        } else {
            warn!("Invalid PORT environment variable: {}", port_str);
        }
    }
}
