// src/config/validation.rs

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use tracing::{debug, warn};

/// Checks the parts of the configuration this crate owns.
///
/// Emitter fields are handed to the sender as-is; the sender rejects what it
/// cannot use when it is created.
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_server_config(config) {
            warn!("Server config validation failed: {}", e);
            return Err(e);
        }
        debug!("Server config validation passed");

        Self::check_emitter_config(config);

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_server_config(config: &AppConfig) -> Result<()> {
        if config.server.port == 0 {
            return Err(AppError::config_validation(
                "Server port cannot be 0",
                Some("server.port"),
            ));
        }

        if config.server.host.trim().is_empty() {
            return Err(AppError::config_validation(
                "Server host cannot be empty",
                Some("server.host"),
            ));
        }

        Ok(())
    }

    fn check_emitter_config(config: &AppConfig) {
        if config.emitter.source.is_empty() {
            warn!("emitter.source is empty; the direct sender will use the host name");
        }
        if config.emitter.metric_prefix.is_empty() {
            warn!("emitter.metric_prefix is empty; metric names will start with '.'");
        }
    }
}
