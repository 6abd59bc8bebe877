//! Request metrics emitter.
//!
//! [`WavefrontEmitter`] wraps an axum router and, for every request, emits:
//!
//! - `{prefix}.latency`: handler time in whole milliseconds
//! - `{prefix}.bytes.in`: request body size (`-1` when unknown)
//! - `{prefix}.bytes.out`: response body size (`-1` when unknown)
//! - one delta counter of 1: `{prefix}.status.success`, `.status.redirection`,
//!   `.status.error.client` or `.status.error.server`, chosen by status code.
//!
//! Every point carries the configured source, the configured point tags and
//! four request tags: `path`, `clientIP`, `method`, `userAgent`. Tags are
//! built per request; the configuration is never mutated.

#[cfg(feature = "prometheus")]
pub mod exporters;
pub mod middleware;
pub mod request;
pub mod status;

pub use middleware::emit_metrics;
pub use request::RequestInfo;
pub use status::StatusClass;

use axum::Router;
use std::sync::Arc;

use crate::config::{EmitterConfig, PointTags};
use crate::error::{AppError, Result, SendError};
use crate::sender::{DirectSender, MetricsSender};

pub const LATENCY_SUFFIX: &str = ".latency";
pub const BYTES_IN_SUFFIX: &str = ".bytes.in";
pub const BYTES_OUT_SUFFIX: &str = ".bytes.out";

pub const TAG_PATH: &str = "path";
pub const TAG_CLIENT_IP: &str = "clientIP";
pub const TAG_METHOD: &str = "method";
pub const TAG_USER_AGENT: &str = "userAgent";

/// Called with the metric name and the error whenever the sender refuses a point.
pub type ErrorObserver = Arc<dyn Fn(&str, &SendError) + Send + Sync>;

/// Values measured for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub latency_ms: u64,
    /// Unix seconds at the end of the request.
    pub timestamp: i64,
    pub status: u16,
    pub bytes_in: i64,
    pub bytes_out: i64,
}

/// Emits request metrics through a [`MetricsSender`].
///
/// Cheap to clone; clones share the configuration and the sender.
#[derive(Clone)]
pub struct WavefrontEmitter {
    config: Arc<EmitterConfig>,
    sender: Arc<dyn MetricsSender>,
    on_error: Option<ErrorObserver>,
}

impl WavefrontEmitter {
    /// Creates a [`DirectSender`] from `config` and an emitter on top of it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: EmitterConfig) -> Result<Self> {
        let sender = DirectSender::new(&config).map_err(AppError::SenderCreation)?;
        Ok(Self::with_sender(config, Arc::new(sender)))
    }

    pub fn with_sender(config: EmitterConfig, sender: Arc<dyn MetricsSender>) -> Self {
        Self {
            config: Arc::new(config),
            sender,
            on_error: None,
        }
    }

    /// Reports emission failures to `observer` instead of dropping them silently.
    /// The request path is unaffected either way.
    pub fn with_error_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&str, &SendError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(observer));
        self
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    /// The underlying sender, e.g. to flush or close it on shutdown.
    pub fn sender(&self) -> Arc<dyn MetricsSender> {
        self.sender.clone()
    }

    /// Wraps every route of `router` (fallback included) with [`emit_metrics`].
    pub fn apply<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(axum::middleware::from_fn_with_state(
            self.clone(),
            emit_metrics,
        ))
    }

    /// Configured point tags plus the four request tags.
    pub fn request_tags(&self, info: &RequestInfo) -> PointTags {
        let mut tags = self.config.point_tags.clone();
        tags.insert(TAG_PATH.to_string(), info.path.clone());
        tags.insert(TAG_CLIENT_IP.to_string(), info.client_ip.clone());
        tags.insert(TAG_METHOD.to_string(), info.method.clone());
        tags.insert(TAG_USER_AGENT.to_string(), info.user_agent.clone());
        tags
    }

    /// Hands the points for one measurement to the sender.
    pub fn emit(&self, measurement: &Measurement, tags: &PointTags) {
        let source = self.config.source.as_str();
        let gauges = [
            (LATENCY_SUFFIX, measurement.latency_ms as f64),
            (BYTES_IN_SUFFIX, measurement.bytes_in as f64),
            (BYTES_OUT_SUFFIX, measurement.bytes_out as f64),
        ];

        for (suffix, value) in gauges {
            let name = self.config.metric_name(suffix);
            let result = self
                .sender
                .send_metric(&name, value, measurement.timestamp, source, tags);
            self.observe(&name, result);
        }

        if let Some(class) = StatusClass::from_code(measurement.status) {
            let name = self.config.metric_name(class.metric_suffix());
            let result = self.sender.send_delta_counter(&name, 1.0, source, tags);
            self.observe(&name, result);
        }
    }

    fn observe(&self, name: &str, result: std::result::Result<(), SendError>) {
        if let (Err(e), Some(on_error)) = (result, &self.on_error) {
            on_error(name, &e);
        }
    }
}

impl std::fmt::Debug for WavefrontEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavefrontEmitter")
            .field("config", &self.config)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}
