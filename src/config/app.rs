// src/config/app.rs

use secrecy::SecretString;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Key/value pairs attached to every emitted point.
pub type PointTags = BTreeMap<String, String>;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 50_000;
pub const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 1;

/// Configures the direct-ingestion sender and the points the emitter produces.
#[derive(Debug, Deserialize, Clone)]
pub struct EmitterConfig {
    /// Wavefront URL of the form `https://<INSTANCE>.wavefront.com`.
    #[serde(default)]
    pub server: String,
    /// API token with direct data ingestion permission.
    #[serde(default = "empty_token")]
    pub token: SecretString,
    /// Max points sent per flush.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Max points held in memory while waiting for a flush.
    #[serde(default = "default_max_buffer_size")]
    pub max_buffer_size: usize,
    /// Interval (in seconds) at which buffered points are flushed.
    #[serde(default = "default_flush_interval")]
    pub flush_interval: u64,
    /// Name of the app that emits metrics.
    #[serde(default)]
    pub source: String,
    /// Prefix added to all metric names.
    #[serde(default)]
    pub metric_prefix: String,
    #[serde(default)]
    pub point_tags: PointTags,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            token: empty_token(),
            batch_size: default_batch_size(),
            max_buffer_size: default_max_buffer_size(),
            flush_interval: default_flush_interval(),
            source: String::new(),
            metric_prefix: String::new(),
            point_tags: PointTags::new(),
        }
    }
}

impl EmitterConfig {
    pub fn new(server: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            token: SecretString::new(token.into()),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_metric_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metric_prefix = prefix.into();
        self
    }

    pub fn with_point_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.point_tags.insert(key.into(), value.into());
        self
    }

    /// Batch size with the zero value mapped to the default.
    pub fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            self.batch_size
        }
    }

    pub fn effective_max_buffer_size(&self) -> usize {
        if self.max_buffer_size == 0 {
            DEFAULT_MAX_BUFFER_SIZE
        } else {
            self.max_buffer_size
        }
    }

    pub fn effective_flush_interval(&self) -> u64 {
        if self.flush_interval == 0 {
            DEFAULT_FLUSH_INTERVAL_SECS
        } else {
            self.flush_interval
        }
    }

    /// Full metric name for a suffix such as `.latency`.
    pub fn metric_name(&self, suffix: &str) -> String {
        let mut name = String::with_capacity(self.metric_prefix.len() + suffix.len());
        name.push_str(&self.metric_prefix);
        name.push_str(suffix);
        name
    }
}

/// Where the demo server sends its points.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Direct,
    Prometheus,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub emitter: EmitterConfig,
    #[serde(default)]
    pub sink: SinkKind,
}

// Default value functions
fn empty_token() -> SecretString {
    SecretString::new(String::new())
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_buffer_size() -> usize {
    DEFAULT_MAX_BUFFER_SIZE
}

fn default_flush_interval() -> u64 {
    DEFAULT_FLUSH_INTERVAL_SECS
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8083
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_defaults_match_direct_sender_defaults() {
        let config = EmitterConfig::default();
        assert_eq!(config.batch_size, 10_000);
        assert_eq!(config.max_buffer_size, 50_000);
        assert_eq!(config.flush_interval, 1);
        assert!(config.point_tags.is_empty());
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let config = EmitterConfig {
            batch_size: 0,
            max_buffer_size: 0,
            flush_interval: 0,
            ..EmitterConfig::default()
        };
        assert_eq!(config.effective_batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(config.effective_max_buffer_size(), DEFAULT_MAX_BUFFER_SIZE);
        assert_eq!(config.effective_flush_interval(), DEFAULT_FLUSH_INTERVAL_SECS);
    }

    #[test]
    fn test_missing_point_tags_deserialize_to_empty_map() {
        let yaml = "server: https://example.wavefront.com\ntoken: abc\nsource: my-app\n";
        let config: EmitterConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.point_tags.is_empty());
        assert_eq!(config.token.expose_secret(), "abc");
    }

    #[test]
    fn test_metric_name_joins_prefix_and_suffix() {
        let config = EmitterConfig::default().with_metric_prefix("my.awesome.app");
        assert_eq!(config.metric_name(".latency"), "my.awesome.app.latency");
    }

    #[test]
    fn test_sink_kind_parses_lowercase() {
        let config: AppConfig = serde_yaml::from_str("sink: prometheus\n").unwrap();
        assert_eq!(config.sink, SinkKind::Prometheus);
        assert_eq!(config.server.port, 8083);
    }
}
