// src/sender/facade.rs

use crate::config::PointTags;
use crate::error::SendError;
use crate::metrics::{TAG_CLIENT_IP, TAG_USER_AGENT};
use crate::sender::MetricsSender;
use async_trait::async_trait;
use metrics::{counter, gauge, Label};

/// Forwards points to whatever recorder is installed for the `metrics` facade,
/// e.g. the Prometheus exporter.
///
/// Tags and the source become labels, except the per-client `clientIP` and
/// `userAgent`: the recorder keeps every label set it sees. Timestamps are
/// dropped; the recorder stamps samples itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSender;

impl FacadeSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MetricsSender for FacadeSender {
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        _timestamp: i64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError> {
        let name = facade_name(name)?;
        gauge!(name, labels(source, tags)).set(value);
        Ok(())
    }

    fn send_delta_counter(
        &self,
        name: &str,
        value: f64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError> {
        let name = facade_name(name)?;
        if value <= 0.0 {
            return Ok(());
        }
        counter!(name, labels(source, tags)).increment(value.round() as u64);
        Ok(())
    }
}

/// Prometheus-safe metric name: dots and other separators become `_`.
fn facade_name(name: &str) -> Result<String, SendError> {
    if name.is_empty() {
        return Err(SendError::InvalidPoint("empty metric name".into()));
    }
    Ok(name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect())
}

fn labels(source: &str, tags: &PointTags) -> Vec<Label> {
    let mut labels = Vec::with_capacity(tags.len() + 1);
    labels.push(Label::new("source", source.to_string()));
    labels.extend(
        tags.iter()
            .filter(|(k, _)| !is_per_client_tag(k))
            .map(|(k, v)| Label::new(facade_label_key(k), v.clone())),
    );
    labels
}

fn is_per_client_tag(key: &str) -> bool {
    key == TAG_CLIENT_IP || key == TAG_USER_AGENT
}

fn facade_label_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}
