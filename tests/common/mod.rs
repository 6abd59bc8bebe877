//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tower::ServiceExt;
use wavefront_emitter::{config::PointTags, EmitterConfig, MetricsSender, SendError};

/// A point as the sender received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPoint {
    pub name: String,
    pub value: f64,
    /// `None` for delta counters.
    pub timestamp: Option<i64>,
    pub source: String,
    pub tags: PointTags,
}

impl RecordedPoint {
    pub fn is_delta_counter(&self) -> bool {
        self.timestamp.is_none()
    }
}

/// Sender that keeps every point in memory.
#[derive(Default)]
pub struct RecordingSender {
    points: Mutex<Vec<RecordedPoint>>,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn points(&self) -> Vec<RecordedPoint> {
        self.points.lock().clone()
    }

    pub fn gauges(&self) -> Vec<RecordedPoint> {
        self.points().into_iter().filter(|p| !p.is_delta_counter()).collect()
    }

    pub fn counters(&self) -> Vec<RecordedPoint> {
        self.points().into_iter().filter(RecordedPoint::is_delta_counter).collect()
    }

    pub fn point(&self, name: &str) -> Option<RecordedPoint> {
        self.points().into_iter().find(|p| p.name == name)
    }
}

#[async_trait]
impl MetricsSender for RecordingSender {
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp: i64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError> {
        self.points.lock().push(RecordedPoint {
            name: name.to_string(),
            value,
            timestamp: Some(timestamp),
            source: source.to_string(),
            tags: tags.clone(),
        });
        Ok(())
    }

    fn send_delta_counter(
        &self,
        name: &str,
        value: f64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError> {
        self.points.lock().push(RecordedPoint {
            name: name.to_string(),
            value,
            timestamp: None,
            source: source.to_string(),
            tags: tags.clone(),
        });
        Ok(())
    }
}

/// Sender that refuses every point.
pub struct FailingSender;

#[async_trait]
impl MetricsSender for FailingSender {
    fn send_metric(
        &self,
        _name: &str,
        _value: f64,
        _timestamp: i64,
        _source: &str,
        _tags: &PointTags,
    ) -> Result<(), SendError> {
        Err(SendError::Closed)
    }

    fn send_delta_counter(
        &self,
        _name: &str,
        _value: f64,
        _source: &str,
        _tags: &PointTags,
    ) -> Result<(), SendError> {
        Err(SendError::Closed)
    }

    async fn flush(&self) -> Result<(), SendError> {
        Err(SendError::Closed)
    }
}

/// Sender that accepts and discards every point.
pub struct NoopSender;

#[async_trait]
impl MetricsSender for NoopSender {
    fn send_metric(
        &self,
        _name: &str,
        _value: f64,
        _timestamp: i64,
        _source: &str,
        _tags: &PointTags,
    ) -> Result<(), SendError> {
        Ok(())
    }

    fn send_delta_counter(
        &self,
        _name: &str,
        _value: f64,
        _source: &str,
        _tags: &PointTags,
    ) -> Result<(), SendError> {
        Ok(())
    }
}

pub fn test_config() -> EmitterConfig {
    EmitterConfig::default()
        .with_source("my-app")
        .with_metric_prefix("my.awesome.app")
}

/// Response parts that a client can observe.
#[derive(Debug, PartialEq)]
pub struct Observed {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

pub async fn send(app: Router, request: Request<Body>) -> Observed {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status().as_u16();
    let mut headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    headers.sort();
    let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();

    Observed {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
