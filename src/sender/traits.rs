// src/sender/traits.rs

use crate::config::PointTags;
use crate::error::SendError;
use async_trait::async_trait;

/// A sink for metric points.
///
/// `send_*` calls only hand the point over; implementations must not block
/// on the network inside them. Delivery happens on `flush`, either driven by
/// the implementation itself or by the caller.
#[async_trait]
pub trait MetricsSender: Send + Sync {
    /// Send an instantaneous (gauge-style) value.
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp: i64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError>;

    /// Send an increment that the backend adds to a running total.
    fn send_delta_counter(
        &self,
        name: &str,
        value: f64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError>;

    /// Push everything buffered so far.
    async fn flush(&self) -> Result<(), SendError> {
        Ok(())
    }

    /// Stop accepting points and flush what is left.
    async fn close(&self) -> Result<(), SendError> {
        self.flush().await
    }
}
