use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::time::Instant;

use crate::metrics::request::{response_size, RequestInfo};
use crate::metrics::{Measurement, WavefrontEmitter};

/// Measures one request/response cycle and hands five points to the sender:
/// latency, bytes in, bytes out and one status-class counter.
///
/// The response is returned exactly as the inner service produced it.
/// Nothing is emitted if the request future is dropped before `next` returns.
pub async fn emit_metrics(
    State(emitter): State<WavefrontEmitter>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let info = RequestInfo::from_request(&request);

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let measurement = Measurement {
        latency_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        timestamp: Utc::now().timestamp(),
        status: response.status().as_u16(),
        bytes_in: info.content_length,
        bytes_out: response_size(&response),
    };

    let tags = emitter.request_tags(&info);
    emitter.emit(&measurement, &tags);

    response
}
