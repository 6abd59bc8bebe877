// src/sender/direct.rs

use crate::config::{EmitterConfig, PointTags};
use crate::error::SendError;
use crate::sender::line::{delta_counter_name, metric_line};
use crate::sender::MetricsSender;
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use secrecy::{ExposeSecret, SecretString};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_SOURCE: &str = "wavefront_direct_sender";

/// Snapshot of a [`DirectSender`]'s counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SenderStats {
    pub sent: u64,
    pub dropped: u64,
    pub failed_flushes: u64,
    pub buffered: usize,
}

/// Batching sender that posts line-protocol points straight to the
/// ingestion endpoint.
///
/// Points are encoded when they are sent and parked in a bounded buffer. A
/// background task ships one batch per flush interval; [`MetricsSender::flush`]
/// drains the whole buffer.
pub struct DirectSender {
    inner: Arc<Inner>,
    shutdown: Arc<Notify>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    client: reqwest::Client,
    report_url: Url,
    token: SecretString,
    default_source: String,
    batch_size: usize,
    capacity: usize,
    buffer: Mutex<VecDeque<String>>,
    flush_lock: tokio::sync::Mutex<()>,
    closed: AtomicBool,
    sent: AtomicU64,
    dropped: AtomicU64,
    failed_flushes: AtomicU64,
}

impl DirectSender {
    /// Creates the sender and starts its flush task on the current Tokio runtime.
    pub fn new(config: &EmitterConfig) -> Result<Self, SendError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| SendError::NoRuntime)?;

        let report_url = report_url(&config.server)?;
        if config.token.expose_secret().trim().is_empty() {
            return Err(SendError::MissingToken);
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(SendError::Client)?;

        let batch_size = config.effective_batch_size();
        let capacity = config.effective_max_buffer_size();
        let period = Duration::from_secs(config.effective_flush_interval());

        let inner = Arc::new(Inner {
            client,
            report_url,
            token: config.token.clone(),
            default_source: default_source(),
            batch_size,
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity.min(batch_size))),
            flush_lock: tokio::sync::Mutex::new(()),
            closed: AtomicBool::new(false),
            sent: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            failed_flushes: AtomicU64::new(0),
        });

        let shutdown = Arc::new(Notify::new());
        let worker = runtime.spawn(flush_loop(inner.clone(), period, shutdown.clone()));

        info!(
            sender.endpoint = %inner.report_url,
            sender.default_source = %inner.default_source,
            sender.batch_size = batch_size,
            sender.max_buffer_size = capacity,
            sender.flush_interval_secs = period.as_secs(),
            "Direct sender started"
        );

        Ok(Self {
            inner,
            shutdown,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn stats(&self) -> SenderStats {
        SenderStats {
            sent: self.inner.sent.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
            failed_flushes: self.inner.failed_flushes.load(Ordering::Relaxed),
            buffered: self.inner.buffer.lock().len(),
        }
    }
}

impl Drop for DirectSender {
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}

#[async_trait]
impl MetricsSender for DirectSender {
    fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp: i64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError> {
        let line = metric_line(
            name,
            value,
            Some(timestamp),
            self.inner.source_or_default(source),
            tags,
        )?;
        self.inner.enqueue(line)
    }

    fn send_delta_counter(
        &self,
        name: &str,
        value: f64,
        source: &str,
        tags: &PointTags,
    ) -> Result<(), SendError> {
        if name.is_empty() {
            return Err(SendError::InvalidPoint("empty metric name".into()));
        }
        // Non-positive deltas carry no information for the backend.
        if value <= 0.0 {
            return Ok(());
        }
        let line = metric_line(
            &delta_counter_name(name),
            value,
            None,
            self.inner.source_or_default(source),
            tags,
        )?;
        self.inner.enqueue(line)
    }

    async fn flush(&self) -> Result<(), SendError> {
        self.inner.flush_all().await
    }

    async fn close(&self) -> Result<(), SendError> {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.shutdown.notify_one();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                warn!(error = %e, "Flush task ended abnormally");
            }
        }

        let result = self.inner.flush_all().await;
        info!(stats = ?self.stats(), "Direct sender closed");
        result
    }
}

impl Inner {
    fn source_or_default<'a>(&'a self, source: &'a str) -> &'a str {
        if source.is_empty() {
            &self.default_source
        } else {
            source
        }
    }

    fn enqueue(&self, line: String) -> Result<(), SendError> {
        if self.closed.load(Ordering::Relaxed) {
            return Err(SendError::Closed);
        }

        let mut buffer = self.buffer.lock();
        if buffer.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(SendError::BufferFull {
                capacity: self.capacity,
            });
        }
        buffer.push_back(line);
        Ok(())
    }

    /// Ships at most one batch. Returns the number of points delivered.
    async fn flush_batch(&self) -> Result<usize, SendError> {
        let batch: Vec<String> = {
            let mut buffer = self.buffer.lock();
            let count = buffer.len().min(self.batch_size);
            buffer.drain(..count).collect()
        };
        if batch.is_empty() {
            return Ok(0);
        }

        let count = batch.len();
        match self.report(&batch).await {
            Ok(()) => {
                self.sent.fetch_add(count as u64, Ordering::Relaxed);
                debug!(points = count, "Flushed batch");
                Ok(count)
            }
            Err(e) => {
                self.failed_flushes.fetch_add(1, Ordering::Relaxed);
                self.requeue(batch);
                Err(e)
            }
        }
    }

    async fn flush_all(&self) -> Result<(), SendError> {
        let _guard = self.flush_lock.lock().await;
        while self.flush_batch().await? > 0 {}
        Ok(())
    }

    async fn report(&self, batch: &[String]) -> Result<(), SendError> {
        let mut body = batch.join("\n");
        body.push('\n');

        let response = self
            .client
            .post(self.report_url.clone())
            .bearer_auth(self.token.expose_secret())
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(body)
            .send()
            .await
            .map_err(SendError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SendError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    /// Puts a failed batch back at the front, oldest first, as far as space allows.
    fn requeue(&self, batch: Vec<String>) {
        let mut buffer = self.buffer.lock();
        let room = self.capacity.saturating_sub(buffer.len());
        let keep = batch.len().min(room);
        let lost = batch.len() - keep;

        for line in batch.into_iter().take(keep).rev() {
            buffer.push_front(line);
        }
        if lost > 0 {
            self.dropped.fetch_add(lost as u64, Ordering::Relaxed);
        }
    }
}

async fn flush_loop(inner: Arc<Inner>, period: Duration, shutdown: Arc<Notify>) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut last_dropped = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let flushed = {
                    let _guard = inner.flush_lock.lock().await;
                    inner.flush_batch().await
                };
                if let Err(e) = flushed {
                    warn!(error = %e, "Failed to flush points, batch kept for retry");
                }

                let dropped = inner.dropped.load(Ordering::Relaxed);
                if dropped > last_dropped {
                    warn!(dropped = dropped - last_dropped, "Points dropped since last flush");
                    last_dropped = dropped;
                }
            }
            _ = shutdown.notified() => break,
        }
    }
    debug!("Flush task stopped");
}

/// Source used for points sent without one: the host name, or a fixed name
/// when it cannot be determined.
fn default_source() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_SOURCE.to_string())
}

fn report_url(server: &str) -> Result<Url, SendError> {
    let invalid = |reason: String| SendError::InvalidServer {
        url: server.to_string(),
        reason,
    };

    let base = Url::parse(server).map_err(|e| invalid(e.to_string()))?;
    match base.scheme() {
        "http" | "https" => {}
        scheme => return Err(invalid(format!("unsupported scheme '{scheme}'"))),
    }

    let mut url = Url::parse(&format!("{}/report", server.trim_end_matches('/')))
        .map_err(|e| invalid(e.to_string()))?;
    url.query_pairs_mut().append_pair("f", "wavefront");
    Ok(url)
}
