// ABOUTME: Batched metrics polling shared by every mounted node
// ABOUTME: Registrations are served by one periodic POST /api/metrics/batch and fanned out to callbacks

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use diagram_core::{entry_error, MetricBatchResponse, MetricQuery};
use serde_json::Value;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::http::ApiClient;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// The server reached the metric URL but it failed
    #[error("{0}")]
    Upstream(String),

    #[error("No data in batch response")]
    NoData,

    #[error("Batch request failed: {0}")]
    BatchFailed(String),
}

pub type SuccessCallback = Arc<dyn Fn(Value) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(MetricError) + Send + Sync>;

/// Network seam of the batcher
#[async_trait]
pub trait BatchTransport: Send + Sync {
    async fn fetch_batch(&self, queries: &[MetricQuery])
        -> Result<MetricBatchResponse, MetricError>;
}

#[async_trait]
impl BatchTransport for ApiClient {
    async fn fetch_batch(
        &self,
        queries: &[MetricQuery],
    ) -> Result<MetricBatchResponse, MetricError> {
        let response = self
            .http()
            .post(self.api_url("/api/metrics/batch"))
            .json(queries)
            .send()
            .await
            .map_err(|e| MetricError::BatchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetricError::BatchFailed(status.as_u16().to_string()));
        }

        response
            .json::<MetricBatchResponse>()
            .await
            .map_err(|e| MetricError::BatchFailed(e.to_string()))
    }
}

#[derive(Clone)]
struct Registration {
    id: u64,
    query: MetricQuery,
    on_success: SuccessCallback,
    on_error: ErrorCallback,
}

struct Inner {
    transport: Arc<dyn BatchTransport>,
    registry: Mutex<HashMap<String, Registration>>,
    next_id: AtomicU64,
}

impl Inner {
    fn remove_if_current(&self, key: &str, id: u64) {
        if let Ok(mut registry) = self.registry.lock() {
            if registry.get(key).is_some_and(|r| r.id == id) {
                registry.remove(key);
                debug!("Unregistered metric {}", key);
            }
        }
    }
}

/// Process-wide metric batching service; clones share one registry
#[derive(Clone)]
pub struct MetricsBatcher {
    inner: Arc<Inner>,
}

impl MetricsBatcher {
    pub fn new(transport: Arc<dyn BatchTransport>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                registry: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a metric request. A later registration with the same node and
    /// url replaces this one. Dropping the handle unregisters it.
    pub fn register<S, E>(&self, url: &str, node: &str, on_success: S, on_error: E) -> MetricHandle
    where
        S: Fn(Value) + Send + Sync + 'static,
        E: Fn(MetricError) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let query = MetricQuery::new(node, url);
        let key = query.key.clone();

        let registration = Registration {
            id,
            query,
            on_success: Arc::new(on_success),
            on_error: Arc::new(on_error),
        };
        if let Ok(mut registry) = self.inner.registry.lock() {
            if registry.insert(key.clone(), registration).is_some() {
                debug!("Replaced metric registration {}", key);
            }
        }

        MetricHandle {
            key,
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn registered(&self) -> usize {
        self.inner.registry.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Execute one batch cycle over the current registrations
    pub async fn run_cycle(&self) {
        run_cycle(&self.inner).await;
    }

    /// Run one cycle after `initial_delay` and another at every multiple of
    /// `period` counted from the call. The task ends once every batcher clone is dropped.
    pub fn start(&self, initial_delay: Duration, period: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        info!(
            "Starting metrics batching (first cycle in {:?}, then every {:?})",
            initial_delay, period
        );

        let started = Instant::now();
        tokio::spawn(async move {
            sleep(initial_delay).await;
            match weak.upgrade() {
                Some(inner) => run_cycle(&inner).await,
                None => return,
            }

            let mut ticker = interval_at(started + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    debug!("Metrics batcher dropped, stopping schedule");
                    break;
                };
                run_cycle(&inner).await;
            }
        })
    }
}

async fn run_cycle(inner: &Inner) {
    let snapshot: Vec<Registration> = match inner.registry.lock() {
        Ok(registry) => registry.values().cloned().collect(),
        Err(_) => return,
    };
    if snapshot.is_empty() {
        debug!("No metric registrations, skipping batch");
        return;
    }

    let queries: Vec<MetricQuery> = snapshot.iter().map(|r| r.query.clone()).collect();
    debug!("Fetching {} metric(s) in one batch", queries.len());

    match inner.transport.fetch_batch(&queries).await {
        Ok(results) => {
            for registration in snapshot {
                match results.get(&registration.query.key) {
                    Some(entry) => match entry_error(entry) {
                        Some(message) => (registration.on_error)(MetricError::Upstream(message)),
                        None => (registration.on_success)(entry.clone()),
                    },
                    None => (registration.on_error)(MetricError::NoData),
                }
            }
        }
        Err(e) => {
            warn!("Metrics batch failed: {}", e);
            for registration in snapshot {
                (registration.on_error)(e.clone());
            }
        }
    }
}

/// Keeps a metric registered; unregisters on drop
pub struct MetricHandle {
    key: String,
    id: u64,
    inner: Weak<Inner>,
}

impl MetricHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn unregister(self) {}
}

impl Drop for MetricHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.remove_if_current(&self.key, self.id);
        }
    }
}
