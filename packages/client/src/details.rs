// ABOUTME: On-demand node detail lookup with a session cache
// ABOUTME: 404 is cached as absence, concurrent loads share one request, other failures are retried later

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use diagram_core::{default_details, sanitize_details, DiagramNode, NodeDetailConfig};
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use serde_json::Value;
use tracing::{debug, warn};

use crate::http::ApiClient;

#[derive(Debug, Clone)]
enum FetchOutcome {
    Found(NodeDetailConfig),
    Absent,
    Failed,
}

type InFlight = Shared<BoxFuture<'static, FetchOutcome>>;

struct Inner {
    api: ApiClient,
    cache: Mutex<HashMap<String, Option<NodeDetailConfig>>>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

#[derive(Clone)]
pub struct NodeDetailsResolver {
    inner: Arc<Inner>,
}

async fn fetch_details(api: ApiClient, node_name: String) -> FetchOutcome {
    match api.get_json::<Value>(&api.node_details_url(&node_name)).await {
        Ok(value) => {
            debug!("Loaded details for node '{}'", node_name);
            FetchOutcome::Found(sanitize_details(&value))
        }
        Err(e) if e.is_not_found() => {
            debug!("No details document for node '{}'", node_name);
            FetchOutcome::Absent
        }
        Err(e) => {
            warn!("Failed to load details for node '{}': {}", node_name, e);
            FetchOutcome::Failed
        }
    }
}

impl NodeDetailsResolver {
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                cache: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    fn cached(&self, node_name: &str) -> Option<Option<NodeDetailConfig>> {
        self.inner
            .cache
            .lock()
            .ok()
            .and_then(|cache| cache.get(node_name).cloned())
    }

    pub fn is_cached(&self, node_name: &str) -> bool {
        self.cached(node_name).is_some()
    }

    /// Detail document of a node, or `None` when it has none or it could not be loaded
    pub async fn load(&self, node_name: &str) -> Option<NodeDetailConfig> {
        if let Some(hit) = self.cached(node_name) {
            return hit;
        }

        let request = {
            let Ok(mut in_flight) = self.inner.in_flight.lock() else {
                return None;
            };
            in_flight
                .entry(node_name.to_string())
                .or_insert_with(|| {
                    fetch_details(self.inner.api.clone(), node_name.to_string())
                        .boxed()
                        .shared()
                })
                .clone()
        };

        let outcome = request.clone().await;

        let result = match &outcome {
            FetchOutcome::Found(details) => Some(details.clone()),
            FetchOutcome::Absent | FetchOutcome::Failed => None,
        };
        if !matches!(outcome, FetchOutcome::Failed) {
            if let Ok(mut cache) = self.inner.cache.lock() {
                cache.insert(node_name.to_string(), result.clone());
            }
        }
        // a later load may already own a fresh request for this node
        if let Ok(mut in_flight) = self.inner.in_flight.lock() {
            if in_flight
                .get(node_name)
                .is_some_and(|current| current.ptr_eq(&request))
            {
                in_flight.remove(node_name);
            }
        }

        result
    }

    /// Detail document of a node, falling back to the page built from the node itself
    pub async fn load_or_default(&self, node: &DiagramNode) -> NodeDetailConfig {
        match self.load(&node.name).await {
            Some(details) => details,
            None => default_details(node),
        }
    }

    /// Drop one cached entry, or all of them
    pub fn clear(&self, node_name: Option<&str>) {
        if let Ok(mut cache) = self.inner.cache.lock() {
            match node_name {
                Some(name) => {
                    cache.remove(name);
                }
                None => cache.clear(),
            }
        }
    }

    /// Warm the cache for many nodes at once; failures are ignored
    pub async fn preload<S: AsRef<str>>(&self, node_names: &[S]) {
        join_all(node_names.iter().map(|name| self.load(name.as_ref()))).await;
    }
}
