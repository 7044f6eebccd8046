// ABOUTME: Lifecycle of one rendered node
// ABOUTME: Owns the node's status poller and metric registrations and releases them on unmount

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use diagram_config::FailurePolicy;
use diagram_core::{lookup_field, DiagramNode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::metrics::{MetricHandle, MetricsBatcher};
use crate::status::{NodeStatus, StatusPoller};

/// Latest value of one data-grid row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum MetricValue {
    Loading,
    Ready(Value),
    /// The payload arrived but has no such field
    Missing,
    Failed(String),
}

/// Shared services a node needs while mounted
#[derive(Clone)]
pub struct NodeServices {
    pub http: reqwest::Client,
    pub batcher: MetricsBatcher,
    pub failure_policy: FailurePolicy,
}

type MetricValues = Arc<Mutex<BTreeMap<String, MetricValue>>>;

pub struct NodeMount {
    name: String,
    poller: Option<StatusPoller>,
    metric_handles: Vec<MetricHandle>,
    values: MetricValues,
}

impl NodeMount {
    pub fn mount(node: &DiagramNode, services: &NodeServices) -> Self {
        let poller = node.status.clone().map(|status| {
            StatusPoller::spawn(services.http.clone(), status, services.failure_policy)
        });

        let values: MetricValues = Arc::new(Mutex::new(
            node.data_grid
                .iter()
                .map(|row| (row.label.clone(), MetricValue::Loading))
                .collect(),
        ));

        let metric_handles = node
            .data_grid
            .iter()
            .map(|row| {
                let ok_values = values.clone();
                let err_values = values.clone();
                let ok_label = row.label.clone();
                let err_label = row.label.clone();
                let field = row.value_field.clone();

                services.batcher.register(
                    &row.url,
                    &node.name,
                    move |payload| {
                        let value = match lookup_field(&payload, &field) {
                            Some(value) => MetricValue::Ready(value.clone()),
                            None => MetricValue::Missing,
                        };
                        if let Ok(mut values) = ok_values.lock() {
                            values.insert(ok_label.clone(), value);
                        }
                    },
                    move |error| {
                        debug!("Metric '{}' failed: {}", err_label, error);
                        if let Ok(mut values) = err_values.lock() {
                            values.insert(err_label.clone(), MetricValue::Failed(error.to_string()));
                        }
                    },
                )
            })
            .collect();

        debug!(
            "Mounted node '{}' (status polling: {}, metrics: {})",
            node.name,
            poller.is_some(),
            node.data_grid.len()
        );

        Self {
            name: node.name.clone(),
            poller,
            metric_handles,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current status; `None` when the node declares no status endpoint
    pub fn status(&self) -> Option<NodeStatus> {
        self.poller.as_ref().map(StatusPoller::status)
    }

    pub fn metric(&self, label: &str) -> Option<MetricValue> {
        self.values.lock().ok()?.get(label).cloned()
    }

    pub fn metrics(&self) -> BTreeMap<String, MetricValue> {
        self.values
            .lock()
            .map(|values| values.clone())
            .unwrap_or_default()
    }

    /// Stop status polling and unregister every metric
    pub fn unmount(self) {
        info!("Unmounting node '{}'", self.name);
    }
}

impl Drop for NodeMount {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop();
        }
        self.metric_handles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{BatchTransport, MetricError};
    use async_trait::async_trait;
    use diagram_core::{DataGridItem, MetricBatchResponse, MetricQuery};
    use serde_json::json;

    struct StaticTransport(MetricBatchResponse);

    #[async_trait]
    impl BatchTransport for StaticTransport {
        async fn fetch_batch(
            &self,
            _queries: &[MetricQuery],
        ) -> Result<MetricBatchResponse, MetricError> {
            Ok(self.0.clone())
        }
    }

    fn node() -> DiagramNode {
        let mut node = DiagramNode::named("rabbitmq");
        node.data_grid = vec![
            DataGridItem {
                label: "Queued".to_string(),
                url: "http://rmq/api/overview".to_string(),
                value_field: "queue_totals.messages".to_string(),
            },
            DataGridItem {
                label: "Rate".to_string(),
                url: "http://rmq/api/rates".to_string(),
                value_field: "publish".to_string(),
            },
        ];
        node
    }

    fn services(response: MetricBatchResponse) -> NodeServices {
        NodeServices {
            http: reqwest::Client::new(),
            batcher: MetricsBatcher::new(Arc::new(StaticTransport(response))),
            failure_policy: FailurePolicy::Down,
        }
    }

    #[tokio::test]
    async fn test_metrics_start_loading_then_update() {
        let mut response = MetricBatchResponse::new();
        response.insert(
            "rabbitmq-http://rmq/api/overview".to_string(),
            json!({"queue_totals": {"messages": 12}}),
        );
        response.insert("rabbitmq-http://rmq/api/rates".to_string(), json!({"other": 1}));
        let services = services(response);

        let mount = NodeMount::mount(&node(), &services);
        assert_eq!(mount.metric("Queued"), Some(MetricValue::Loading));
        assert!(mount.status().is_none());

        services.batcher.run_cycle().await;
        assert_eq!(mount.metric("Queued"), Some(MetricValue::Ready(json!(12))));
        assert_eq!(mount.metric("Rate"), Some(MetricValue::Missing));
    }

    #[tokio::test]
    async fn test_unmount_unregisters_metrics() {
        let services = services(MetricBatchResponse::new());
        let mount = NodeMount::mount(&node(), &services);
        assert_eq!(services.batcher.registered(), 2);

        mount.unmount();
        assert_eq!(services.batcher.registered(), 0);
    }

    #[tokio::test]
    async fn test_missing_entry_marks_failed() {
        let services = services(MetricBatchResponse::new());
        let mount = NodeMount::mount(&node(), &services);

        services.batcher.run_cycle().await;
        assert_eq!(
            mount.metric("Rate"),
            Some(MetricValue::Failed("No data in batch response".to_string()))
        );
    }

    #[test]
    fn test_metric_value_wire_form() {
        assert_eq!(
            serde_json::to_value(MetricValue::Ready(json!(3))).unwrap(),
            json!({"state": "ready", "value": 3})
        );
        assert_eq!(
            serde_json::to_value(MetricValue::Loading).unwrap(),
            json!({"state": "loading"})
        );
    }
}
