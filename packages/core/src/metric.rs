// ABOUTME: Wire types of the batched metrics endpoint
// ABOUTME: One query per (node, url) pair, answered by a map keyed by the query key

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry of a metrics batch request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetricQuery {
    pub url: String,
    pub node: String,
    pub key: String,
}

impl MetricQuery {
    pub fn new(node: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            node: node.to_string(),
            key: metric_key(node, url),
        }
    }
}

/// Batch response: per key either the upstream JSON payload or `{"error": "..."}`
pub type MetricBatchResponse = HashMap<String, Value>;

pub fn metric_key(node: &str, url: &str) -> String {
    format!("{}-{}", node, url)
}

/// Error message carried by a batch entry, if the entry is an error
pub fn entry_error(entry: &Value) -> Option<String> {
    let error = entry.as_object()?.get("error")?;
    Some(match error {
        Value::String(message) => message.clone(),
        other => other.to_string(),
    })
}
