// ABOUTME: Metrics proxy endpoints
// ABOUTME: Single metric passthrough and the batch endpoint that fetches every requested URL concurrently

use std::time::Duration;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use diagram_core::{MetricBatchResponse, MetricQuery};
use futures::future::join_all;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::AuthResolver;
use crate::error::ApiError;
use crate::AppState;

pub struct MetricsProxy {
    client: reqwest::Client,
    auth: AuthResolver,
}

/// Parse a metric URL; only http and https are proxied
pub fn validate_metric_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw).map_err(|_| ApiError::BadRequest("Invalid URL format".to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ApiError::BadRequest("Invalid URL format".to_string())),
    }
}

impl MetricsProxy {
    pub fn new(timeout: Duration, auth: AuthResolver) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, auth))
    }

    pub fn with_client(client: reqwest::Client, auth: AuthResolver) -> Self {
        Self { client, auth }
    }

    /// Fetch one metric payload; the error is a message fit for the client
    pub async fn fetch(&self, url: &Url) -> Result<Value, String> {
        let request = self.auth.apply(self.client.get(url.clone()), url);
        let response = request.send().await.map_err(|e| {
            warn!("Metric request to {} failed: {}", url, e);
            format!("Request failed: {}", e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Metric request to {} answered {}", url, status);
            return Err(format!("HTTP {}", status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("Invalid JSON response: {}", e))
    }

    /// Fetch every query concurrently; each key maps to a payload or `{"error": ...}`
    pub async fn fetch_batch(&self, queries: Vec<MetricQuery>) -> MetricBatchResponse {
        let results = join_all(queries.into_iter().map(|query| async move {
            let outcome = match validate_metric_url(&query.url) {
                Ok(url) => self.fetch(&url).await,
                Err(e) => Err(e.to_string()),
            };
            let entry = outcome.unwrap_or_else(|error| json!({ "error": error }));
            (query.key, entry)
        }))
        .await;

        results.into_iter().collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricParams {
    pub url: Option<String>,
    pub node: Option<String>,
}

pub async fn proxy_metric(
    State(state): State<AppState>,
    Query(params): Query<MetricParams>,
) -> Result<Json<Value>, ApiError> {
    let raw = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL parameter is required".to_string()))?;
    info!(
        "Metrics proxy request for URL: {} (node: {})",
        raw,
        params.node.as_deref().unwrap_or("-")
    );

    let url = validate_metric_url(&raw)?;
    state
        .metrics
        .fetch(&url)
        .await
        .map(Json)
        .map_err(ApiError::BadGateway)
}

pub async fn metrics_batch(
    State(state): State<AppState>,
    Json(queries): Json<Vec<MetricQuery>>,
) -> impl IntoResponse {
    debug!("Metrics batch with {} request(s)", queries.len());
    Json(state.metrics.fetch_batch(queries).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_metric_url() {
        assert!(validate_metric_url("http://rmq:15672/api/overview").is_ok());
        assert!(validate_metric_url("https://metrics.example.com").is_ok());
        assert!(validate_metric_url("ftp://files.example.com").is_err());
        assert!(validate_metric_url("file:///etc/passwd").is_err());
        assert!(validate_metric_url("not a url").is_err());
    }
}
