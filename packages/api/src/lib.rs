// ABOUTME: HTTP API for Diagram Designer
// ABOUTME: Router, shared state and server startup for diagram files, node details and metrics

pub mod auth;
pub mod details;
pub mod diagrams;
pub mod error;
pub mod health;
pub mod metrics;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use diagram_config::AppConfig;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use auth::{AuthResolver, Credentials};
pub use error::ApiError;
pub use metrics::MetricsProxy;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[derive(Clone)]
pub struct AppState {
    pub configs_dir: PathBuf,
    /// Searched in order for `{node}.json`
    pub details_dirs: Vec<PathBuf>,
    pub metrics: Arc<MetricsProxy>,
}

impl AppState {
    pub fn new(configs_dir: PathBuf, details_dir: PathBuf, metrics: MetricsProxy) -> Self {
        let details_dirs = vec![details_dir, configs_dir.join("details")];
        Self {
            configs_dir,
            details_dirs,
            metrics: Arc::new(metrics),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let metrics = MetricsProxy::new(config.http_request_timeout, AuthResolver::from_env())?;
        Ok(Self::new(
            config.configs_dir.clone(),
            config.details_dir.clone(),
            metrics,
        ))
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/diagrams", get(diagrams::list_diagrams))
        .route("/api/diagrams/{id}", get(diagrams::get_diagram))
        .route("/api/list-diagrams", get(diagrams::list_diagrams_legacy))
        .route("/api/node-details", get(details::details_usage))
        .route("/api/node-details/{name}", get(details::get_node_details))
        .route("/api/metrics", get(metrics::proxy_metric))
        .route("/api/metrics/batch", post(metrics::metrics_batch))
        .with_state(state)
}

fn cors_layer(origin: &str) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origin == "*" {
        return Ok(layer.allow_origin(Any));
    }
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|_| ServerError::InvalidCorsOrigin(origin.to_string()))?;
    Ok(layer.allow_origin(origin))
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &AppConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(config)?;
    let app = create_router(state)
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], config.api_port));
    info!(
        "Diagram API listening on {} (configs: {})",
        addr,
        config.configs_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
