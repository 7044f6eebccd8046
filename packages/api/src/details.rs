// ABOUTME: Node detail document endpoints
// ABOUTME: Serves {name}.json from the details directory, falling back to configs/details

use std::io::ErrorKind;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, info};

use crate::error::{is_safe_name, ApiError};
use crate::AppState;

pub async fn get_node_details(
    State(state): State<AppState>,
    Path(node_name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !is_safe_name(&node_name) {
        return Err(ApiError::BadRequest(format!(
            "Invalid node name: {}",
            node_name
        )));
    }
    info!("Loading node details for: {}", node_name);

    let file_name = format!("{}.json", node_name);
    for dir in &state.details_dirs {
        let path = dir.join(&file_name);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                error!("Error reading node details for {}: {}", node_name, e);
                return Err(ApiError::Internal("Failed to load node details".to_string()));
            }
        };

        return serde_json::from_str(&raw).map(Json).map_err(|e| {
            error!("Node details for {} are not valid JSON: {}", node_name, e);
            ApiError::Internal("Failed to load node details".to_string())
        });
    }

    debug!("No details configuration found for node: {}", node_name);
    Err(ApiError::NotFound(format!(
        "No details for node: {}",
        node_name
    )))
}

pub async fn details_usage() -> Json<Value> {
    Json(json!({
        "message": "Node details endpoint is active",
        "usage": "GET /api/node-details/{nodeName}",
        "location": "Place detail JSON files in the details directory or in configs/details/",
        "example": {
            "title": "Service Details",
            "description": "Detailed information about this service",
            "sections": [
                {
                    "title": "Configuration",
                    "type": "info",
                    "content": "<div>Service configuration details...</div>"
                },
                {
                    "title": "Metrics",
                    "type": "metrics",
                    "content": "<div>Real-time metrics...</div>"
                }
            ],
            "links": [
                {
                    "label": "Dashboard",
                    "url": "https://dashboard.example.com",
                    "type": "primary"
                }
            ]
        }
    }))
}
