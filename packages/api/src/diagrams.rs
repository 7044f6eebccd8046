// ABOUTME: Diagram configuration file endpoints
// ABOUTME: Lists the *.json files of the configs directory and serves them by file name

use std::io::ErrorKind;
use std::path::Path as FsPath;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use crate::error::{is_safe_name, ApiError};
use crate::AppState;

/// Sorted `*.json` file names directly inside `dir`; a missing directory lists nothing
pub async fn diagram_files(dir: &FsPath) -> Result<Vec<String>, ApiError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Configs directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            error!("Failed to read configs directory {}: {}", dir.display(), e);
            return Err(ApiError::Internal("Failed to list diagrams".to_string()));
        }
    };

    let mut names = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                error!("Failed to read configs directory entry: {}", e);
                return Err(ApiError::Internal("Failed to list diagrams".to_string()));
            }
        };
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if let Some(name) = entry.file_name().to_str() {
            if is_file && name.ends_with(".json") {
                names.push(name.to_string());
            }
        }
    }

    names.sort();
    Ok(names)
}

pub async fn list_diagrams(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    let names = diagram_files(&state.configs_dir).await?;
    debug!("Listing {} diagram(s)", names.len());
    Ok(Json(names))
}

/// Older listing shape: `{"diagrams": [...]}`
pub async fn list_diagrams_legacy(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let names = diagram_files(&state.configs_dir).await?;
    Ok(Json(json!({ "diagrams": names })))
}

pub async fn get_diagram(
    State(state): State<AppState>,
    Path(diagram_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if !is_safe_name(&diagram_id) || !diagram_id.ends_with(".json") {
        return Err(ApiError::BadRequest(format!(
            "Invalid diagram id: {}",
            diagram_id
        )));
    }
    info!("Loading diagram: {}", diagram_id);

    let path = state.configs_dir.join(&diagram_id);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "Diagram not found: {}",
                diagram_id
            )))
        }
        Err(e) => {
            error!("Failed to read {}: {}", path.display(), e);
            return Err(ApiError::Internal("Failed to read diagram".to_string()));
        }
    };

    serde_json::from_str(&raw).map(Json).map_err(|e| {
        error!("Diagram {} is not valid JSON: {}", diagram_id, e);
        ApiError::Internal(format!("Diagram {} is not valid JSON", diagram_id))
    })
}
