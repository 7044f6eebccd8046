// ABOUTME: Loads diagram configurations from the API server or local files
// ABOUTME: Consumes a pending template first, then fetches, parses and validates the named diagram

use std::path::Path;

use diagram_core::constants::WELL_KNOWN_DIAGRAMS;
use diagram_core::{validate_config, DiagramConfig, ValidationError};
use diagram_storage::{Preferences, StorageError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::http::ApiClient;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch diagram '{id}': {source}")]
    Fetch {
        id: String,
        #[source]
        source: ClientError,
    },

    #[error("Failed to parse diagram '{id}': {source}")]
    Parse {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read diagram file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid diagram configuration: {0}")]
    Invalid(#[from] ValidationError),

    #[error("Local storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A diagram ready for graph construction
#[derive(Debug, Clone)]
pub struct LoadedDiagram {
    pub id: String,
    pub config: DiagramConfig,
    /// Saved positions must not be applied (fresh template)
    pub bypass_positions: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DiagramListing {
    Ids(Vec<String>),
    Wrapped { diagrams: Vec<String> },
}

pub struct ConfigLoader {
    api: ApiClient,
    preferences: Option<Preferences>,
}

impl ConfigLoader {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            preferences: None,
        }
    }

    /// Enable pending-template handling backed by local preferences
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Ids of the diagrams the server offers. When the listing endpoint is
    /// unavailable the well-known ids are tried one by one.
    pub async fn list_diagrams(&self) -> Vec<String> {
        match self
            .api
            .get_json::<DiagramListing>(&self.api.api_url("/api/diagrams"))
            .await
        {
            Ok(DiagramListing::Ids(ids)) | Ok(DiagramListing::Wrapped { diagrams: ids }) => {
                debug!("Server listed {} diagram(s)", ids.len());
                ids
            }
            Err(e) => {
                warn!("Diagram listing unavailable ({}), probing known diagrams", e);
                self.check_known_diagrams().await
            }
        }
    }

    async fn check_known_diagrams(&self) -> Vec<String> {
        let mut found = Vec::new();
        for id in WELL_KNOWN_DIAGRAMS {
            match self.api.status_of(&self.api.diagram_url(id)).await {
                Ok(status) if status.is_success() => found.push(id.to_string()),
                Ok(status) => debug!("Probe of '{}' answered {}", id, status),
                Err(e) => debug!("Probe of '{}' failed: {}", id, e),
            }
        }
        found
    }

    /// Load the diagram to display. A stored pending template wins over `id`
    /// and is consumed by this call.
    pub async fn load(&self, id: &str) -> Result<LoadedDiagram, LoaderError> {
        if let Some(preferences) = &self.preferences {
            if let Some(config) = preferences.take_pending_template().await? {
                info!("Loading pending template '{}'", config.config.title);
                validate_config(&config)?;
                return Ok(LoadedDiagram {
                    id: id.to_string(),
                    config,
                    bypass_positions: true,
                });
            }
        }

        let config = self.fetch(id).await?;
        Ok(LoadedDiagram {
            id: id.to_string(),
            config,
            bypass_positions: false,
        })
    }

    /// Fetch, parse and validate one diagram from the server
    pub async fn fetch(&self, id: &str) -> Result<DiagramConfig, LoaderError> {
        let value: serde_json::Value = self
            .api
            .get_json(&self.api.diagram_url(id))
            .await
            .map_err(|source| LoaderError::Fetch {
                id: id.to_string(),
                source,
            })?;

        let config: DiagramConfig =
            serde_json::from_value(value).map_err(|source| LoaderError::Parse {
                id: id.to_string(),
                source,
            })?;
        validate_config(&config)?;

        info!(
            "Loaded diagram '{}' ({} nodes)",
            config.config.title,
            config.nodes.len()
        );
        Ok(config)
    }
}

/// Read and validate a diagram configuration from disk
pub async fn load_file(path: &Path) -> Result<DiagramConfig, LoaderError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let config: DiagramConfig =
        serde_json::from_str(&raw).map_err(|source| LoaderError::Parse {
            id: path.display().to_string(),
            source,
        })?;
    validate_config(&config)?;
    Ok(config)
}
