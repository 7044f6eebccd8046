// ABOUTME: Shared plumbing for the diagram binary
// ABOUTME: Logging setup, local store location, API client construction and diagram loading

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use diagram_client::loader::load_file;
use diagram_client::{ApiClient, ConfigLoader};
use diagram_config::AppConfig;
use diagram_core::{local_store_file, DiagramConfig, PositionOverrides};
use diagram_storage::{LocalStore, PositionStore, Preferences};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber; `RUST_LOG` wins over the configured level
pub fn init_tracing(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Location of the local key/value database
pub fn store_path(config: &AppConfig) -> PathBuf {
    match &config.data_dir {
        Some(dir) => dir.join("local.db"),
        None => local_store_file(),
    }
}

/// A diagram with the positions that apply to it
#[derive(Debug, Clone)]
pub struct DiagramView {
    pub id: String,
    pub config: DiagramConfig,
    pub positions: PositionOverrides,
}

/// Configuration plus the opened local store
pub struct Workspace {
    pub config: AppConfig,
    store: LocalStore,
}

impl Workspace {
    pub async fn open(config: AppConfig) -> Result<Self> {
        let path = store_path(&config);
        let store = LocalStore::open(&path)
            .await
            .with_context(|| format!("Failed to open local store at {}", path.display()))?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: AppConfig, store: LocalStore) -> Self {
        Self { config, store }
    }

    pub fn positions(&self) -> PositionStore {
        PositionStore::new(self.store.clone())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.store.clone())
    }

    /// API client for `server`, or the configured API URL
    pub fn api(&self, server: Option<&str>) -> Result<ApiClient> {
        let base = server.unwrap_or(&self.config.api_url);
        ApiClient::with_timeout(base, self.config.http_request_timeout)
            .with_context(|| format!("Invalid server URL: {}", base))
    }

    /// Load a diagram from `file` or the server and attach its saved positions.
    /// A pending template replaces a server diagram and ignores saved positions.
    pub async fn load_view(
        &self,
        diagram: &str,
        server: Option<&str>,
        file: Option<&Path>,
    ) -> Result<DiagramView> {
        if let Some(path) = file {
            debug!("Loading diagram '{}' from {}", diagram, path.display());
            let config = load_file(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let positions = self.positions().load(diagram).await?;
            return Ok(DiagramView {
                id: diagram.to_string(),
                config,
                positions,
            });
        }

        let loader = ConfigLoader::new(self.api(server)?).with_preferences(self.preferences());
        let loaded = loader.load(diagram).await?;
        let positions = if loaded.bypass_positions {
            info!("Template loaded, saved positions are not applied");
            PositionOverrides::new()
        } else {
            self.positions().load(diagram).await?
        };

        Ok(DiagramView {
            id: loaded.id,
            config: loaded.config,
            positions,
        })
    }
}
