// ABOUTME: Viewer preferences kept in the local store
// ABOUTME: Selected diagram, coordinate display, window title and the one-shot pending template

use diagram_core::constants::{
    PENDING_TEMPLATE_KEY, SELECTED_DIAGRAM_KEY, SHOW_COORDINATES_KEY, WINDOW_TITLE_KEY,
};
use diagram_core::DiagramConfig;
use tracing::{info, warn};

use crate::local_store::LocalStore;
use crate::Result;

#[derive(Clone)]
pub struct Preferences {
    store: LocalStore,
}

impl Preferences {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    pub async fn selected_diagram(&self) -> Result<Option<String>> {
        self.store.get(SELECTED_DIAGRAM_KEY).await
    }

    pub async fn set_selected_diagram(&self, diagram_id: &str) -> Result<()> {
        self.store.set(SELECTED_DIAGRAM_KEY, diagram_id).await
    }

    /// Defaults to false; anything other than "true" reads as false
    pub async fn show_coordinates(&self) -> Result<bool> {
        Ok(self.store.get(SHOW_COORDINATES_KEY).await?.as_deref() == Some("true"))
    }

    pub async fn set_show_coordinates(&self, show: bool) -> Result<()> {
        self.store
            .set(SHOW_COORDINATES_KEY, if show { "true" } else { "false" })
            .await
    }

    pub async fn window_title(&self) -> Result<Option<String>> {
        self.store.get(WINDOW_TITLE_KEY).await
    }

    pub async fn set_window_title(&self, title: &str) -> Result<()> {
        self.store.set(WINDOW_TITLE_KEY, title).await
    }

    pub async fn set_pending_template(&self, config: &DiagramConfig) -> Result<()> {
        let raw = serde_json::to_string(config)?;
        self.store.set(PENDING_TEMPLATE_KEY, &raw).await?;
        info!("Pending template '{}' stored", config.config.title);
        Ok(())
    }

    /// Consume the pending template. An unreadable entry is discarded.
    pub async fn take_pending_template(&self) -> Result<Option<DiagramConfig>> {
        let Some(raw) = self.store.take(PENDING_TEMPLATE_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(config) => Ok(Some(config)),
            Err(e) => {
                warn!("Discarding unreadable pending template: {}", e);
                Ok(None)
            }
        }
    }
}
