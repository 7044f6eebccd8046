// ABOUTME: Saved node positions per diagram
// ABOUTME: Read-modify-write merge into one JSON map per diagram; last writer wins

use std::collections::BTreeMap;

use diagram_core::constants::{positions_key, POSITIONS_KEY_PREFIX};
use diagram_core::{Position, PositionOverrides};
use tracing::{debug, warn};

use crate::local_store::LocalStore;
use crate::Result;

/// Position overrides of every diagram, keyed by diagram id
pub type AllPositions = BTreeMap<String, PositionOverrides>;

#[derive(Clone)]
pub struct PositionStore {
    store: LocalStore,
}

impl PositionStore {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    fn parse(diagram_id: &str, raw: &str) -> PositionOverrides {
        serde_json::from_str(raw).unwrap_or_else(|e| {
            warn!(
                "Ignoring unreadable saved positions for '{}': {}",
                diagram_id, e
            );
            PositionOverrides::new()
        })
    }

    /// Saved overrides of one diagram; empty when nothing was saved
    pub async fn load(&self, diagram_id: &str) -> Result<PositionOverrides> {
        Ok(match self.store.get(&positions_key(diagram_id)).await? {
            Some(raw) => Self::parse(diagram_id, &raw),
            None => PositionOverrides::new(),
        })
    }

    /// Record the position of a single dragged node
    pub async fn save(&self, diagram_id: &str, node_name: &str, position: Position) -> Result<()> {
        let mut positions = PositionOverrides::new();
        positions.insert(node_name.to_string(), position);
        self.save_many(diagram_id, &positions).await
    }

    /// Merge a batch of moves into the stored map
    pub async fn save_many(&self, diagram_id: &str, moved: &PositionOverrides) -> Result<()> {
        if moved.is_empty() {
            return Ok(());
        }

        let mut positions = self.load(diagram_id).await?;
        positions.extend(moved.iter().map(|(name, pos)| (name.clone(), *pos)));

        let raw = serde_json::to_string(&positions)?;
        self.store.set(&positions_key(diagram_id), &raw).await?;
        debug!(
            "Saved {} position(s) for diagram '{}'",
            moved.len(),
            diagram_id
        );
        Ok(())
    }

    /// Forget every saved position of one diagram
    pub async fn clear(&self, diagram_id: &str) -> Result<bool> {
        self.store.remove(&positions_key(diagram_id)).await
    }

    pub async fn load_all(&self) -> Result<AllPositions> {
        let entries = self.store.entries_with_prefix(POSITIONS_KEY_PREFIX).await?;
        Ok(entries
            .into_iter()
            .map(|(key, raw)| {
                let diagram_id = key[POSITIONS_KEY_PREFIX.len()..].to_string();
                let positions = Self::parse(&diagram_id, &raw);
                (diagram_id, positions)
            })
            .collect())
    }

    /// Bulk import: each listed diagram's map is replaced as a whole
    pub async fn save_all(&self, all: &AllPositions) -> Result<()> {
        for (diagram_id, positions) in all {
            let raw = serde_json::to_string(positions)?;
            self.store.set(&positions_key(diagram_id), &raw).await?;
        }
        Ok(())
    }
}
