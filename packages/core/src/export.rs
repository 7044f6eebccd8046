// ABOUTME: Layout export: writes live node positions back into a diagram configuration
// ABOUTME: Produces the downloadable JSON document and its file name

use thiserror::Error;
use tracing::info;

use crate::types::{DiagramConfig, PositionOverrides};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No position changes recorded yet; move a node before saving the layout")]
    NoPositionChanges,

    #[error("Failed to serialize diagram: {0}")]
    Json(#[from] serde_json::Error),
}

/// Copy of `config` with every node found in `positions` moved there
pub fn export_layout(config: &DiagramConfig, positions: &PositionOverrides) -> DiagramConfig {
    let mut exported = config.clone();
    for node in &mut exported.nodes {
        if let Some(position) = positions.get(&node.name) {
            node.position = Some(*position);
        }
    }
    exported
}

/// Export for the "save layout" action, which requires at least one recorded move
pub fn save_layout(
    config: &DiagramConfig,
    positions: &PositionOverrides,
) -> Result<String, ExportError> {
    if positions.is_empty() {
        return Err(ExportError::NoPositionChanges);
    }

    let exported = export_layout(config, positions);
    info!(
        "Exporting layout '{}' with {} saved positions",
        exported.config.title,
        positions.len()
    );
    Ok(serde_json::to_string_pretty(&exported)?)
}

/// File name offered for a downloaded layout
pub fn export_file_name(title: &str) -> String {
    let slug: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        "diagram.json".to_string()
    } else {
        format!("{}.json", slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DiagramNode, GlobalConfig, Position};

    fn config() -> DiagramConfig {
        let mut declared = DiagramNode::named("b");
        declared.position = Some(Position::new(5.0, 5.0));
        DiagramConfig {
            config: GlobalConfig {
                title: "Telemetry Processing".to_string(),
                ..Default::default()
            },
            nodes: vec![DiagramNode::named("a"), declared],
        }
    }

    #[test]
    fn test_export_merges_positions() {
        let mut positions = PositionOverrides::new();
        positions.insert("a".to_string(), Position::new(1.0, 2.0));
        positions.insert("ghost".to_string(), Position::new(9.0, 9.0));

        let exported = export_layout(&config(), &positions);

        assert_eq!(exported.nodes[0].position, Some(Position::new(1.0, 2.0)));
        assert_eq!(exported.nodes[1].position, Some(Position::new(5.0, 5.0)));
        assert_eq!(exported.nodes.len(), 2);
    }

    #[test]
    fn test_save_layout_requires_positions() {
        let result = save_layout(&config(), &PositionOverrides::new());
        assert!(matches!(result, Err(ExportError::NoPositionChanges)));
    }

    #[test]
    fn test_save_layout_round_trips_as_config() {
        let mut positions = PositionOverrides::new();
        positions.insert("b".to_string(), Position::new(7.0, 8.0));

        let json = save_layout(&config(), &positions).unwrap();
        let parsed: DiagramConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.nodes[1].position, Some(Position::new(7.0, 8.0)));
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Telemetry Processing"), "Telemetry-Processing.json");
        assert_eq!(export_file_name("  "), "diagram.json");
        assert_eq!(export_file_name("a/b"), "a-b.json");
    }
}
