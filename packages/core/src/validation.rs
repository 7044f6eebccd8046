// ABOUTME: Structural validation of loaded diagram configurations
// ABOUTME: Enforces unique node names and required polling intervals

use std::collections::HashSet;

use thiserror::Error;

use crate::types::DiagramConfig;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Node at index {0} has an empty name")]
    EmptyNodeName(usize),

    #[error("Duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("Node {0} has a status check with a zero update interval")]
    ZeroStatusInterval(String),
}

/// Check the invariants the graph builder and pollers rely on
pub fn validate_config(config: &DiagramConfig) -> Result<(), ValidationError> {
    let mut names = HashSet::new();

    for (index, node) in config.nodes.iter().enumerate() {
        if node.name.trim().is_empty() {
            return Err(ValidationError::EmptyNodeName(index));
        }

        if !names.insert(node.name.as_str()) {
            return Err(ValidationError::DuplicateNodeName(node.name.clone()));
        }

        if let Some(status) = &node.status {
            if status.update_interval == 0 {
                return Err(ValidationError::ZeroStatusInterval(node.name.clone()));
            }
        }
    }

    Ok(())
}
