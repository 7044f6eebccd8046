// ABOUTME: Render-ready graph types handed to the node-link render surface
// ABOUTME: Positioned nodes, styled edges and particle animation timing

use serde::Serialize;

use crate::constants::{
    DEFAULT_LINE_COLOR, DEFAULT_PARTICLE_COUNT, DEFAULT_PARTICLE_CYCLE_SECS,
    DEFAULT_PARTICLE_SPEED, PARTICLE_STAGGER_SECS,
};
use crate::types::{DiagramNode, EdgeType, GlobalConfig, ParticleConfig, Position};

/// Output of one graph build
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
}

impl RenderGraph {
    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&RenderEdge> {
        self.edges.iter().find(|e| e.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    pub data: NodeData,
}

/// The node's own configuration plus what the render layer needs to draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(flatten)]
    pub node: DiagramNode,
    pub config: GlobalConfig,
    pub show_coordinates: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: String,
    pub target_handle: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub animated: bool,
    pub style: EdgeStyle,
    pub path_options: PathOptions,
    pub data: EdgeData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathOptions {
    pub border_radius: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub particles: Option<ParticleConfig>,
    /// Edge type resolved before particle escalation
    pub original_edge_type: EdgeType,
    /// Present only on particle edges
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<ParticleAnimation>,
}

pub fn output_handle_id(index: u32) -> String {
    format!("output-{}", index)
}

pub fn input_handle_id(index: u32) -> String {
    format!("input-{}", index)
}

/// Timing of the particles drawn along a particle edge
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleAnimation {
    pub cycle_secs: f64,
    pub count: u32,
    pub color: String,
    /// Particles travel from the edge target back to its source
    pub reversed: bool,
}

impl ParticleAnimation {
    /// Start delay of particle `index` so particles are spread along the path
    pub fn delay_secs(&self, index: u32) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        index as f64 / self.count as f64 * PARTICLE_STAGGER_SECS
    }
}

impl ParticleConfig {
    pub fn animation(&self) -> ParticleAnimation {
        // zero counts as unset, negative speeds get the fixed cycle
        let speed = self
            .speed
            .filter(|s| *s != 0.0)
            .unwrap_or(DEFAULT_PARTICLE_SPEED);
        let cycle_secs = if speed > 0.0 {
            (11.0 - speed) / 3.0
        } else {
            DEFAULT_PARTICLE_CYCLE_SECS
        };

        ParticleAnimation {
            cycle_secs,
            count: self.count.filter(|c| *c > 0).unwrap_or(DEFAULT_PARTICLE_COUNT),
            color: self
                .color
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_LINE_COLOR.to_string()),
            reversed: !self.flows_from_owner(),
        }
    }
}
