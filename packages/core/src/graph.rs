// ABOUTME: Converts a diagram configuration into render nodes and edges
// ABOUTME: Resolves positions, connection direction, style inheritance and particle escalation

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::constants::{
    DASHED_STROKE_PATTERN, DEFAULT_LINE_COLOR, DEFAULT_NODE_OFFSET_X, DEFAULT_NODE_SPACING,
    DEFAULT_NODE_Y, EDGE_BORDER_RADIUS, EDGE_STROKE_WIDTH, RENDER_NODE_TYPE,
};
use crate::render::{
    input_handle_id, output_handle_id, EdgeData, EdgeStyle, NodeData, PathOptions, RenderEdge,
    RenderGraph, RenderNode,
};
use crate::types::{
    Connection, DiagramConfig, DiagramNode, EdgeType, GlobalConfig, LineType, ParticleConfig,
    Position, PositionOverrides,
};

/// A connection after string/object forms and node defaults have been merged
#[derive(Debug, Clone, PartialEq)]
struct ResolvedConnection<'a> {
    target: &'a str,
    output_handle: u32,
    input_handle: u32,
    particles: Option<&'a ParticleConfig>,
    line_type: LineType,
    line_color: &'a str,
    edge_type: EdgeType,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}

fn resolve_connection<'a>(
    owner: &'a DiagramNode,
    connection: &'a Connection,
    index: usize,
) -> ResolvedConnection<'a> {
    let node_color = non_empty(owner.line_color.as_ref());

    match connection {
        Connection::Name(target) => ResolvedConnection {
            target,
            // Shorthand connections fan out over the owner's output handles
            output_handle: index as u32,
            input_handle: 0,
            particles: owner.particles.as_ref(),
            line_type: owner.line_type.unwrap_or_default(),
            line_color: node_color.unwrap_or(DEFAULT_LINE_COLOR),
            edge_type: owner.edge_type.unwrap_or_default(),
        },
        Connection::Detailed(spec) => ResolvedConnection {
            target: &spec.target,
            output_handle: spec.output_handle.unwrap_or(0),
            input_handle: spec.input_handle.unwrap_or(0),
            particles: spec.particles.as_ref().or(owner.particles.as_ref()),
            line_type: spec.line_type.or(owner.line_type).unwrap_or_default(),
            line_color: non_empty(spec.line_color.as_ref())
                .or(node_color)
                .unwrap_or(DEFAULT_LINE_COLOR),
            edge_type: spec.edge_type.or(owner.edge_type).unwrap_or_default(),
        },
    }
}

/// Position precedence: saved override, then declared position, then an
/// evenly spaced slot on a horizontal line keyed by the node's index
pub fn resolve_position(
    node: &DiagramNode,
    index: usize,
    overrides: &PositionOverrides,
) -> Position {
    overrides
        .get(&node.name)
        .copied()
        .or(node.position)
        .unwrap_or_else(|| {
            Position::new(
                index as f64 * DEFAULT_NODE_SPACING + DEFAULT_NODE_OFFSET_X,
                DEFAULT_NODE_Y,
            )
        })
}

pub fn build_nodes(
    nodes: &[DiagramNode],
    global: &GlobalConfig,
    overrides: &PositionOverrides,
    show_coordinates: bool,
) -> Vec<RenderNode> {
    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| RenderNode {
            id: node.name.clone(),
            node_type: RENDER_NODE_TYPE.to_string(),
            position: resolve_position(node, index, overrides),
            data: NodeData {
                node: node.clone(),
                config: global.clone(),
                show_coordinates,
            },
        })
        .collect()
}

pub fn build_edges(nodes: &[DiagramNode]) -> Vec<RenderEdge> {
    let known: HashSet<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut edges = Vec::new();

    for node in nodes {
        for (index, connection) in node.connect_to.iter().enumerate() {
            let resolved = resolve_connection(node, connection, index);

            if !known.contains(resolved.target) {
                debug!(
                    "Dropping connection {} -> {}: target is not part of the diagram",
                    node.name, resolved.target
                );
                continue;
            }

            let particles_enabled = resolved.particles.is_some_and(|p| p.enabled);
            let edge_type = if particles_enabled {
                EdgeType::Particle
            } else {
                resolved.edge_type
            };

            // `connectTo` means "this node depends on target" unless the
            // particles declare that flow leaves this node
            let (source, target) = if resolved.particles.is_some_and(|p| p.flows_from_owner()) {
                (node.name.as_str(), resolved.target)
            } else {
                (resolved.target, node.name.as_str())
            };

            let id = format!("{}-{}-{}", source, target, index);
            if !seen_ids.insert(id.clone()) {
                warn!(
                    "Duplicate edge id {} (declared by {}); the render surface will treat both as one edge",
                    id, node.name
                );
            }

            edges.push(RenderEdge {
                id,
                source: source.to_string(),
                target: target.to_string(),
                source_handle: output_handle_id(resolved.output_handle),
                target_handle: input_handle_id(resolved.input_handle),
                edge_type,
                animated: particles_enabled,
                style: EdgeStyle {
                    stroke: resolved.line_color.to_string(),
                    stroke_width: EDGE_STROKE_WIDTH,
                    stroke_dasharray: (resolved.line_type == LineType::Dashed)
                        .then(|| DASHED_STROKE_PATTERN.to_string()),
                },
                path_options: PathOptions {
                    border_radius: EDGE_BORDER_RADIUS,
                },
                data: EdgeData {
                    particles: resolved.particles.cloned(),
                    original_edge_type: resolved.edge_type,
                    animation: resolved
                        .particles
                        .filter(|p| p.enabled)
                        .map(ParticleConfig::animation),
                },
            });
        }
    }

    edges
}

/// Build the render graph of a diagram. Pure: equal inputs give equal output.
pub fn build_graph(
    config: &DiagramConfig,
    overrides: &PositionOverrides,
    show_coordinates: bool,
) -> RenderGraph {
    RenderGraph {
        nodes: build_nodes(&config.nodes, &config.config, overrides, show_coordinates),
        edges: build_edges(&config.nodes),
    }
}
