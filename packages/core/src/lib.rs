// ABOUTME: Core types and pure logic for Diagram Designer
// ABOUTME: Diagram model, graph construction, validation, node details and layout export

pub mod constants;
pub mod details;
pub mod export;
pub mod graph;
pub mod metric;
pub mod render;
pub mod templates;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types
pub use types::{
    ClickBehavior, Connection, ConnectionSpec, DataGridItem, DiagramConfig, DiagramNode,
    EdgeAnimation, EdgeType, GlobalConfig, HandleConfig, LayoutDirection, LineType, NodeGlow,
    ParticleConfig, ParticleDirection, Position, PositionOverrides, StatusConfig,
};

// Re-export graph construction
pub use graph::{build_edges, build_graph, build_nodes, resolve_position};
pub use metric::{entry_error, metric_key, MetricBatchResponse, MetricQuery};
pub use render::{
    EdgeData, EdgeStyle, NodeData, ParticleAnimation, RenderEdge, RenderGraph, RenderNode,
};

// Re-export constants
pub use constants::{data_dir, local_store_file, positions_key, DEFAULT_DIAGRAM};

// Re-export details, export, templates and validation
pub use details::{default_details, sanitize_details, NodeDetailConfig};
pub use export::{export_file_name, export_layout, save_layout, ExportError};
pub use templates::{builtin_templates, find_template, Template};
pub use utils::{lookup_field, scalar_matches, scalar_text};
pub use validation::{validate_config, ValidationError};
