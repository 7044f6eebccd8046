// ABOUTME: Shared constants for diagram construction and local storage keys
// ABOUTME: Layout defaults, edge styling values and data directory resolution

use std::env;
use std::path::PathBuf;

/// Diagram loaded when nothing else has been selected
pub const DEFAULT_DIAGRAM: &str = "diagram-config.json";

/// Diagram identifiers tried when the server cannot list its configurations
pub const WELL_KNOWN_DIAGRAMS: &[&str] = &[
    "diagram-config.json",
    "Telemetry-Processing.json",
    "IMC-chatbot.json",
];

// Node placement when neither a saved nor a declared position exists
pub const DEFAULT_NODE_SPACING: f64 = 300.0;
pub const DEFAULT_NODE_OFFSET_X: f64 = 100.0;
pub const DEFAULT_NODE_Y: f64 = 200.0;

// Edge styling
pub const DEFAULT_LINE_COLOR: &str = "#3498db";
pub const EDGE_STROKE_WIDTH: u32 = 2;
pub const DASHED_STROKE_PATTERN: &str = "5,5";
pub const EDGE_BORDER_RADIUS: u32 = 20;

/// Render node type understood by the render surface
pub const RENDER_NODE_TYPE: &str = "custom";

// Particle animation defaults
pub const DEFAULT_PARTICLE_COUNT: u32 = 5;
pub const DEFAULT_PARTICLE_SPEED: f64 = 5.0;
pub const DEFAULT_PARTICLE_CYCLE_SECS: f64 = 1.5;
pub const PARTICLE_STAGGER_SECS: f64 = 1.5;

// Local storage keys
pub const POSITIONS_KEY_PREFIX: &str = "diagram-positions-";
pub const SELECTED_DIAGRAM_KEY: &str = "selectedDiagram";
pub const SHOW_COORDINATES_KEY: &str = "showCoordinates";
pub const WINDOW_TITLE_KEY: &str = "windowTitle";
pub const PENDING_TEMPLATE_KEY: &str = "pendingTemplate";

/// Storage key holding the position overrides of one diagram
pub fn positions_key(diagram_id: &str) -> String {
    format!("{}{}", POSITIONS_KEY_PREFIX, diagram_id)
}

/// Get the path to the data directory (~/.diagram-designer)
pub fn data_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Ok(home) = env::var("HOME") {
        PathBuf::from(home).join(".diagram-designer")
    } else {
        dirs::home_dir()
            .unwrap_or_else(env::temp_dir)
            .join(".diagram-designer")
    }
}

/// Get the path to the local key/value database (~/.diagram-designer/local.db)
pub fn local_store_file() -> PathBuf {
    data_dir().join("local.db")
}
