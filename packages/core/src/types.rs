// ABOUTME: Diagram configuration document types
// ABOUTME: Nodes, connections, styling and particle descriptors as stored in diagram JSON files

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Root diagram document: global settings plus the ordered node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConfig {
    #[serde(default)]
    pub config: GlobalConfig,
    #[serde(default)]
    pub nodes: Vec<DiagramNode>,
}

impl DiagramConfig {
    /// Find a node by its unique name
    pub fn node(&self, name: &str) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// Value used in place of an unrecognised style keyword
trait StyleFallback: Sized {
    const KIND: &'static str;
    fn fallback() -> Option<Self>;
}

/// Parse an optional keyword, replacing unknown values with the type's fallback
/// so that one bad style value does not reject the whole diagram
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + StyleFallback,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value::<T>(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!("Unknown {} {}, using the default", T::KIND, value);
                T::fallback()
            }
        },
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub layout: LayoutDirection,
    /// Refresh interval in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_glow: Option<NodeGlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_animation: Option<EdgeAnimation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    #[default]
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGlow {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spread: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAnimation {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Saved position overrides of one diagram, keyed by node name
pub type PositionOverrides = BTreeMap<String, Position>;

/// One visual entity of the diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramNode {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circle_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub click_behavior: Option<ClickBehavior>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusConfig>,
    #[serde(default)]
    pub data_grid: Vec<DataGridItem>,
    #[serde(default)]
    pub connect_to: Vec<Connection>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<EdgeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<ParticleConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handles: Option<HandleConfig>,
}

impl DiagramNode {
    /// Minimal node with only a name; used by templates and tests
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            icon: String::new(),
            position: None,
            circle_color: None,
            url: None,
            click_behavior: None,
            status: None,
            data_grid: Vec::new(),
            connect_to: Vec::new(),
            line_type: None,
            line_color: None,
            edge_type: None,
            particles: None,
            handles: None,
        }
    }

    pub fn input_handles(&self) -> u32 {
        self.handles.as_ref().map_or(1, HandleConfig::input_count)
    }

    pub fn output_handles(&self) -> u32 {
        self.handles.as_ref().map_or(1, HandleConfig::output_count)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickBehavior {
    Modal,
    Url,
    Both,
}

impl StyleFallback for ClickBehavior {
    const KIND: &'static str = "clickBehavior";
    fn fallback() -> Option<Self> {
        None
    }
}

/// Status endpoint polled for the node's up/down indicator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusConfig {
    pub url: String,
    pub value_field: String,
    pub up_value: String,
    pub down_value: String,
    /// Polling period in milliseconds
    pub update_interval: u64,
}

/// One metric row displayed under the node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataGridItem {
    pub label: String,
    pub url: String,
    pub value_field: String,
}

/// A connection as written in `connectTo`: either a bare node name or a
/// descriptor with per-connection overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Connection {
    Name(String),
    Detailed(ConnectionSpec),
}

impl From<&str> for Connection {
    fn from(target: &str) -> Self {
        Connection::Name(target.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSpec {
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_handle: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_handle: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub particles: Option<ParticleConfig>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<EdgeType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    #[default]
    Solid,
    Dashed,
}

impl StyleFallback for LineType {
    const KIND: &'static str = "lineType";
    fn fallback() -> Option<Self> {
        Some(LineType::Solid)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    /// Bezier edge, called "default" by the render surface
    #[serde(rename = "default")]
    Bezier,
    #[default]
    Smoothstep,
    Straight,
    Step,
    Curved,
    Particle,
}

impl StyleFallback for EdgeType {
    const KIND: &'static str = "edgeType";
    fn fallback() -> Option<Self> {
        Some(EdgeType::Smoothstep)
    }
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Bezier => "default",
            EdgeType::Smoothstep => "smoothstep",
            EdgeType::Straight => "straight",
            EdgeType::Step => "step",
            EdgeType::Curved => "curved",
            EdgeType::Particle => "particle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticleDirection {
    /// Flow leaves the owning node
    Source,
    /// Flow arrives at the owning node
    Target,
}

impl StyleFallback for ParticleDirection {
    const KIND: &'static str = "particle direction";
    fn fallback() -> Option<Self> {
        Some(ParticleDirection::Target)
    }
}

/// Particle animation parameters of an edge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticleConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub direction: Option<ParticleDirection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

impl ParticleConfig {
    /// True when flow is declared as leaving the owning node
    pub fn flows_from_owner(&self) -> bool {
        self.direction == Some(ParticleDirection::Source)
    }
}

/// Input/output port counts of a node (default 1 each)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HandleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<u32>,
}

impl HandleConfig {
    pub fn input_count(&self) -> u32 {
        self.input.filter(|n| *n > 0).unwrap_or(1)
    }

    pub fn output_count(&self) -> u32 {
        self.output.filter(|n| *n > 0).unwrap_or(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_accepts_both_forms() {
        let node: DiagramNode = serde_json::from_value(json!({
            "name": "api",
            "connectTo": ["db", {"target": "cache", "lineColor": "#ff0000", "outputHandle": 1}]
        }))
        .unwrap();

        assert_eq!(node.connect_to.len(), 2);
        assert_eq!(node.connect_to[0], Connection::Name("db".to_string()));
        match &node.connect_to[1] {
            Connection::Detailed(spec) => {
                assert_eq!(spec.target, "cache");
                assert_eq!(spec.line_color.as_deref(), Some("#ff0000"));
                assert_eq!(spec.output_handle, Some(1));
            }
            other => panic!("Expected detailed connection, got {:?}", other),
        }
    }

    #[test]
    fn test_node_defaults() {
        let node: DiagramNode = serde_json::from_value(json!({"name": "solo"})).unwrap();
        assert!(node.data_grid.is_empty());
        assert!(node.connect_to.is_empty());
        assert_eq!(node.input_handles(), 1);
        assert_eq!(node.output_handles(), 1);
    }

    #[test]
    fn test_edge_type_wire_names() {
        let edge: EdgeType = serde_json::from_value(json!("default")).unwrap();
        assert_eq!(edge, EdgeType::Bezier);
        assert_eq!(serde_json::to_value(EdgeType::Smoothstep).unwrap(), json!("smoothstep"));
        assert_eq!(EdgeType::Particle.as_str(), "particle");
    }

    #[test]
    fn test_unknown_style_keywords_use_fallbacks() {
        let config: DiagramConfig = serde_json::from_value(json!({
            "nodes": [{
                "name": "api",
                "lineType": "dotted",
                "edgeType": "simplebezier",
                "clickBehavior": "popup",
                "connectTo": [{
                    "target": "db",
                    "lineType": 7,
                    "particles": {"enabled": true, "direction": "sideways"}
                }]
            }]
        }))
        .unwrap();

        assert_eq!(config.config, GlobalConfig::default());
        let node = config.node("api").unwrap();
        assert_eq!(node.line_type, Some(LineType::Solid));
        assert_eq!(node.edge_type, Some(EdgeType::Smoothstep));
        assert_eq!(node.click_behavior, None);
        match &node.connect_to[0] {
            Connection::Detailed(spec) => {
                assert_eq!(spec.line_type, Some(LineType::Solid));
                let particles = spec.particles.as_ref().unwrap();
                assert_eq!(particles.direction, Some(ParticleDirection::Target));
            }
            other => panic!("Expected detailed connection, got {:?}", other),
        }
    }

    #[test]
    fn test_status_requires_update_interval() {
        let result: Result<StatusConfig, _> = serde_json::from_value(json!({
            "url": "http://svc/health",
            "valueField": "status",
            "upValue": "UP",
            "downValue": "DOWN"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_handle_counts_ignore_zero() {
        let handles = HandleConfig {
            input: Some(0),
            output: Some(3),
        };
        assert_eq!(handles.input_count(), 1);
        assert_eq!(handles.output_count(), 3);
    }
}
