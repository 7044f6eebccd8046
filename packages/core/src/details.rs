// ABOUTME: Node detail documents shown when a node is opened
// ABOUTME: Tolerant sanitization of untrusted JSON and the default page built from the node itself

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::DiagramNode;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetailConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sections: Vec<DetailSection>,
    #[serde(default)]
    pub links: Vec<DetailLink>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_page: Option<CustomPage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Info,
    Metrics,
    Status,
    Logs,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailSection {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Primary,
    Secondary,
    External,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailLink {
    pub label: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LinkKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomPageKind {
    Iframe,
    Markdown,
    Html,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPage {
    #[serde(rename = "type")]
    pub kind: CustomPageKind,
    pub content: String,
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn sanitize_section(value: &Value) -> Option<DetailSection> {
    let kind = serde_json::from_value(value.get("type")?.clone()).ok()?;
    Some(DetailSection {
        title: string_field(value, "title")?,
        kind,
        content: string_field(value, "content")?,
        icon: string_field(value, "icon"),
    })
}

fn sanitize_link(value: &Value) -> Option<DetailLink> {
    let url = string_field(value, "url")?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return None;
    }
    Some(DetailLink {
        label: string_field(value, "label")?,
        url,
        icon: string_field(value, "icon"),
        kind: value
            .get("type")
            .and_then(|k| serde_json::from_value(k.clone()).ok()),
    })
}

fn sanitize_custom_page(value: &Value) -> Option<CustomPage> {
    Some(CustomPage {
        kind: serde_json::from_value(value.get("type")?.clone()).ok()?,
        content: string_field(value, "content")?,
    })
}

fn sanitize_list<T>(value: Option<&Value>, item: fn(&Value) -> Option<T>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(item).collect(),
        _ => Vec::new(),
    }
}

/// Coerce an arbitrary JSON document into a detail config. Never fails:
/// malformed parts are replaced by empty defaults or filtered out.
pub fn sanitize_details(value: &Value) -> NodeDetailConfig {
    NodeDetailConfig {
        title: string_field(value, "title"),
        description: string_field(value, "description"),
        sections: sanitize_list(value.get("sections"), sanitize_section),
        links: sanitize_list(value.get("links"), sanitize_link),
        custom_page: value.get("customPage").and_then(sanitize_custom_page),
    }
}

/// Detail page used when a node has no document of its own
pub fn default_details(node: &DiagramNode) -> NodeDetailConfig {
    let mut configuration = format!(
        "<div><strong>Node Name:</strong> {}</div><div><strong>Description:</strong> {}</div>",
        node.name, node.description
    );
    if let Some(url) = &node.url {
        configuration.push_str(&format!(
            "<div><strong>External URL:</strong> <a href=\"{0}\" target=\"_blank\">{0}</a></div>",
            url
        ));
    }

    let metrics: String = node
        .data_grid
        .iter()
        .map(|row| format!("<div><span>{}</span><span>Loading...</span></div>", row.label))
        .collect();

    NodeDetailConfig {
        title: Some(format!("{} Details", node.display_name)),
        description: Some(node.description.clone()),
        sections: vec![
            DetailSection {
                title: "Configuration".to_string(),
                kind: SectionKind::Info,
                content: configuration,
                icon: None,
            },
            DetailSection {
                title: "Current Metrics".to_string(),
                kind: SectionKind::Metrics,
                content: metrics,
                icon: None,
            },
        ],
        links: Vec::new(),
        custom_page: None,
    }
}
