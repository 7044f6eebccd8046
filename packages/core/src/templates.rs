// ABOUTME: Built-in diagram templates offered when starting a new diagram
// ABOUTME: A chosen template is stored as a one-shot pending template consumed at next load

use serde::{Deserialize, Serialize};

use crate::types::{
    Connection, DiagramConfig, DiagramNode, EdgeAnimation, GlobalConfig, NodeGlow, Position,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub config: DiagramConfig,
}

fn template_config(title: &str, nodes: Vec<DiagramNode>) -> DiagramConfig {
    DiagramConfig {
        config: GlobalConfig {
            title: title.to_string(),
            node_glow: Some(NodeGlow {
                enabled: true,
                intensity: None,
                spread: Some(10.0),
            }),
            edge_animation: Some(EdgeAnimation {
                enabled: true,
                speed: Some(1.0),
            }),
            ..Default::default()
        },
        nodes,
    }
}

fn template_node(
    name: &str,
    display_name: &str,
    description: &str,
    icon: &str,
    position: (f64, f64),
    connect_to: &[&str],
) -> DiagramNode {
    let mut node = DiagramNode::named(name);
    node.display_name = display_name.to_string();
    node.description = description.to_string();
    node.icon = icon.to_string();
    node.position = Some(Position::new(position.0, position.1));
    node.connect_to = connect_to.iter().map(|t| Connection::from(*t)).collect();
    node
}

/// All built-in templates, in display order
pub fn builtin_templates() -> Vec<Template> {
    vec![
        Template {
            id: "blank".to_string(),
            name: "Blank Diagram".to_string(),
            description: "Start from scratch with an empty canvas.".to_string(),
            icon: "fa-file".to_string(),
            config: template_config("New Diagram", Vec::new()),
        },
        Template {
            id: "microservices".to_string(),
            name: "Microservices Architecture".to_string(),
            description:
                "A standard setup with API Gateway, Service Registry, and Microservices."
                    .to_string(),
            icon: "fa-network-wired".to_string(),
            config: template_config(
                "Microservices Architecture",
                vec![
                    template_node(
                        "api-gateway",
                        "API Gateway",
                        "Entry point for all clients",
                        "fa-server",
                        (250.0, 50.0),
                        &["auth-service", "user-service", "order-service"],
                    ),
                    template_node(
                        "auth-service",
                        "Auth Service",
                        "Handles authentication",
                        "fa-lock",
                        (50.0, 200.0),
                        &[],
                    ),
                    template_node(
                        "user-service",
                        "User Service",
                        "Manages user data",
                        "fa-users",
                        (250.0, 200.0),
                        &["user-db"],
                    ),
                    template_node(
                        "order-service",
                        "Order Service",
                        "Manages orders",
                        "fa-shopping-cart",
                        (450.0, 200.0),
                        &["order-db"],
                    ),
                    template_node(
                        "user-db",
                        "User DB",
                        "PostgreSQL",
                        "fa-database",
                        (250.0, 350.0),
                        &[],
                    ),
                    template_node(
                        "order-db",
                        "Order DB",
                        "MongoDB",
                        "fa-database",
                        (450.0, 350.0),
                        &[],
                    ),
                ],
            ),
        },
    ]
}

pub fn find_template(id: &str) -> Option<Template> {
    builtin_templates().into_iter().find(|t| t.id == id)
}
