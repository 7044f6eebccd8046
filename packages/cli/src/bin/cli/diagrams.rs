// ABOUTME: Diagram commands: server listing, render graph output, node details and layout export
// ABOUTME: Render graphs and exports apply saved positions unless a template is being loaded

use std::path::Path;

use anyhow::{anyhow, Context};
use colored::*;
use diagram_cli::Workspace;
use diagram_client::{ConfigLoader, NodeDetailsResolver};
use diagram_core::{build_graph, export_file_name, save_layout};

pub async fn list(workspace: &Workspace, server: Option<&str>) -> anyhow::Result<()> {
    let loader = ConfigLoader::new(workspace.api(server)?);
    let ids = loader.list_diagrams().await;
    let selected = workspace.preferences().selected_diagram().await?;

    if ids.is_empty() {
        println!("{}", "No diagrams found".yellow());
        return Ok(());
    }

    println!("{}", "Diagrams".blue().bold());
    for id in &ids {
        if selected.as_deref() == Some(id.as_str()) {
            println!("  {} {}", "*".green(), id.green());
        } else {
            println!("    {}", id);
        }
    }
    println!("Total: {} diagrams", ids.len().to_string().cyan());
    Ok(())
}

pub async fn graph(
    workspace: &Workspace,
    diagram: &str,
    server: Option<&str>,
    file: Option<&Path>,
    show_coordinates: bool,
) -> anyhow::Result<()> {
    let view = workspace.load_view(diagram, server, file).await?;
    let show_coordinates =
        show_coordinates || workspace.preferences().show_coordinates().await?;

    let graph = build_graph(&view.config, &view.positions, show_coordinates);
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}

/// Print the detail page of one node; nodes without a document get the generated page
pub async fn details(
    workspace: &Workspace,
    diagram: &str,
    node_name: &str,
    server: Option<&str>,
    file: Option<&Path>,
) -> anyhow::Result<()> {
    let view = workspace.load_view(diagram, server, file).await?;
    let node = view
        .config
        .node(node_name)
        .ok_or_else(|| anyhow!("Node '{}' is not part of '{}'", node_name, diagram))?;

    let resolver = NodeDetailsResolver::new(workspace.api(server)?);
    let details = resolver.load_or_default(node).await;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}

pub async fn export(
    workspace: &Workspace,
    diagram: &str,
    server: Option<&str>,
    file: Option<&Path>,
    out: Option<&Path>,
) -> anyhow::Result<()> {
    let view = workspace.load_view(diagram, server, file).await?;
    let json = save_layout(&view.config, &view.positions)?;

    let Some(out) = out else {
        println!("{}", json);
        return Ok(());
    };

    let target = if out.is_dir() {
        out.join(export_file_name(&view.config.config.title))
    } else {
        out.to_path_buf()
    };
    tokio::fs::write(&target, json)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!(
        "{} {} ({} positions)",
        "Layout saved to".green(),
        target.display(),
        view.positions.len()
    );
    Ok(())
}
