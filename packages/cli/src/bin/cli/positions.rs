// ABOUTME: Saved node position commands
// ABOUTME: Inspect, edit, clear, back up and restore the per-diagram position overrides

use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use diagram_cli::Workspace;
use diagram_core::Position;
use diagram_storage::AllPositions;

#[derive(Subcommand)]
pub enum PositionsCommands {
    /// Show the saved positions of a diagram
    List {
        diagram: String,
    },
    /// Save one node position
    Set {
        diagram: String,
        node: String,
        #[arg(allow_hyphen_values = true)]
        x: f64,
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },
    /// Forget every saved position of a diagram
    Clear {
        diagram: String,
    },
    /// Write the saved positions of all diagrams as JSON
    Export {
        /// Output file (prints to stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Restore positions from a JSON file written by export
    Import {
        file: PathBuf,
    },
}

pub async fn handle_positions_command(
    workspace: &Workspace,
    command: PositionsCommands,
) -> anyhow::Result<()> {
    let store = workspace.positions();

    match command {
        PositionsCommands::List { diagram } => {
            let positions = store.load(&diagram).await?;
            if positions.is_empty() {
                println!("{}", format!("No saved positions for '{}'", diagram).yellow());
                return Ok(());
            }

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Node", "X", "Y"]);
            for (node, position) in &positions {
                table.add_row(vec![
                    node.clone(),
                    format!("{:.0}", position.x),
                    format!("{:.0}", position.y),
                ]);
            }

            println!("{}", format!("Saved positions - {}", diagram).blue().bold());
            println!("{}", table);
        }
        PositionsCommands::Set { diagram, node, x, y } => {
            store.save(&diagram, &node, Position::new(x, y)).await?;
            println!(
                "{} {} → ({}, {})",
                "Saved".green(),
                node.cyan(),
                x,
                y
            );
        }
        PositionsCommands::Clear { diagram } => {
            if store.clear(&diagram).await? {
                println!("{} {}", "Cleared saved positions for".green(), diagram);
            } else {
                println!("{}", format!("No saved positions for '{}'", diagram).yellow());
            }
        }
        PositionsCommands::Export { out } => {
            let all = store.load_all().await?;
            let json = serde_json::to_string_pretty(&all)?;
            match out {
                Some(path) => {
                    tokio::fs::write(&path, json)
                        .await
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!(
                        "{} {} diagram(s) to {}",
                        "Exported".green(),
                        all.len(),
                        path.display()
                    );
                }
                None => println!("{}", json),
            }
        }
        PositionsCommands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let all: AllPositions = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a positions export", file.display()))?;
            store.save_all(&all).await?;
            println!("{} {} diagram(s)", "Imported".green(), all.len());
        }
    }

    Ok(())
}
