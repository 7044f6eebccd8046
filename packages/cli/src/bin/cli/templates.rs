// ABOUTME: Built-in template commands
// ABOUTME: Choosing a template stores it as the pending template shown at the next load

use clap::Subcommand;
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use diagram_cli::Workspace;
use diagram_core::{builtin_templates, find_template};

#[derive(Subcommand)]
pub enum TemplatesCommands {
    /// List built-in templates
    List,
    /// Load a template the next time a diagram is opened
    Use {
        /// Template id
        id: String,
    },
}

pub async fn handle_templates_command(
    workspace: &Workspace,
    command: TemplatesCommands,
) -> anyhow::Result<()> {
    match command {
        TemplatesCommands::List => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["ID", "Name", "Nodes", "Description"]);

            for template in builtin_templates() {
                table.add_row(vec![
                    template.id,
                    template.name,
                    template.config.nodes.len().to_string(),
                    template.description,
                ]);
            }
            println!("{}", table);
        }
        TemplatesCommands::Use { id } => {
            let template = find_template(&id)
                .ok_or_else(|| anyhow::anyhow!("Unknown template: {}", id))?;
            workspace
                .preferences()
                .set_pending_template(&template.config)
                .await?;
            println!(
                "{} '{}' will be loaded the next time a diagram is opened",
                "Template".green(),
                template.name
            );
        }
    }
    Ok(())
}
