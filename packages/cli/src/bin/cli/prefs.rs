// ABOUTME: Viewer preference commands
// ABOUTME: Selected diagram, coordinate display and window title

use clap::{builder::BoolishValueParser, Subcommand};
use colored::*;
use diagram_cli::Workspace;

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Show current preferences
    Show,
    /// Remember the selected diagram
    Select { diagram: String },
    /// Show or hide node coordinates (true/false, on/off, yes/no)
    ShowCoordinates {
        #[arg(value_parser = BoolishValueParser::new())]
        enabled: bool,
    },
    /// Set the window title
    Title { text: String },
}

pub async fn handle_prefs_command(
    workspace: &Workspace,
    command: PrefsCommands,
) -> anyhow::Result<()> {
    let prefs = workspace.preferences();

    match command {
        PrefsCommands::Show => {
            let selected = prefs.selected_diagram().await?;
            let show_coordinates = prefs.show_coordinates().await?;
            let title = prefs.window_title().await?;

            println!("{}", "Preferences".blue().bold());
            println!(
                "  Selected diagram: {}",
                selected.as_deref().unwrap_or("(none)").cyan()
            );
            println!("  Show coordinates: {}", show_coordinates);
            println!(
                "  Window title:     {}",
                title.as_deref().unwrap_or("(default)")
            );
        }
        PrefsCommands::Select { diagram } => {
            prefs.set_selected_diagram(&diagram).await?;
            println!("{} {}", "Selected".green(), diagram);
        }
        PrefsCommands::ShowCoordinates { enabled } => {
            prefs.set_show_coordinates(enabled).await?;
            println!(
                "{} {}",
                "Coordinates".green(),
                if enabled { "shown" } else { "hidden" }
            );
        }
        PrefsCommands::Title { text } => {
            prefs.set_window_title(&text).await?;
            println!("{} {}", "Window title set to".green(), text);
        }
    }
    Ok(())
}
