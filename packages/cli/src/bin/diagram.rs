use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use diagram_cli::{init_tracing, Workspace};
use diagram_config::AppConfig;

mod cli;

use cli::positions::PositionsCommands;
use cli::prefs::PrefsCommands;
use cli::templates::TemplatesCommands;

#[derive(Parser)]
#[command(name = "diagram")]
#[command(about = "Diagram Designer - live system diagrams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the diagram API server
    Serve {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Directory holding diagram configurations
        #[arg(long)]
        configs_dir: Option<PathBuf>,
        /// Directory holding node detail documents
        #[arg(long)]
        details_dir: Option<PathBuf>,
    },
    /// List the diagrams a server offers
    List {
        /// Server base URL (defaults to DIAGRAM_API_URL)
        #[arg(long)]
        server: Option<String>,
    },
    /// Print the render graph of a diagram as JSON
    Graph {
        /// Diagram id, such as diagram-config.json
        diagram: String,
        #[arg(long)]
        server: Option<String>,
        /// Read the configuration from a local file instead of the server
        #[arg(long)]
        file: Option<PathBuf>,
        /// Show node coordinates (defaults to the saved preference)
        #[arg(long)]
        show_coordinates: bool,
    },
    /// Print the detail page of a node as JSON
    Details {
        diagram: String,
        /// Unique node name
        node: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Export a diagram with its saved node positions
    Export {
        diagram: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        /// Output file or directory (prints to stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Manage saved node positions
    #[command(subcommand)]
    Positions(PositionsCommands),
    /// Browse built-in templates
    #[command(subcommand)]
    Templates(TemplatesCommands),
    /// Viewer preferences
    #[command(subcommand)]
    Prefs(PrefsCommands),
    /// Mount every node of a diagram and log status and metric changes
    Watch {
        diagram: String,
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(command: Commands) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    init_tracing(&config);

    match command {
        Commands::Serve {
            port,
            configs_dir,
            details_dir,
        } => {
            if let Some(port) = port {
                config.api_port = port;
            }
            if let Some(dir) = configs_dir {
                config.configs_dir = dir;
            }
            if let Some(dir) = details_dir {
                config.details_dir = dir;
            }
            println!(
                "{} http://localhost:{}",
                "Diagram API starting on".green(),
                config.api_port
            );
            println!("{} {}", "CORS origin:".dimmed(), config.cors_origin);
            diagram_api::serve(&config).await?;
            Ok(())
        }
        command => {
            let workspace = Workspace::open(config).await?;
            handle_command(&workspace, command).await
        }
    }
}

async fn handle_command(workspace: &Workspace, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve { .. } => Ok(()),
        Commands::List { server } => cli::diagrams::list(workspace, server.as_deref()).await,
        Commands::Graph {
            diagram,
            server,
            file,
            show_coordinates,
        } => {
            cli::diagrams::graph(
                workspace,
                &diagram,
                server.as_deref(),
                file.as_deref(),
                show_coordinates,
            )
            .await
        }
        Commands::Details {
            diagram,
            node,
            server,
            file,
        } => {
            cli::diagrams::details(
                workspace,
                &diagram,
                &node,
                server.as_deref(),
                file.as_deref(),
            )
            .await
        }
        Commands::Export {
            diagram,
            server,
            file,
            out,
        } => {
            cli::diagrams::export(
                workspace,
                &diagram,
                server.as_deref(),
                file.as_deref(),
                out.as_deref(),
            )
            .await
        }
        Commands::Positions(cmd) => cli::positions::handle_positions_command(workspace, cmd).await,
        Commands::Templates(cmd) => cli::templates::handle_templates_command(workspace, cmd).await,
        Commands::Prefs(cmd) => cli::prefs::handle_prefs_command(workspace, cmd).await,
        Commands::Watch { diagram, server } => {
            cli::watch::watch(workspace, &diagram, server.as_deref()).await
        }
    }
}
