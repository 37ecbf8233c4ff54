//! gg-workspace-mcp - Google Workspace tools over MCP
//!
#![doc = "gg-workspace-mcp - Google Workspace tools over MCP"]
#![doc = "Main entry point for the MCP server and its authorization portal."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use gg_workspace_mcp::cli::{Cli, Commands};
use gg_workspace_mcp::commands;
use gg_workspace_mcp::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env never override variables already set
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref().unwrap_or("gg-workspace.yaml");
    let config = Config::load(config_path, &cli)?;
    config.validate()?;

    match cli.command() {
        Commands::Serve => {
            tracing::info!("Starting MCP server");
            commands::serve::run_serve(config).await
        }
        Commands::Portal => {
            tracing::info!("Starting authorization portal");
            commands::portal_only::run_portal(config).await
        }
        Commands::Status => commands::status::run_status(config).await,
        Commands::Tools => commands::tools::run_tools(),
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr; stdout carries the protocol.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "gg_workspace_mcp=debug"
    } else {
        "gg_workspace_mcp=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
