//! Command-line interface definition for gg-workspace-mcp
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// gg-workspace-mcp - Google Workspace tools for MCP agents
///
/// Serves Gmail, Calendar, Drive, Docs, Sheets, and Slides tools over the
/// Model Context Protocol on stdio, alongside a local OAuth portal.
#[derive(Parser, Debug, Clone)]
#[command(name = "gg-workspace-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gg-workspace.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the authorization portal port
    #[arg(long)]
    pub auth_port: Option<u16>,

    /// Override the token file location
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    /// Command to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the authorization portal and the MCP server on stdio
    Serve,

    /// Run only the authorization portal
    Portal,

    /// Print the current authentication status and exit
    Status,

    /// Print the tool catalog as JSON and exit
    Tools,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the selected command, falling back to [`Commands::Serve`]
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("gg-workspace.yaml".to_string()),
            verbose: false,
            auth_port: None,
            token_path: None,
            command: None,
        }
    }
}
