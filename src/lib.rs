//! gg-workspace-mcp - Google Workspace tools for MCP agents
//!
//! This library exposes Gmail, Calendar, Drive, Docs, Sheets, and Slides
//! operations as MCP tools, backed by a shared OAuth credential store and a
//! small local portal for interactive authorization.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `auth`: Client identity, token persistence, and the credential store
//! - `portal`: Local HTTP portal for the OAuth consent round trip
//! - `tools`: Tool catalog, argument schemas, and the dispatcher
//! - `workspace`: Capability handler calling the Google REST APIs
//! - `mcp`: JSON-RPC types and the stdio server loop
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use gg_workspace_mcp::{Config, CredentialStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("gg-workspace.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let store = CredentialStore::new(&config);
//!     let credential = store.ensure_fresh().await?;
//!     println!("authenticated: {}", credential.is_authenticated());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod mcp;
pub mod portal;
pub mod tools;
pub mod workspace;

// Re-export commonly used types
pub use auth::{Credential, CredentialStore};
pub use config::Config;
pub use error::{Result, WorkspaceError};
pub use tools::dispatcher::{CapabilityHandler, Dispatcher, ToolInvocation};
pub use tools::{ToolRegistry, ToolResult};
pub use workspace::GoogleWorkspace;
