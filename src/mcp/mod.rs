//! MCP (Model Context Protocol) server support
//!
//! Exposes the Google Workspace tool catalog to an agent over
//! newline-delimited JSON-RPC 2.0 on stdio.
//!
//! # Module Layout
//!
//! - `types`  -- protocol constants and JSON-RPC wire types
//! - `server` -- the read/dispatch/write loop

pub mod server;
pub mod types;

pub use server::McpServer;
