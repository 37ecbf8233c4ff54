//! Error types for gg-workspace-mcp
//!
//! This module defines the error taxonomy shared by the credential manager,
//! the authorization portal, and the tool dispatcher, using `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

/// Main error type for gg-workspace-mcp operations
///
/// Each variant corresponds to one failure class of the system. Faults that
/// happen below the dispatcher boundary are turned into error results or
/// error pages, never into process exits.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    /// Client identity or credentials source is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authorization-code exchange or token refresh rejected, or no token
    /// available for a remote call
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// A tool invocation carried missing or mistyped arguments
    #[error("Invalid arguments: {0}")]
    Validation(String),

    /// A tool invocation referenced a name that is not registered
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// A downstream capability call failed (network, rejection, bad payload)
    #[error("Remote call failed: {0}")]
    RemoteCall(String),

    /// The persisted token set exists but cannot be parsed
    #[error("Corrupt token state: {0}")]
    CorruptState(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl WorkspaceError {
    /// Returns `true` when the error means the process has no usable
    /// authenticated identity (missing client config or missing tokens).
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Authorization(_))
    }
}

/// Result type alias for application-level operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type.
/// Typed [`WorkspaceError`] values travel inside it and can be recovered with
/// `downcast_ref` when a caller needs to classify a failure.
pub type Result<T> = anyhow::Result<T>;

/// Result type returned by capability handlers
///
/// Handlers yield the text summary shown to the agent, or a typed failure
/// that the dispatcher turns into an error result.
pub type HandlerResult = std::result::Result<String, WorkspaceError>;
