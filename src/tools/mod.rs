//! Tools module for gg-workspace-mcp
//!
//! This module contains tool definitions, the tool registry, the Google
//! Workspace tool catalog, and the request dispatcher that turns a tool
//! invocation into a uniform [`ToolResult`].

pub mod catalog;
pub mod dispatcher;
pub mod schema;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkspaceError};
use schema::ArgumentSchema;

/// Tool definition structure
///
/// Immutable description of one callable tool: its unique name, a
/// description for the agent, and the argument schema used for validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    /// Name of the tool
    pub name: String,
    /// Description of what the tool does
    pub description: String,
    /// Declared arguments
    pub schema: ArgumentSchema,
}

impl ToolDefinition {
    /// Create a new tool definition
    ///
    /// # Arguments
    ///
    /// * `name` - Tool name
    /// * `description` - Tool description
    /// * `schema` - Argument schema
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: ArgumentSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

/// Content item inside a [`ToolResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text content.
    Text {
        /// The text.
        text: String,
    },
}

/// Tool result structure
///
/// The uniform response envelope for every invocation. Failures are data:
/// `is_error` is set and the text carries the fault message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content items returned to the agent
    pub content: Vec<ToolContent>,
    /// Whether the invocation failed
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful tool result
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Create a failed tool result
    ///
    /// The message is prefixed with `Error: `.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: format!("Error: {message}"),
            }],
            is_error: true,
        }
    }

    /// Concatenated text of all content items
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Tool registry
///
/// Fixed mapping from tool name to definition. Registration order is kept so
/// the published catalog is stable.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create a new empty tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a list of definitions
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] if two definitions share a name
    pub fn from_definitions(definitions: impl IntoIterator<Item = ToolDefinition>) -> Result<Self> {
        let mut registry = Self::new();
        for definition in definitions {
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Registry holding the full Google Workspace tool catalog
    ///
    /// # Errors
    ///
    /// Returns an error only if the catalog contains duplicate names
    pub fn workspace() -> Result<Self> {
        Self::from_definitions(catalog::definitions())
    }

    /// Register a tool definition
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] if the name is already taken
    pub fn register(&mut self, definition: ToolDefinition) -> Result<()> {
        if self.index.contains_key(&definition.name) {
            return Err(WorkspaceError::Config(format!(
                "duplicate tool name: {}",
                definition.name
            ))
            .into());
        }
        self.index.insert(definition.name.clone(), self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    /// Get a tool definition by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// All definitions in registration order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
