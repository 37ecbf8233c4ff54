//! Request dispatcher
//!
//! Turns a [`ToolInvocation`] into a [`ToolResult`]. The steps run in a fixed
//! order for every call:
//!
//! 1. look the tool up in the registry,
//! 2. obtain a fresh credential from the [`CredentialStore`] (refreshing and
//!    persisting it when stale),
//! 3. validate the arguments against the tool's schema,
//! 4. invoke the capability handler exactly once.
//!
//! Every failure along the way becomes an error result. Nothing escapes
//! [`Dispatcher::dispatch`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::ToolArgs;
use super::{ToolRegistry, ToolResult};
use crate::auth::manager::{Credential, CredentialStore};
use crate::error::{HandlerResult, WorkspaceError};

/// A single tool call as received from the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Registered tool name.
    pub name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    /// Creates an invocation from a name and a JSON object of arguments.
    ///
    /// Non-object `arguments` are treated as empty.
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments: match arguments {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }
}

/// Performs the remote work behind each tool.
///
/// Implementations receive arguments that already passed schema validation
/// and the credential produced by the refresh step. A handler reports
/// failure through [`HandlerResult`]; it must not panic.
#[async_trait]
pub trait CapabilityHandler: Send + Sync {
    /// Runs `tool` and returns the text shown to the agent.
    async fn invoke(&self, tool: &str, args: &ToolArgs, credential: &Credential) -> HandlerResult;
}

/// Routes validated invocations to the capability handler.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    store: Arc<CredentialStore>,
    handler: Arc<dyn CapabilityHandler>,
}

impl Dispatcher {
    /// Creates a dispatcher over a registry, a shared credential store, and
    /// the handler implementing every registered tool.
    pub fn new(
        registry: Arc<ToolRegistry>,
        store: Arc<CredentialStore>,
        handler: Arc<dyn CapabilityHandler>,
    ) -> Self {
        Self {
            registry,
            store,
            handler,
        }
    }

    /// The registry this dispatcher validates against.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Executes one invocation and returns its normalized result.
    pub async fn dispatch(&self, invocation: ToolInvocation) -> ToolResult {
        let Some(definition) = self.registry.get(&invocation.name) else {
            tracing::debug!("Rejected call to unknown tool {}", invocation.name);
            return ToolResult::error(WorkspaceError::ToolNotFound(invocation.name));
        };

        let credential = match self.store.ensure_fresh().await {
            Ok(credential) => credential,
            Err(e) => return self.failure(&invocation.name, classify(e)),
        };

        let args = match definition.schema.validate(&invocation.arguments) {
            Ok(args) => args,
            Err(e) => return self.failure(&invocation.name, e),
        };

        tracing::debug!("Dispatching {}", invocation.name);
        match self.handler.invoke(&definition.name, &args, &credential).await {
            Ok(text) => ToolResult::success(text),
            Err(e) => self.failure(&invocation.name, e),
        }
    }

    fn failure(&self, tool: &str, err: WorkspaceError) -> ToolResult {
        tracing::debug!("Tool {} failed: {}", tool, err);
        if err.is_unauthenticated() {
            ToolResult::error(format!(
                "{err}. Open {} to authorize.",
                self.store.portal_url()
            ))
        } else {
            ToolResult::error(err)
        }
    }
}

/// Recovers the typed error carried by an application-level error.
fn classify(err: anyhow::Error) -> WorkspaceError {
    match err.downcast::<WorkspaceError>() {
        Ok(typed) => typed,
        Err(other) => WorkspaceError::RemoteCall(other.to_string()),
    }
}
