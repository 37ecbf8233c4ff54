/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `serve`  -- Authorization portal plus the MCP server on stdio
- `portal` -- Authorization portal only
- `status` -- Print the authentication status
- `tools`  -- Print the tool catalog as JSON

Every handler builds its components from the same [`Services`] so the
portal and the dispatcher share one credential store.
*/

use std::sync::Arc;

use crate::auth::manager::CredentialStore;
use crate::config::Config;
use crate::error::Result;
use crate::tools::dispatcher::Dispatcher;
use crate::tools::ToolRegistry;
use crate::workspace::GoogleWorkspace;

/// Long-lived components shared by the portal and the MCP server.
pub struct Services {
    /// Credential store shared by every surface.
    pub store: Arc<CredentialStore>,
    /// Dispatcher over the Google Workspace catalog.
    pub dispatcher: Arc<Dispatcher>,
}

impl Services {
    /// Wires the credential store, the catalog, and the Google handler.
    ///
    /// One HTTP client is shared by token requests and API calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the tool catalog cannot be registered.
    pub fn build(config: &Config) -> Result<Self> {
        let http = Arc::new(reqwest::Client::new());
        let store = Arc::new(CredentialStore::with_http(config, Arc::clone(&http)));
        let registry = Arc::new(ToolRegistry::workspace()?);
        let handler = Arc::new(GoogleWorkspace::new(http, config.api.clone()));
        let dispatcher = Arc::new(Dispatcher::new(registry, Arc::clone(&store), handler));
        Ok(Self { store, dispatcher })
    }
}

// Serve command handler
pub mod serve {
    //! Default mode: portal in the background, MCP protocol on stdio.
    //!
    //! The portal is a convenience. If its port cannot be bound the failure
    //! is logged and the MCP server still starts, since tool calls against an
    //! existing token set do not need it.

    use super::*;
    use crate::auth::needs_authorization;
    use crate::mcp::McpServer;
    use crate::portal;

    /// Run the portal and the stdio MCP server until stdin closes
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error only when the stdio transport fails.
    pub async fn run_serve(config: Config) -> Result<()> {
        let services = Services::build(&config)?;

        match portal::bind(&config.portal).await {
            Ok(listener) => {
                let store = Arc::clone(&services.store);
                tokio::spawn(async move {
                    if let Err(e) = portal::serve(listener, store).await {
                        tracing::error!("Authorization portal stopped: {}", e);
                    }
                });
            }
            Err(e) => tracing::error!(
                "Authorization portal unavailable on port {}: {}",
                config.portal.port,
                e
            ),
        }

        warn_if_unauthenticated(&services.store).await;
        McpServer::new(services.dispatcher).serve_stdio().await
    }

    async fn warn_if_unauthenticated(store: &CredentialStore) {
        match store.resolve().await {
            Ok(credential) if credential.is_authenticated() => {
                tracing::info!("Google credentials loaded")
            }
            Ok(_) => {}
            Err(e) if needs_authorization(&e) => tracing::warn!(
                "Credentials unavailable ({}), authorize at {}",
                e,
                store.portal_url()
            ),
            Err(e) => tracing::warn!("Credentials unavailable: {}", e),
        }
    }
}

// Portal command handler
pub mod portal_only {
    //! Runs the authorization portal in the foreground.

    use super::*;
    use crate::portal;

    /// Run the authorization portal until it fails
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be bound or the server stops.
    pub async fn run_portal(config: Config) -> Result<()> {
        let services = Services::build(&config)?;
        let listener = portal::bind(&config.portal).await?;
        println!("Authorization portal: {}", services.store.portal_url());
        portal::serve(listener, services.store).await
    }
}

// Status command handler
pub mod status {
    //! One-shot authentication report.

    use super::*;

    /// Describes the credential the store resolves to.
    ///
    /// Never contacts the provider.
    ///
    /// # Errors
    ///
    /// Returns the resolution error for a missing client identity or a
    /// corrupt token file.
    pub async fn report(store: &CredentialStore) -> Result<String> {
        let credential = store.resolve().await?;
        let path = store.token_store().path().display();
        let report = match &credential.token {
            Some(token) if token.access_token().is_some() => {
                let expiry = match token.expires_at {
                    Some(at) if token.is_expired() => format!("expired at {at}"),
                    Some(at) => format!("expires at {at}"),
                    None => "no expiry recorded".to_string(),
                };
                let refresh = if token.refresh_token().is_some() {
                    "refresh token present"
                } else {
                    "no refresh token"
                };
                format!("Authenticated ({expiry}, {refresh})\nToken file: {path}")
            }
            Some(_) => format!(
                "Refresh token only; an access token will be obtained on the next call\nToken file: {path}"
            ),
            None => format!(
                "Not authenticated. Open {} to authorize.\nToken file: {path}",
                store.portal_url()
            ),
        };
        Ok(report)
    }

    /// Print the authentication status
    ///
    /// # Errors
    ///
    /// See [`report`].
    pub async fn run_status(config: Config) -> Result<()> {
        let store = CredentialStore::new(&config);
        println!("{}", report(&store).await?);
        Ok(())
    }
}

// Tools command handler
pub mod tools {
    //! Prints the published catalog.

    use super::*;
    use crate::mcp::types::McpTool;

    /// Renders the catalog exactly as `tools/list` publishes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be registered or serialized.
    pub fn catalog_json() -> Result<String> {
        let registry = ToolRegistry::workspace()?;
        let tools: Vec<McpTool> = registry.definitions().iter().map(McpTool::from).collect();
        Ok(serde_json::to_string_pretty(&tools)?)
    }

    /// Print the tool catalog as JSON
    ///
    /// # Errors
    ///
    /// See [`catalog_json`].
    pub fn run_tools() -> Result<()> {
        println!("{}", catalog_json()?);
        Ok(())
    }
}
