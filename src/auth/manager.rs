//! Shared credential store for the portal and the dispatcher
//!
//! The [`CredentialStore`] is the single owner of the process credential. The
//! authorization portal writes to it from the code-exchange path and the
//! request dispatcher writes to it from the refresh path. Both writers hold
//! one async writer lock, so at most one token-writing operation is in
//! flight. The token state itself sits behind a short-lived lock that is
//! never held across a network call, so readers such as the portal status
//! page never wait on a slow token endpoint.
//!
//! Callers interact with it through a handful of methods:
//!
//! - [`CredentialStore::resolve`] -- returns the current credential without
//!   contacting the provider.
//! - [`CredentialStore::ensure_fresh`] -- returns a credential whose access
//!   token has been refreshed (and persisted) when it was stale.
//! - [`CredentialStore::complete_authorization`] -- exchanges a portal
//!   callback code and installs the resulting token set.
//! - [`CredentialStore::authorization_url`] -- builds the consent URL.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use crate::auth::credentials::ClientCredentials;
use crate::auth::flow::OAuthFlow;
use crate::auth::token_store::{OAuthToken, TokenSource, TokenStore};
use crate::config::{Config, GoogleConfig, PortalConfig};
use crate::error::{Result, WorkspaceError};

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Snapshot of the process credential handed to capability handlers.
///
/// A credential without a token (or with a token that carries no access
/// token) is in the Unauthenticated state.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    /// OAuth client identity.
    pub client: ClientCredentials,
    /// Token material, if any has been obtained.
    pub token: Option<OAuthToken>,
}

impl Credential {
    /// Bearer token for remote calls, if present.
    pub fn access_token(&self) -> Option<&str> {
        self.token.as_ref().and_then(OAuthToken::access_token)
    }

    /// Returns `true` when an access token is available.
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    fn is_stale(&self) -> bool {
        self.token.as_ref().is_some_and(OAuthToken::needs_refresh)
    }
}

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct TokenState {
    client: Option<ClientCredentials>,
    token: Option<OAuthToken>,
    source: Option<TokenSource>,
    file_modified: Option<SystemTime>,
}

/// Process-wide owner of the OAuth client identity and token set.
///
/// Construct once at startup, wrap in an [`Arc`], and hand clones to the
/// portal and the dispatcher.
///
/// # Examples
///
/// ```no_run
/// use gg_workspace_mcp::auth::manager::CredentialStore;
/// use gg_workspace_mcp::config::Config;
///
/// # async fn example() -> gg_workspace_mcp::error::Result<()> {
/// let store = CredentialStore::new(&Config::default());
/// let credential = store.ensure_fresh().await?;
/// if !credential.is_authenticated() {
///     println!("Sign in at {}", store.portal_url());
/// }
/// # Ok(())
/// # }
/// ```
pub struct CredentialStore {
    google: GoogleConfig,
    portal: PortalConfig,
    http: Arc<reqwest::Client>,
    tokens: TokenStore,
    state: Mutex<TokenState>,
    writer: tokio::sync::Mutex<()>,
}

impl CredentialStore {
    /// Creates a store with its own HTTP client.
    pub fn new(config: &Config) -> Self {
        Self::with_http(config, Arc::new(reqwest::Client::new()))
    }

    /// Creates a store that shares `http` with the rest of the process.
    pub fn with_http(config: &Config, http: Arc<reqwest::Client>) -> Self {
        Self {
            google: config.google.clone(),
            portal: config.portal.clone(),
            http,
            tokens: TokenStore::new(
                config.google.token_path.clone(),
                config.google.token_json.clone(),
            ),
            state: Mutex::new(TokenState::default()),
            writer: tokio::sync::Mutex::new(()),
        }
    }

    /// URL of the local authorization portal.
    pub fn portal_url(&self) -> String {
        self.portal.public_url()
    }

    /// Persistence adapter backing this store.
    pub fn token_store(&self) -> &TokenStore {
        &self.tokens
    }

    /// Returns the current credential without contacting the provider.
    ///
    /// Token material is loaded on first use (inline JSON first, then the
    /// token file). A token set loaded from the file is reloaded whenever the
    /// file changes on disk. A token set supplied as inline JSON is never
    /// replaced by out-of-band file edits; only this store's own refresh and
    /// authorization writes supersede it.
    ///
    /// Never waits on an in-flight refresh or code exchange.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] when no client identity is
    /// configured, or [`WorkspaceError::CorruptState`] when the token source
    /// exists but cannot be parsed.
    pub async fn resolve(&self) -> Result<Credential> {
        let mut state = self.lock_state()?;
        self.resolve_locked(&mut state)
    }

    /// Returns a credential whose access token is fresh when that is
    /// achievable.
    ///
    /// If the access token is absent or expired and a refresh token exists,
    /// exactly one refresh is attempted. A successful refresh is installed
    /// and persisted before this method returns. A failed refresh is logged
    /// and the stale credential is returned so the caller can surface the
    /// remote error.
    ///
    /// # Errors
    ///
    /// Same as [`resolve`](Self::resolve).
    pub async fn ensure_fresh(&self) -> Result<Credential> {
        let credential = self.resolve().await?;
        if !credential.is_stale() {
            return Ok(credential);
        }

        let _writer = self.writer.lock().await;
        // A concurrent caller may have refreshed while this one waited.
        let credential = self.resolve().await?;
        let Some(current) = credential.token.as_ref().filter(|t| t.needs_refresh()) else {
            return Ok(credential);
        };
        let Some(refresh_token) = current.refresh_token() else {
            tracing::warn!("Access token is stale and no refresh token is available");
            return Ok(credential);
        };

        let flow = OAuthFlow::new(Arc::clone(&self.http), credential.client.clone(), &self.google);
        match flow.refresh_token(refresh_token).await {
            Ok(newer) => {
                let merged = current.merged_with(newer);
                self.install_refreshed(merged.clone())?;
                tracing::info!("Access token refreshed");
                Ok(Credential {
                    client: credential.client,
                    token: Some(merged),
                })
            }
            Err(e) => {
                tracing::warn!("Token refresh failed, continuing with stale credential: {}", e);
                Ok(credential)
            }
        }
    }

    /// Exchanges an authorization code and installs the resulting token set.
    ///
    /// The new token set is persisted before it becomes visible to other
    /// callers. On any failure the in-memory and persisted state are left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] when no client identity is
    /// configured, [`WorkspaceError::Authorization`] when the exchange fails,
    /// or an I/O error when the token set cannot be written.
    pub async fn complete_authorization(&self, code: &str) -> Result<()> {
        let _writer = self.writer.lock().await;
        let client = {
            let mut state = self.lock_state()?;
            self.client_locked(&mut state)?
        };

        let flow = OAuthFlow::new(Arc::clone(&self.http), client, &self.google);
        let issued = flow.exchange_code(code).await?;

        let mut state = self.lock_state()?;
        let token = match &state.token {
            Some(previous) => previous.merged_with(issued),
            None => issued,
        };
        self.tokens.save(&token)?;
        state.file_modified = self.tokens.modified();
        state.source = Some(TokenSource::File);
        state.token = Some(token);

        tracing::info!("Authorization completed, token set persisted");
        Ok(())
    }

    /// Builds the provider consent URL for the configured client.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] when no client identity is
    /// configured.
    pub async fn authorization_url(&self) -> Result<String> {
        let client = {
            let mut state = self.lock_state()?;
            self.client_locked(&mut state)?
        };
        OAuthFlow::new(Arc::clone(&self.http), client, &self.google).authorization_url()
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, TokenState>> {
        self.state.lock().map_err(|_| {
            WorkspaceError::CorruptState("credential state lock poisoned".to_string()).into()
        })
    }

    fn client_locked(&self, state: &mut TokenState) -> Result<ClientCredentials> {
        if let Some(client) = &state.client {
            return Ok(client.clone());
        }
        let client = ClientCredentials::resolve(&self.google, &self.portal)?;
        state.client = Some(client.clone());
        Ok(client)
    }

    fn resolve_locked(&self, state: &mut TokenState) -> Result<Credential> {
        let client = self.client_locked(state)?;
        self.reload_locked(state)?;

        if state.token.is_none() {
            tracing::warn!(
                "No Google credentials found, authorize at {}",
                self.portal.public_url()
            );
        }

        Ok(Credential {
            client,
            token: state.token.clone(),
        })
    }

    fn reload_locked(&self, state: &mut TokenState) -> Result<()> {
        let modified = self.tokens.modified();

        if state.token.is_none() {
            if let Some((token, source)) = self.tokens.load()? {
                tracing::debug!("Loaded token set from {:?} source", source);
                state.file_modified = modified;
                state.source = Some(source);
                state.token = Some(token);
            }
            return Ok(());
        }

        if state.source == Some(TokenSource::Inline) {
            return Ok(());
        }
        if modified.is_none() || modified == state.file_modified {
            return Ok(());
        }

        state.file_modified = modified;
        match self.tokens.load_file() {
            Ok(Some(token)) => {
                tracing::info!(
                    "Token file {} changed on disk, reloaded",
                    self.tokens.path().display()
                );
                state.token = Some(token);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Ignoring unreadable token file update: {}", e);
            }
        }
        Ok(())
    }

    fn install_refreshed(&self, token: OAuthToken) -> Result<()> {
        let mut state = self.lock_state()?;
        if let Err(e) = self.tokens.save(&token) {
            tracing::error!(
                "Failed to persist refreshed token set to {}: {}",
                self.tokens.path().display(),
                e
            );
        }
        state.file_modified = self.tokens.modified();
        state.token = Some(token);
        Ok(())
    }
}

/// Returns `true` when `err` means the caller should go through the portal.
pub fn needs_authorization(err: &anyhow::Error) -> bool {
    err.downcast_ref::<WorkspaceError>()
        .map(WorkspaceError::is_unauthenticated)
        .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
