//! OAuth 2.0 authorization code flow against Google's identity endpoints
//!
//! This module builds the consent URL and talks to the token endpoint. It
//! holds no state of its own: the [`CredentialStore`] decides when a flow
//! step runs and owns the resulting tokens.
//!
//! # Flow overview
//!
//! 1. Build the consent URL with the fixed Workspace scope set,
//!    `access_type=offline` and `prompt=consent` so a refresh token is always
//!    issued.
//! 2. The provider redirects the browser to the portal callback with `code`.
//! 3. Exchange `code` for a token set (single attempt).
//! 4. Later, trade the refresh token for a new access token (single attempt).
//!
//! [`CredentialStore`]: crate::auth::manager::CredentialStore

use std::collections::HashMap;
use std::sync::Arc;

use url::Url;

use crate::auth::credentials::ClientCredentials;
use crate::auth::token_store::OAuthToken;
use crate::config::GoogleConfig;
use crate::error::{Result, WorkspaceError};

/// Scopes requested on every authorization.
///
/// Covers mail read/modify, labels and settings, Drive, Calendar, Docs,
/// Sheets, and Slides.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/gmail.labels",
    "https://www.googleapis.com/auth/gmail.settings.basic",
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/documents",
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/presentations",
];

// ---------------------------------------------------------------------------
// Token endpoint responses (raw deserialization)
// ---------------------------------------------------------------------------

/// Raw token endpoint response body.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

impl TokenResponse {
    /// Converts the raw response into an [`OAuthToken`], computing the
    /// absolute expiry from `expires_in`.
    fn into_oauth_token(self) -> OAuthToken {
        let expires_at = self.expires_in.map(|secs| {
            chrono::Utc::now() + chrono::Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
        });

        OAuthToken {
            access_token: Some(self.access_token),
            refresh_token: self.refresh_token,
            expires_at,
            scope: self.scope,
            token_type: self.token_type,
            id_token: self.id_token,
        }
    }
}

/// OAuth error body (`{"error": "...", "error_description": "..."}`).
#[derive(Debug, serde::Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

// ---------------------------------------------------------------------------
// OAuthFlow
// ---------------------------------------------------------------------------

/// Stateless driver for the consent URL, code exchange and refresh steps.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use gg_workspace_mcp::auth::credentials::ClientCredentials;
/// use gg_workspace_mcp::auth::flow::OAuthFlow;
/// use gg_workspace_mcp::config::GoogleConfig;
///
/// let client = ClientCredentials {
///     client_id: "my-client".to_string(),
///     client_secret: "my-secret".to_string(),
///     redirect_uri: "http://localhost:3838/callback".to_string(),
/// };
/// let flow = OAuthFlow::new(Arc::new(reqwest::Client::new()), client, &GoogleConfig::default());
/// let url = flow.authorization_url().unwrap();
/// assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
/// assert!(url.contains("access_type=offline"));
/// ```
pub struct OAuthFlow {
    http: Arc<reqwest::Client>,
    client: ClientCredentials,
    auth_uri: String,
    token_uri: String,
}

impl OAuthFlow {
    /// Creates a flow for `client` using the endpoints from `google`.
    pub fn new(http: Arc<reqwest::Client>, client: ClientCredentials, google: &GoogleConfig) -> Self {
        Self {
            http,
            client,
            auth_uri: google.auth_uri.clone(),
            token_uri: google.token_uri.clone(),
        }
    }

    /// Builds the provider consent URL.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] if the configured consent endpoint
    /// is not a valid URL.
    pub fn authorization_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.auth_uri).map_err(|e| {
            WorkspaceError::Config(format!("invalid authorization endpoint URL: {e}"))
        })?;

        url.query_pairs_mut()
            .append_pair("access_type", "offline")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("prompt", "consent")
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.client.client_id)
            .append_pair("redirect_uri", &self.client.redirect_uri);

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for a token set.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Authorization`] if the request fails or the
    /// provider rejects the code.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthToken> {
        let mut params: HashMap<&str, &str> = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("redirect_uri", &self.client.redirect_uri);
        params.insert("client_id", &self.client.client_id);
        params.insert("client_secret", &self.client.client_secret);

        self.request_token(&params, "token exchange").await
    }

    /// Obtains a new access token with `refresh_token`.
    ///
    /// The response usually omits the refresh token; callers merge the result
    /// over the previous token set with [`OAuthToken::merged_with`].
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Authorization`] if the request fails or the
    /// refresh token has been revoked.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<OAuthToken> {
        let mut params: HashMap<&str, &str> = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("client_id", &self.client.client_id);
        params.insert("client_secret", &self.client.client_secret);

        self.request_token(&params, "token refresh").await
    }

    async fn request_token(&self, params: &HashMap<&str, &str>, step: &str) -> Result<OAuthToken> {
        let resp = self
            .http
            .post(&self.token_uri)
            .form(params)
            .send()
            .await
            .map_err(|e| WorkspaceError::Authorization(format!("{step} request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{} ({})", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(WorkspaceError::Authorization(format!(
                "{step} rejected with {status}: {detail}"
            ))
            .into());
        }

        let raw: TokenResponse = resp.json().await.map_err(|e| {
            WorkspaceError::Authorization(format!("failed to parse {step} response: {e}"))
        })?;

        Ok(raw.into_oauth_token())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
