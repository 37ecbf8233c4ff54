use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use wiremock::MockServer;

use gg_workspace_mcp::auth::token_store::{OAuthToken, TokenStore};
use gg_workspace_mcp::config::{ApiConfig, Config};
use gg_workspace_mcp::{CredentialStore, Dispatcher, GoogleWorkspace, ToolRegistry};

/// Configuration with a client identity and every remote endpoint pointed
/// at `server`. The token file lives in `dir`.
#[allow(dead_code)]
pub fn mock_config(dir: &TempDir, server: &MockServer) -> Config {
    let mut config = Config::default();
    config.google.client_id = Some("test-client".to_string());
    config.google.client_secret = Some("test-secret".to_string());
    config.google.credentials_path = dir.path().join("credentials.json");
    config.google.token_path = dir.path().join("token.json");
    config.google.token_uri = format!("{}/token", server.uri());
    config.api = ApiConfig::with_base(&server.uri());
    config
}

/// Path of the token file used by [`mock_config`].
#[allow(dead_code)]
pub fn token_path(dir: &TempDir) -> PathBuf {
    dir.path().join("token.json")
}

/// Writes a token set to the token file used by [`mock_config`].
#[allow(dead_code)]
pub fn write_token(dir: &TempDir, token: &OAuthToken) {
    TokenStore::new(token_path(dir), None)
        .save(token)
        .expect("failed to write token file");
}

/// A token set that expired an hour ago but can be refreshed.
#[allow(dead_code)]
pub fn expired_token() -> OAuthToken {
    OAuthToken {
        access_token: Some("stale-access".to_string()),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: Some(Utc::now() - Duration::hours(1)),
        token_type: Some("Bearer".to_string()),
        ..OAuthToken::default()
    }
}

/// A token set valid for the next hour.
#[allow(dead_code)]
pub fn fresh_token(access: &str) -> OAuthToken {
    OAuthToken {
        access_token: Some(access.to_string()),
        refresh_token: Some("refresh-1".to_string()),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        token_type: Some("Bearer".to_string()),
        ..OAuthToken::default()
    }
}

/// A dispatcher wired exactly like the binary, against `config`.
#[allow(dead_code)]
pub fn workspace_dispatcher(config: &Config) -> (Dispatcher, Arc<CredentialStore>) {
    let http = Arc::new(reqwest::Client::new());
    let store = Arc::new(CredentialStore::with_http(config, Arc::clone(&http)));
    let dispatcher = Dispatcher::new(
        Arc::new(ToolRegistry::workspace().expect("catalog registers")),
        Arc::clone(&store),
        Arc::new(GoogleWorkspace::new(http, config.api.clone())),
    );
    (dispatcher, store)
}
