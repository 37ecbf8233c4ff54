//! Configuration management for gg-workspace-mcp
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from an optional YAML file, environment variables, and CLI
//! overrides. The environment variable names are an external contract shared
//! with other Google Workspace tooling and must not change.

use crate::error::{Result, WorkspaceError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the OAuth client id
pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
/// Environment variable holding the OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
/// Environment variable pointing at a Google client secrets file
pub const ENV_CREDENTIALS_PATH: &str = "GOOGLE_CREDENTIALS_PATH";
/// Environment variable pointing at the persisted token file
pub const ENV_TOKEN_PATH: &str = "GOOGLE_TOKEN_PATH";
/// Environment variable carrying an inline token JSON blob
pub const ENV_TOKEN_JSON: &str = "GOOGLE_TOKEN_JSON";
/// Environment variable selecting the authorization portal port
pub const ENV_AUTH_PORT: &str = "AUTH_PORT";
/// Environment variable selecting the calendar time zone
pub const ENV_CALENDAR_TIME_ZONE: &str = "GOOGLE_CALENDAR_TIMEZONE";

/// Main configuration structure
///
/// Holds everything needed to build the credential store, the authorization
/// portal, and the Google Workspace capability handlers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OAuth client identity and token persistence settings
    #[serde(default)]
    pub google: GoogleConfig,
    /// Authorization portal listener settings
    #[serde(default)]
    pub portal: PortalConfig,
    /// Remote API endpoints used by the capability handlers
    #[serde(default)]
    pub api: ApiConfig,
}

/// OAuth client identity and token persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client id; takes precedence over the credentials file
    #[serde(default)]
    pub client_id: Option<String>,

    /// OAuth client secret; required together with `client_id`
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Google client secrets file used when id/secret are not set directly
    #[serde(default = "default_credentials_path")]
    pub credentials_path: PathBuf,

    /// Location of the persisted token set
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,

    /// Inline token JSON; overrides the token file when present
    #[serde(default)]
    pub token_json: Option<String>,

    /// Provider consent endpoint
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    /// Provider token endpoint
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_credentials_path() -> PathBuf {
    PathBuf::from("credentials.json")
}

fn default_token_path() -> PathBuf {
    PathBuf::from(".token.json")
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            credentials_path: default_credentials_path(),
            token_path: default_token_path(),
            token_json: None,
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
        }
    }
}

/// Authorization portal listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Address the portal binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the portal listens on
    #[serde(default = "default_portal_port")]
    pub port: u16,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_portal_port() -> u16 {
    3838
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_portal_port(),
        }
    }
}

impl PortalConfig {
    /// URL a human should open to reach the portal
    pub fn public_url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Redirect target registered with the provider for the callback step
    pub fn redirect_uri(&self) -> String {
        format!("{}/callback", self.public_url())
    }
}

/// Base URLs of the Google Workspace REST APIs
///
/// Every field can be overridden so that tests can point all remote calls at
/// a single local mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Gmail API base URL
    #[serde(default = "default_gmail_base")]
    pub gmail_base: String,
    /// Calendar API base URL
    #[serde(default = "default_calendar_base")]
    pub calendar_base: String,
    /// Drive API base URL
    #[serde(default = "default_drive_base")]
    pub drive_base: String,
    /// Docs API base URL
    #[serde(default = "default_docs_base")]
    pub docs_base: String,
    /// Sheets API base URL
    #[serde(default = "default_sheets_base")]
    pub sheets_base: String,
    /// Slides API base URL
    #[serde(default = "default_slides_base")]
    pub slides_base: String,
    /// IANA time zone applied to created calendar events
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

fn default_gmail_base() -> String {
    "https://gmail.googleapis.com/gmail/v1".to_string()
}

fn default_calendar_base() -> String {
    "https://www.googleapis.com/calendar/v3".to_string()
}

fn default_drive_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_docs_base() -> String {
    "https://docs.googleapis.com/v1".to_string()
}

fn default_sheets_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_slides_base() -> String {
    "https://slides.googleapis.com/v1".to_string()
}

fn default_time_zone() -> String {
    "Asia/Ho_Chi_Minh".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            gmail_base: default_gmail_base(),
            calendar_base: default_calendar_base(),
            drive_base: default_drive_base(),
            docs_base: default_docs_base(),
            sheets_base: default_sheets_base(),
            slides_base: default_slides_base(),
            time_zone: default_time_zone(),
        }
    }
}

impl ApiConfig {
    /// Points every API at the same base URL
    ///
    /// # Examples
    ///
    /// ```
    /// use gg_workspace_mcp::config::ApiConfig;
    ///
    /// let api = ApiConfig::with_base("http://127.0.0.1:9999");
    /// assert_eq!(api.gmail_base, "http://127.0.0.1:9999");
    /// assert_eq!(api.slides_base, "http://127.0.0.1:9999");
    /// ```
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            gmail_base: base.clone(),
            calendar_base: base.clone(),
            drive_base: base.clone(),
            docs_base: base.clone(),
            sheets_base: base.clone(),
            slides_base: base,
            time_zone: default_time_zone(),
        }
    }

    fn bases(&self) -> [(&'static str, &str); 6] {
        [
            ("api.gmail_base", &self.gmail_base),
            ("api.calendar_base", &self.calendar_base),
            ("api.drive_base", &self.drive_base),
            ("api.docs_base", &self.docs_base),
            ("api.sheets_base", &self.sheets_base),
            ("api.slides_base", &self.slides_base),
        ]
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WorkspaceError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| WorkspaceError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Some(client_id) = non_empty_env(ENV_CLIENT_ID) {
            self.google.client_id = Some(client_id);
        }
        if let Some(client_secret) = non_empty_env(ENV_CLIENT_SECRET) {
            self.google.client_secret = Some(client_secret);
        }
        if let Some(path) = non_empty_env(ENV_CREDENTIALS_PATH) {
            self.google.credentials_path = PathBuf::from(path);
        }
        if let Some(path) = non_empty_env(ENV_TOKEN_PATH) {
            self.google.token_path = PathBuf::from(path);
        }
        if let Some(token_json) = non_empty_env(ENV_TOKEN_JSON) {
            self.google.token_json = Some(token_json);
        }
        if let Some(port) = non_empty_env(ENV_AUTH_PORT) {
            match port.parse::<u16>() {
                Ok(port) => self.portal.port = port,
                Err(_) => tracing::warn!("Ignoring invalid {} value: {}", ENV_AUTH_PORT, port),
            }
        }
        if let Some(tz) = non_empty_env(ENV_CALENDAR_TIME_ZONE) {
            self.api.time_zone = tz;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(port) = cli.auth_port {
            self.portal.port = port;
        }
        if let Some(path) = &cli.token_path {
            self.google.token_path = path.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.portal.port == 0 {
            return Err(WorkspaceError::Config("portal.port must be greater than 0".to_string()).into());
        }

        if self.google.token_path.as_os_str().is_empty() {
            return Err(
                WorkspaceError::Config("google.token_path cannot be empty".to_string()).into(),
            );
        }

        for (field, value) in [
            ("google.auth_uri", self.google.auth_uri.as_str()),
            ("google.token_uri", self.google.token_uri.as_str()),
        ]
        .into_iter()
        .chain(self.api.bases())
        {
            if Url::parse(value).is_err() {
                return Err(
                    WorkspaceError::Config(format!("{} is not a valid URL: {}", field, value))
                        .into(),
                );
            }
        }

        if self.api.time_zone.trim().is_empty() {
            return Err(WorkspaceError::Config("api.time_zone cannot be empty".to_string()).into());
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
