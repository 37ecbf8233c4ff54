//! OAuth client identity
//!
//! The client id, secret and redirect target come either straight from
//! configuration or from a Google client secrets file (the JSON downloaded
//! from the Cloud console, with an `installed` or `web` section).

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::config::{GoogleConfig, PortalConfig};
use crate::error::{Result, WorkspaceError};

/// The registered OAuth client this process authenticates as.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Redirect URI the provider sends the authorization code to.
    pub redirect_uri: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    #[serde(default)]
    installed: Option<ClientSecretsEntry>,
    #[serde(default)]
    web: Option<ClientSecretsEntry>,
}

#[derive(Debug, Deserialize)]
struct ClientSecretsEntry {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
}

impl ClientCredentials {
    /// Resolves the client identity from configuration.
    ///
    /// Direct `client_id`/`client_secret` values win, with the redirect URI
    /// pointing at the local portal. Otherwise the client secrets file at
    /// `google.credentials_path` is read.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Config`] when neither source is available or
    /// the client secrets file is malformed.
    pub fn resolve(google: &GoogleConfig, portal: &PortalConfig) -> Result<Self> {
        if let (Some(client_id), Some(client_secret)) =
            (google.client_id.as_ref(), google.client_secret.as_ref())
        {
            return Ok(Self {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                redirect_uri: portal.redirect_uri(),
            });
        }

        if google.credentials_path.exists() {
            return Self::from_secrets_file(&google.credentials_path, portal);
        }

        Err(WorkspaceError::Config(format!(
            "missing client id/secret or credentials file (set GOOGLE_CLIENT_ID and \
             GOOGLE_CLIENT_SECRET, or provide {})",
            google.credentials_path.display()
        ))
        .into())
    }

    fn from_secrets_file(path: &Path, portal: &PortalConfig) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WorkspaceError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let file: ClientSecretsFile = serde_json::from_str(&contents).map_err(|e| {
            WorkspaceError::Config(format!("{} is not a client secrets file: {}", path.display(), e))
        })?;

        let entry = file.installed.or(file.web).ok_or_else(|| {
            WorkspaceError::Config(format!(
                "{} has neither an \"installed\" nor a \"web\" section",
                path.display()
            ))
        })?;

        let redirect_uri = entry
            .redirect_uris
            .into_iter()
            .next()
            .unwrap_or_else(|| portal.redirect_uri());

        Ok(Self {
            client_id: entry.client_id,
            client_secret: entry.client_secret,
            redirect_uri,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn google_with_file(dir: &TempDir, contents: Option<&str>) -> GoogleConfig {
        let path = dir.path().join("credentials.json");
        if let Some(contents) = contents {
            std::fs::write(&path, contents).unwrap();
        }
        GoogleConfig {
            credentials_path: path,
            ..GoogleConfig::default()
        }
    }

    #[test]
    fn test_direct_id_and_secret_win() {
        let dir = TempDir::new().unwrap();
        let mut google = google_with_file(
            &dir,
            Some(r#"{"installed":{"client_id":"file","client_secret":"file"}}"#),
        );
        google.client_id = Some("direct-id".to_string());
        google.client_secret = Some("direct-secret".to_string());

        let creds = ClientCredentials::resolve(&google, &PortalConfig::default()).unwrap();
        assert_eq!(creds.client_id, "direct-id");
        assert_eq!(creds.client_secret, "direct-secret");
        assert_eq!(creds.redirect_uri, "http://localhost:3838/callback");
    }

    #[test]
    fn test_id_without_secret_falls_back_to_file() {
        let dir = TempDir::new().unwrap();
        let mut google = google_with_file(
            &dir,
            Some(r#"{"web":{"client_id":"web-id","client_secret":"web-secret","redirect_uris":["http://localhost:9000/callback"]}}"#),
        );
        google.client_id = Some("lonely-id".to_string());

        let creds = ClientCredentials::resolve(&google, &PortalConfig::default()).unwrap();
        assert_eq!(creds.client_id, "web-id");
        assert_eq!(creds.redirect_uri, "http://localhost:9000/callback");
    }

    #[test]
    fn test_installed_section_preferred_over_web() {
        let dir = TempDir::new().unwrap();
        let google = google_with_file(
            &dir,
            Some(
                r#"{"installed":{"client_id":"inst","client_secret":"s1","redirect_uris":["http://localhost"]},
                    "web":{"client_id":"web","client_secret":"s2"}}"#,
            ),
        );

        let creds = ClientCredentials::resolve(&google, &PortalConfig::default()).unwrap();
        assert_eq!(creds.client_id, "inst");
        assert_eq!(creds.redirect_uri, "http://localhost");
    }

    #[test]
    fn test_missing_redirect_uris_uses_portal_callback() {
        let dir = TempDir::new().unwrap();
        let google = google_with_file(
            &dir,
            Some(r#"{"installed":{"client_id":"inst","client_secret":"s1"}}"#),
        );
        let portal = PortalConfig {
            port: 4100,
            ..PortalConfig::default()
        };

        let creds = ClientCredentials::resolve(&google, &portal).unwrap();
        assert_eq!(creds.redirect_uri, "http://localhost:4100/callback");
    }

    #[test]
    fn test_no_source_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let google = google_with_file(&dir, None);

        let err = ClientCredentials::resolve(&google, &PortalConfig::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkspaceError>(),
            Some(WorkspaceError::Config(_))
        ));
        assert!(err.to_string().contains("missing client id/secret"));
    }

    #[test]
    fn test_malformed_secrets_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let google = google_with_file(&dir, Some(r#"{"other":{}}"#));

        let err = ClientCredentials::resolve(&google, &PortalConfig::default()).unwrap_err();
        assert!(err.to_string().contains("neither"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = ClientCredentials {
            client_id: "id".to_string(),
            client_secret: "super-secret".to_string(),
            redirect_uri: "http://localhost:3838/callback".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
