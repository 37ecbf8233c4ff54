//! OAuth token persistence on the local filesystem
//!
//! The persisted form is a single JSON object using the field names written
//! by the Google client libraries (`access_token`, `refresh_token`,
//! `expiry_date` in epoch milliseconds, ...), so token files produced by other
//! Google tooling can be reused as-is.
//!
//! Saves replace the whole file through a temporary sibling followed by a
//! rename, so a reader never observes a partially written token set.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkspaceError};

/// Seconds before the nominal expiry at which a token is already treated as
/// stale.
const EXPIRY_BUFFER_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// OAuthToken
// ---------------------------------------------------------------------------

/// The token-bearing half of a credential, as issued by the provider.
///
/// `access_token` and `expires_at` travel together: a token set either has
/// both or neither, except for access tokens issued without a lifetime, which
/// are treated as non-expiring.
///
/// # Examples
///
/// ```
/// use gg_workspace_mcp::auth::token_store::OAuthToken;
/// use chrono::{Duration, Utc};
///
/// let token = OAuthToken {
///     access_token: Some("ya29.token".to_string()),
///     refresh_token: Some("1//refresh".to_string()),
///     expires_at: Some(Utc::now() + Duration::hours(1)),
///     ..OAuthToken::default()
/// };
/// assert!(!token.is_expired());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    /// Short-lived bearer token for API calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Long-lived token used to mint new access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Expiry of `access_token`, persisted as epoch milliseconds.
    #[serde(
        rename = "expiry_date",
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub expires_at: Option<DateTime<Utc>>,

    /// Space-separated scopes granted by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Token type, typically `"Bearer"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// OpenID Connect identity token, when issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

impl OAuthToken {
    /// Returns the access token when one is present and non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns the refresh token when one is present and non-empty.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Returns `true` when the access token is expired or about to expire.
    ///
    /// A 60-second buffer is applied so that a refresh happens before the
    /// provider starts rejecting the token. Tokens with no `expires_at` are
    /// considered perpetually valid.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            None => false,
            Some(expires_at) => expires_at
                .checked_sub_signed(chrono::Duration::seconds(EXPIRY_BUFFER_SECS))
                .map_or(true, |deadline| Utc::now() >= deadline),
        }
    }

    /// Returns `true` when the token set cannot authorize a call as-is.
    pub fn needs_refresh(&self) -> bool {
        self.access_token().is_none() || self.is_expired()
    }

    /// Folds a newly issued token set over this one.
    ///
    /// Providers omit the refresh token (and sometimes the scope) from
    /// refresh responses; those fields are carried over from the previous
    /// token set.
    pub fn merged_with(&self, newer: OAuthToken) -> OAuthToken {
        OAuthToken {
            refresh_token: newer.refresh_token.or_else(|| self.refresh_token.clone()),
            scope: newer.scope.or_else(|| self.scope.clone()),
            ..newer
        }
    }
}

// ---------------------------------------------------------------------------
// TokenStore
// ---------------------------------------------------------------------------

/// Where a loaded token set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Inline JSON supplied through configuration.
    Inline,
    /// The on-disk token file.
    File,
}

/// Reads and writes the durable token set.
///
/// An inline token blob from configuration takes priority over the token
/// file on load; saves always go to the token file.
///
/// # Examples
///
/// ```no_run
/// use gg_workspace_mcp::auth::token_store::{OAuthToken, TokenStore};
///
/// # fn example() -> gg_workspace_mcp::error::Result<()> {
/// let store = TokenStore::new(".token.json", None);
/// store.save(&OAuthToken {
///     access_token: Some("ya29.token".to_string()),
///     ..OAuthToken::default()
/// })?;
/// assert!(store.load()?.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
    inline: Option<String>,
}

impl TokenStore {
    /// Creates a store backed by `path`, with an optional inline blob that
    /// overrides the file on load.
    pub fn new(path: impl Into<PathBuf>, inline: Option<String>) -> Self {
        Self {
            path: path.into(),
            inline,
        }
    }

    /// Location of the token file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the token set, preferring the inline blob over the file.
    ///
    /// Returns `Ok(None)` when neither source holds token material.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::CorruptState`] if a source exists but does
    /// not parse as a token set, or [`WorkspaceError::Io`] if the file cannot
    /// be read for a reason other than being absent.
    pub fn load(&self) -> Result<Option<(OAuthToken, TokenSource)>> {
        if let Some(inline) = &self.inline {
            let token = parse_token(inline, "inline token JSON")?;
            return Ok(Some((token, TokenSource::Inline)));
        }

        Ok(self.load_file()?.map(|token| (token, TokenSource::File)))
    }

    /// Loads the token set from the file only.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_file(&self) -> Result<Option<OAuthToken>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WorkspaceError::Io(e).into()),
        };

        let origin = self.path.display().to_string();
        parse_token(&contents, &origin).map(Some)
    }

    /// Last modification time of the token file, if it exists.
    pub fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
    }

    /// Overwrites the token file with `token`.
    ///
    /// The JSON is written to a temporary file in the same directory and then
    /// renamed over the target, so readers see either the old or the new
    /// token set, never a truncated one. The temporary file is created with
    /// owner-only permissions.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::Serialization`] or [`WorkspaceError::Io`].
    pub fn save(&self, token: &OAuthToken) -> Result<()> {
        let json = serde_json::to_vec_pretty(token).map_err(WorkspaceError::Serialization)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(WorkspaceError::Io)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(WorkspaceError::Io)?;
        tmp.write_all(&json).map_err(WorkspaceError::Io)?;
        tmp.as_file().sync_all().map_err(WorkspaceError::Io)?;
        tmp.persist(&self.path)
            .map_err(|e| WorkspaceError::Io(e.error))?;

        tracing::debug!("Token set written to {}", self.path.display());
        Ok(())
    }
}

fn parse_token(contents: &str, origin: &str) -> Result<OAuthToken> {
    serde_json::from_str(contents).map_err(|e| {
        WorkspaceError::CorruptState(format!("{} is not a valid token set: {}", origin, e)).into()
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn full_token() -> OAuthToken {
        OAuthToken {
            access_token: Some("access_abc".to_string()),
            refresh_token: Some("refresh_xyz".to_string()),
            // Fixed millisecond timestamp avoids sub-millisecond precision loss.
            expires_at: DateTime::from_timestamp_millis(1_800_000_000_123),
            scope: Some("https://www.googleapis.com/auth/drive".to_string()),
            token_type: Some("Bearer".to_string()),
            id_token: None,
        }
    }

    // -----------------------------------------------------------------------
    // OAuthToken
    // -----------------------------------------------------------------------

    #[test]
    fn test_token_is_expired_when_past_expiry() {
        let token = OAuthToken {
            access_token: Some("tok".to_string()),
            expires_at: Some(Utc::now() - Duration::seconds(1)),
            ..OAuthToken::default()
        };
        assert!(token.is_expired());
        assert!(token.needs_refresh());
    }

    #[test]
    fn test_token_is_expired_within_buffer_window() {
        let token = OAuthToken {
            access_token: Some("tok".to_string()),
            expires_at: Some(Utc::now() + Duration::seconds(30)),
            ..OAuthToken::default()
        };
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_with_earliest_expiry_is_expired() {
        let token = OAuthToken {
            access_token: Some("tok".to_string()),
            expires_at: Some(DateTime::<Utc>::MIN_UTC),
            ..OAuthToken::default()
        };
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_not_expired_when_future_expiry() {
        let token = OAuthToken {
            access_token: Some("tok".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            ..OAuthToken::default()
        };
        assert!(!token.is_expired());
        assert!(!token.needs_refresh());
    }

    #[test]
    fn test_token_without_access_token_needs_refresh() {
        let token = OAuthToken {
            refresh_token: Some("refresh".to_string()),
            ..OAuthToken::default()
        };
        assert!(token.needs_refresh());
        assert_eq!(token.refresh_token(), Some("refresh"));
    }

    #[test]
    fn test_empty_access_token_is_treated_as_absent() {
        let token = OAuthToken {
            access_token: Some(String::new()),
            ..OAuthToken::default()
        };
        assert!(token.access_token().is_none());
        assert!(token.needs_refresh());
    }

    #[test]
    fn test_merged_with_keeps_previous_refresh_token() {
        let old = full_token();
        let newer = OAuthToken {
            access_token: Some("new_access".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
            token_type: Some("Bearer".to_string()),
            ..OAuthToken::default()
        };

        let merged = old.merged_with(newer);
        assert_eq!(merged.access_token(), Some("new_access"));
        assert_eq!(merged.refresh_token(), Some("refresh_xyz"));
        assert_eq!(merged.scope, old.scope);
    }

    #[test]
    fn test_merged_with_prefers_new_refresh_token() {
        let old = full_token();
        let newer = OAuthToken {
            access_token: Some("new_access".to_string()),
            refresh_token: Some("rotated".to_string()),
            ..OAuthToken::default()
        };
        assert_eq!(old.merged_with(newer).refresh_token(), Some("rotated"));
    }

    #[test]
    fn test_token_parses_google_library_format() {
        let json = r#"{
            "access_token": "ya29.a0",
            "refresh_token": "1//0g",
            "scope": "https://www.googleapis.com/auth/gmail.modify",
            "token_type": "Bearer",
            "expiry_date": 1800000000123
        }"#;
        let token: OAuthToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token(), Some("ya29.a0"));
        assert_eq!(
            token.expires_at,
            DateTime::from_timestamp_millis(1_800_000_000_123)
        );
    }

    // -----------------------------------------------------------------------
    // TokenStore
    // -----------------------------------------------------------------------

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"), None);
        let token = full_token();

        store.save(&token).unwrap();
        let (loaded, source) = store.load().unwrap().expect("token present");

        assert_eq!(loaded, token);
        assert_eq!(source, TokenSource::File);
    }

    #[test]
    fn test_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("absent.json"), None);
        assert!(store.load().unwrap().is_none());
        assert!(store.modified().is_none());
    }

    #[test]
    fn test_load_corrupt_file_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = TokenStore::new(&path, None).load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkspaceError>(),
            Some(WorkspaceError::CorruptState(_))
        ));
    }

    #[test]
    fn test_load_wrong_shape_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = TokenStore::new(&path, None).load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WorkspaceError>(),
            Some(WorkspaceError::CorruptState(_))
        ));
    }

    #[test]
    fn test_inline_blob_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        let store_file = TokenStore::new(&path, None);
        store_file.save(&full_token()).unwrap();

        let inline = r#"{"access_token":"inline_access","refresh_token":"inline_refresh"}"#;
        let store = TokenStore::new(&path, Some(inline.to_string()));
        let (loaded, source) = store.load().unwrap().unwrap();

        assert_eq!(source, TokenSource::Inline);
        assert_eq!(loaded.access_token(), Some("inline_access"));
    }

    #[test]
    fn test_corrupt_inline_blob_is_corrupt_state() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("t.json"), Some("nope".to_string()));
        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("inline token JSON"));
    }

    #[test]
    fn test_save_overwrites_completely() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"), None);
        store.save(&full_token()).unwrap();

        let minimal = OAuthToken {
            access_token: Some("only_access".to_string()),
            ..OAuthToken::default()
        };
        store.save(&minimal).unwrap();

        let loaded = store.load_file().unwrap().unwrap();
        assert_eq!(loaded, minimal);
        assert!(loaded.refresh_token.is_none());
    }

    #[test]
    fn test_save_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("nested/dir/token.json"), None);
        store.save(&full_token()).unwrap();
        assert!(store.path().exists());
        assert!(store.modified().is_some());
    }

    #[test]
    fn test_save_leaves_no_temporary_files() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"), None);
        store.save(&full_token()).unwrap();
        store.save(&full_token()).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
