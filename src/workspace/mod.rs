//! Google Workspace capability handlers
//!
//! [`GoogleWorkspace`] implements [`CapabilityHandler`] for the full tool
//! catalog. Each tool is a thin translation over one or two REST calls made
//! with the caller's bearer token; service-specific code lives in one
//! submodule per Google API.

mod calendar;
mod docs;
mod drive;
mod gmail;
mod sheets;
mod slides;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::manager::Credential;
use crate::config::ApiConfig;
use crate::error::{HandlerResult, WorkspaceError};
use crate::tools::catalog;
use crate::tools::dispatcher::CapabilityHandler;
use crate::tools::schema::ToolArgs;

/// Capability handler backed by the Google Workspace REST APIs.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use gg_workspace_mcp::config::ApiConfig;
/// use gg_workspace_mcp::workspace::GoogleWorkspace;
///
/// let handler = GoogleWorkspace::new(Arc::new(reqwest::Client::new()), ApiConfig::default());
/// assert_eq!(handler.api().time_zone, "Asia/Ho_Chi_Minh");
/// ```
pub struct GoogleWorkspace {
    http: Arc<reqwest::Client>,
    api: ApiConfig,
}

impl GoogleWorkspace {
    /// Creates a handler using `http` for every remote call.
    pub fn new(http: Arc<reqwest::Client>, api: ApiConfig) -> Self {
        Self { http, api }
    }

    /// Endpoint configuration in use.
    pub fn api(&self) -> &ApiConfig {
        &self.api
    }

    /// Builds an authorized request to `base` extended by `segments`.
    ///
    /// Each segment is percent-encoded individually, so user-supplied ids
    /// and A1 ranges cannot alter the path structure.
    fn request(
        &self,
        method: Method,
        base: &str,
        segments: &[&str],
        token: &str,
    ) -> Result<RequestBuilder, WorkspaceError> {
        let mut url = Url::parse(base)
            .map_err(|e| WorkspaceError::Config(format!("invalid API base URL {base}: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| WorkspaceError::Config(format!("API base URL {base} cannot carry a path")))?
            .pop_if_empty()
            .extend(segments);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Sends `request` and decodes a successful JSON response.
    ///
    /// A 401 becomes [`WorkspaceError::Authorization`]; every other
    /// non-success status becomes [`WorkspaceError::RemoteCall`] carrying the
    /// status and the provider's error message.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, WorkspaceError> {
        let response = request
            .send()
            .await
            .map_err(|e| WorkspaceError::RemoteCall(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkspaceError::RemoteCall(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let message = provider_message(&body);
            return Err(if status == StatusCode::UNAUTHORIZED {
                WorkspaceError::Authorization(format!(
                    "Google rejected the access token ({status}): {message}"
                ))
            } else {
                WorkspaceError::RemoteCall(format!("{status}: {message}"))
            });
        }

        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body)
            .map_err(|e| WorkspaceError::RemoteCall(format!("unexpected response shape: {e}")))
    }
}

/// Bearer token of `credential`, or an authorization error.
fn bearer(credential: &Credential) -> Result<&str, WorkspaceError> {
    credential.access_token().ok_or_else(|| {
        WorkspaceError::Authorization("not authenticated: no Google access token available".to_string())
    })
}

/// Wraps the failure of the second call of a two-call tool.
fn partial_failure(done: &str, err: WorkspaceError) -> WorkspaceError {
    match err {
        WorkspaceError::Authorization(msg) => {
            WorkspaceError::Authorization(format!("{done}, but the follow-up call failed: {msg}"))
        }
        other => WorkspaceError::RemoteCall(format!("{done}, but the follow-up call failed: {other}")),
    }
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: GoogleError,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GoogleError {
    Detailed { message: String },
    Code(String),
}

fn provider_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorBody>(body) {
        Ok(GoogleErrorBody {
            error: GoogleError::Detailed { message },
        }) => message,
        Ok(GoogleErrorBody {
            error: GoogleError::Code(code),
        }) => code,
        Err(_) if body.trim().is_empty() => "no error details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl CapabilityHandler for GoogleWorkspace {
    async fn invoke(&self, tool: &str, args: &ToolArgs, credential: &Credential) -> HandlerResult {
        let token = bearer(credential)?;
        match tool {
            catalog::GET_ACCOUNT_INFO => self.get_account_info(token).await,
            catalog::SEND_EMAIL => self.send_email(token, args).await,
            catalog::LIST_CALENDAR_EVENTS => self.list_calendar_events(token, args).await,
            catalog::CREATE_CALENDAR_EVENT => self.create_calendar_event(token, args).await,
            catalog::LIST_DRIVE_FOLDERS => self.list_drive_folders(token, args).await,
            catalog::SEARCH_DRIVE => self.search_drive(token, args).await,
            catalog::CREATE_DOCUMENT => self.create_document(token, args).await,
            catalog::GET_DOCUMENT => self.get_document(token, args).await,
            catalog::APPEND_TO_DOCUMENT => self.append_to_document(token, args).await,
            catalog::CREATE_SPREADSHEET => self.create_spreadsheet(token, args).await,
            catalog::READ_SPREADSHEET => self.read_spreadsheet(token, args).await,
            catalog::UPDATE_SPREADSHEET => self.update_spreadsheet(token, args).await,
            catalog::APPEND_TO_SPREADSHEET => self.append_to_spreadsheet(token, args).await,
            catalog::CREATE_PRESENTATION => self.create_presentation(token, args).await,
            catalog::GET_PRESENTATION => self.get_presentation(token, args).await,
            catalog::ADD_SLIDE => self.add_slide(token, args).await,
            other => Err(WorkspaceError::ToolNotFound(other.to_string())),
        }
    }
}
