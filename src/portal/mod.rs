//! Local authorization portal
//!
//! A small HTTP server through which the human operator grants the process
//! access to their Google account. It exposes three routes:
//!
//! - `GET /` -- status page with a link to `/login`
//! - `GET /login` -- redirect to the provider consent screen
//! - `GET /callback?code=...` -- completes the consent by exchanging the code
//!
//! The portal shares the process [`CredentialStore`] with the dispatcher, so
//! a successful callback is visible to the very next tool call.

pub mod pages;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::net::TcpListener;

use crate::auth::manager::CredentialStore;
use crate::config::PortalConfig;
use crate::error::{Result, WorkspaceError};

/// Query parameters delivered by the provider to `/callback`.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code on success.
    #[serde(default)]
    pub code: Option<String>,
    /// Provider error code when the user denied consent.
    #[serde(default)]
    pub error: Option<String>,
}

/// Builds the portal router over a shared credential store.
pub fn router(store: Arc<CredentialStore>) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/login", get(login))
        .route("/callback", get(callback))
        .with_state(store)
}

/// Binds the portal listener described by `config`.
///
/// # Errors
///
/// Returns [`WorkspaceError::Config`] for an unparsable bind address, or an
/// I/O error when the port cannot be bound.
pub async fn bind(config: &PortalConfig) -> Result<TcpListener> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| {
            WorkspaceError::Config(format!(
                "invalid portal address {}:{}: {}",
                config.bind_address, config.port, e
            ))
        })?;
    let listener = TcpListener::bind(addr).await.map_err(WorkspaceError::Io)?;
    Ok(listener)
}

/// Serves the portal on `listener` until the server fails.
///
/// # Errors
///
/// Returns an I/O error if the underlying server stops with one.
pub async fn serve(listener: TcpListener, store: Arc<CredentialStore>) -> Result<()> {
    let public_url = store.portal_url();
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Authorization portal listening on {} ({})", addr, public_url);
    }
    axum::serve(listener, router(store))
        .await
        .map_err(WorkspaceError::Io)?;
    Ok(())
}

async fn status(State(store): State<Arc<CredentialStore>>) -> Html<String> {
    match store.resolve().await {
        Ok(credential) => Html(pages::status_page(credential.is_authenticated(), None)),
        Err(e) => Html(pages::status_page(false, Some(&e.to_string()))),
    }
}

async fn login(State(store): State<Arc<CredentialStore>>) -> Response {
    match store.authorization_url().await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            tracing::error!("Cannot start authorization: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::error_page(&e.to_string())),
            )
                .into_response()
        }
    }
}

async fn callback(
    State(store): State<Arc<CredentialStore>>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!("Provider returned consent error: {}", error);
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::error_page(&format!("Authorization denied: {error}"))),
        )
            .into_response();
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Html(pages::error_page("Missing authorization code")),
        )
            .into_response();
    };

    match store.complete_authorization(&code).await {
        Ok(()) => Html(pages::success_page()).into_response(),
        Err(e) => {
            tracing::error!("Authorization callback failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(pages::error_page(&e.to_string())),
            )
                .into_response()
        }
    }
}
