//! Credential lifecycle: client identity, OAuth flow, token persistence, and
//! the shared credential store.

pub mod credentials;
pub mod flow;
pub mod manager;
pub mod token_store;

pub use credentials::ClientCredentials;
pub use flow::{OAuthFlow, SCOPES};
pub use manager::{needs_authorization, Credential, CredentialStore};
pub use token_store::{OAuthToken, TokenSource, TokenStore};
