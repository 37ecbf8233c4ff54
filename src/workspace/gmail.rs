use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use super::GoogleWorkspace;
use crate::error::HandlerResult;
use crate::tools::schema::ToolArgs;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Profile {
    email_address: String,
}

#[derive(Deserialize)]
struct SentMessage {
    #[serde(default)]
    id: String,
}

impl GoogleWorkspace {
    pub(super) async fn get_account_info(&self, token: &str) -> HandlerResult {
        let request = self.request(
            Method::GET,
            &self.api.gmail_base,
            &["users", "me", "profile"],
            token,
        )?;
        let profile: Profile = self.call(request).await?;
        Ok(format!("Authenticated as: {}", profile.email_address))
    }

    pub(super) async fn send_email(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let raw = encode_message(args.str("to")?, args.str("subject")?, args.str("body")?);
        let request = self
            .request(
                Method::POST,
                &self.api.gmail_base,
                &["users", "me", "messages", "send"],
                token,
            )?
            .json(&json!({ "raw": raw }));
        let sent: SentMessage = self.call(request).await?;
        Ok(format!("Email sent! ID: {}", sent.id))
    }
}

/// Builds a plain-text RFC 822 message and encodes it as base64url without
/// padding, the form the Gmail `send` endpoint expects in `raw`.
fn encode_message(to: &str, subject: &str, body: &str) -> String {
    let message = [
        format!("To: {}", header_value(to)),
        format!("Subject: {}", encode_subject(&header_value(subject))),
        "Content-Type: text/plain; charset=\"utf-8\"".to_string(),
        String::new(),
        body.to_string(),
    ]
    .join("\n");
    URL_SAFE_NO_PAD.encode(message.as_bytes())
}

// Line breaks in a header value would start a new header.
fn header_value(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

fn encode_subject(subject: &str) -> String {
    if subject.is_ascii() {
        subject.to_string()
    } else {
        format!("=?UTF-8?B?{}?=", STANDARD.encode(subject.as_bytes()))
    }
}
