use reqwest::Method;
use serde::Deserialize;

use super::GoogleWorkspace;
use crate::error::HandlerResult;
use crate::tools::schema::ToolArgs;

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

impl GoogleWorkspace {
    pub(super) async fn list_drive_folders(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let parent = args.str("parent_id")?;
        let query = format!(
            "'{}' in parents and mimeType='{}' and trashed=false",
            escape_query_literal(parent),
            FOLDER_MIME_TYPE
        );
        let request = self
            .request(Method::GET, &self.api.drive_base, &["files"], token)?
            .query(&[
                ("q", query.as_str()),
                ("fields", "files(id, name, webViewLink)"),
                ("pageSize", "100"),
            ]);
        let list: FileList = self.call(request).await?;

        if list.files.is_empty() {
            return Ok("No folders found.".to_string());
        }
        Ok(list
            .files
            .iter()
            .map(|f| {
                format!(
                    "Folder: {}\n   ID: {}\n   Link: {}\n",
                    f.name,
                    f.id,
                    f.web_view_link.as_deref().unwrap_or("N/A")
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub(super) async fn search_drive(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let request = self
            .request(Method::GET, &self.api.drive_base, &["files"], token)?
            .query(&[
                ("q", args.str("query")?),
                ("fields", "files(id, name, mimeType)"),
            ]);
        let list: FileList = self.call(request).await?;

        if list.files.is_empty() {
            return Ok("No files found.".to_string());
        }
        Ok(list
            .files
            .iter()
            .map(|f| format!("- {} ({})", f.name, f.id))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Escapes a value for use inside a single-quoted Drive query literal.
fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
