use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{partial_failure, GoogleWorkspace};
use crate::error::{HandlerResult, WorkspaceError};
use crate::tools::schema::ToolArgs;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

#[derive(Deserialize, Default)]
struct Document {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<Body>,
}

#[derive(Deserialize, Default)]
struct Body {
    #[serde(default)]
    content: Vec<StructuralElement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuralElement {
    #[serde(default)]
    end_index: Option<i64>,
    #[serde(default)]
    paragraph: Option<Paragraph>,
}

#[derive(Deserialize)]
struct Paragraph {
    #[serde(default)]
    elements: Vec<ParagraphElement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParagraphElement {
    #[serde(default)]
    text_run: Option<TextRun>,
}

#[derive(Deserialize)]
struct TextRun {
    #[serde(default)]
    content: String,
}

impl Document {
    fn text(&self) -> String {
        self.body
            .iter()
            .flat_map(|b| &b.content)
            .filter_map(|e| e.paragraph.as_ref())
            .flat_map(|p| &p.elements)
            .filter_map(|e| e.text_run.as_ref())
            .map(|r| r.content.as_str())
            .collect()
    }

    /// Index just before the trailing newline of the body, where appended
    /// text must be inserted.
    fn append_index(&self) -> i64 {
        let end = self
            .body
            .as_ref()
            .and_then(|b| b.content.last())
            .and_then(|e| e.end_index)
            .unwrap_or(1);
        (end - 1).max(1)
    }
}

fn document_url(id: &str) -> String {
    format!("https://docs.google.com/document/d/{id}/edit")
}

fn insert_text(index: i64, text: &str) -> Value {
    json!({
        "requests": [
            { "insertText": { "location": { "index": index }, "text": text } }
        ]
    })
}

impl GoogleWorkspace {
    pub(super) async fn create_document(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let request = self
            .request(Method::POST, &self.api.docs_base, &["documents"], token)?
            .json(&json!({ "title": args.str("title")? }));
        let created: CreatedDocument = self.call(request).await?;
        let id = created.document_id;

        let body_text = args.str("body_text")?;
        if !body_text.is_empty() {
            let target = format!("{id}:batchUpdate");
            let request = self
                .request(
                    Method::POST,
                    &self.api.docs_base,
                    &["documents", target.as_str()],
                    token,
                )?
                .json(&insert_text(1, body_text));
            self.call::<Value>(request)
                .await
                .map_err(|e| partial_failure(&format!("Document {id} was created"), e))?;
        }

        Ok(format!("Document created: {}", document_url(&id)))
    }

    pub(super) async fn get_document(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let document = self.fetch_document(token, args.str("document_id")?).await?;
        Ok(format!("Title: {}\n\n{}", document.title, document.text()))
    }

    pub(super) async fn append_to_document(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let id = args.str("document_id")?;
        let document = self.fetch_document(token, id).await?;

        let target = format!("{id}:batchUpdate");
        let request = self
            .request(
                Method::POST,
                &self.api.docs_base,
                &["documents", target.as_str()],
                token,
            )?
            .json(&insert_text(document.append_index(), args.str("text")?));
        self.call::<Value>(request).await?;

        Ok(format!("Text appended to document {id}"))
    }

    async fn fetch_document(&self, token: &str, id: &str) -> Result<Document, WorkspaceError> {
        let request = self.request(Method::GET, &self.api.docs_base, &["documents", id], token)?;
        self.call(request).await
    }
}
