use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use super::GoogleWorkspace;
use crate::error::{HandlerResult, WorkspaceError};
use crate::tools::schema::ToolArgs;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedPresentation {
    presentation_id: String,
}

#[derive(Deserialize)]
struct Presentation {
    #[serde(default)]
    title: String,
    #[serde(default)]
    slides: Vec<Page>,
    #[serde(default)]
    layouts: Vec<Layout>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Page {
    #[serde(default)]
    page_elements: Vec<PageElement>,
}

#[derive(Deserialize)]
struct PageElement {
    #[serde(default)]
    shape: Option<Shape>,
}

#[derive(Deserialize)]
struct Shape {
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextContent {
    #[serde(default)]
    text_elements: Vec<TextElement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextElement {
    #[serde(default)]
    text_run: Option<TextRun>,
}

#[derive(Deserialize)]
struct TextRun {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Layout {
    object_id: String,
    #[serde(default)]
    layout_properties: Option<LayoutProperties>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutProperties {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<Value>,
}

impl Page {
    fn texts(&self) -> Vec<&str> {
        self.page_elements
            .iter()
            .filter_map(|e| e.shape.as_ref()?.text.as_ref())
            .flat_map(|t| &t.text_elements)
            .filter_map(|e| e.text_run.as_ref())
            .map(|r| r.content.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Presentation {
    /// Object id of the layout whose name or display name matches `wanted`,
    /// ignoring case.
    fn layout_id(&self, wanted: &str) -> Option<&str> {
        self.layouts
            .iter()
            .find(|layout| {
                layout.layout_properties.as_ref().is_some_and(|p| {
                    [p.name.as_deref(), p.display_name.as_deref()]
                        .into_iter()
                        .flatten()
                        .any(|n| n.eq_ignore_ascii_case(wanted))
                })
            })
            .map(|layout| layout.object_id.as_str())
    }

    fn summary(&self) -> String {
        let mut text = format!("Title: {}\nSlides: {}\n", self.title, self.slides.len());
        for (i, slide) in self.slides.iter().enumerate() {
            let texts = slide.texts();
            let body = if texts.is_empty() {
                "(empty)".to_string()
            } else {
                texts.join(" | ")
            };
            text.push_str(&format!("  Slide {}: {}\n", i + 1, body));
        }
        text
    }
}

impl GoogleWorkspace {
    pub(super) async fn create_presentation(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let request = self
            .request(Method::POST, &self.api.slides_base, &["presentations"], token)?
            .json(&json!({ "title": args.str("title")? }));
        let created: CreatedPresentation = self.call(request).await?;
        Ok(format!(
            "Presentation created: https://docs.google.com/presentation/d/{}/edit",
            created.presentation_id
        ))
    }

    pub(super) async fn get_presentation(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let presentation = self
            .fetch_presentation(token, args.str("presentation_id")?)
            .await?;
        Ok(presentation.summary())
    }

    pub(super) async fn add_slide(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let id = args.str("presentation_id")?;
        let layout = args.str("layout")?;
        let presentation = self.fetch_presentation(token, id).await?;

        let create_slide = match presentation.layout_id(layout) {
            Some(layout_id) => json!({ "slideLayoutReference": { "layoutId": layout_id } }),
            None => {
                tracing::debug!("Layout {} not found in {}, using default", layout, id);
                json!({})
            }
        };

        let target = format!("{id}:batchUpdate");
        let request = self
            .request(
                Method::POST,
                &self.api.slides_base,
                &["presentations", target.as_str()],
                token,
            )?
            .json(&json!({ "requests": [ { "createSlide": create_slide } ] }));
        let response: BatchUpdateResponse = self.call(request).await?;

        let slide_id = response
            .replies
            .first()
            .and_then(|r| r.pointer("/createSlide/objectId"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        Ok(format!("Slide added (ID: {slide_id})"))
    }

    async fn fetch_presentation(
        &self,
        token: &str,
        id: &str,
    ) -> Result<Presentation, WorkspaceError> {
        let request = self.request(
            Method::GET,
            &self.api.slides_base,
            &["presentations", id],
            token,
        )?;
        self.call(request).await
    }
}
