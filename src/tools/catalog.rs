//! The Google Workspace tool catalog

use serde_json::json;

use super::schema::{ArgumentSchema, FieldKind, FieldSpec};
use super::ToolDefinition;

pub const GET_ACCOUNT_INFO: &str = "get_account_info";
pub const SEND_EMAIL: &str = "send_email";
pub const LIST_CALENDAR_EVENTS: &str = "list_calendar_events";
pub const CREATE_CALENDAR_EVENT: &str = "create_calendar_event";
pub const LIST_DRIVE_FOLDERS: &str = "list_drive_folders";
pub const SEARCH_DRIVE: &str = "search_drive";
pub const CREATE_DOCUMENT: &str = "create_document";
pub const GET_DOCUMENT: &str = "get_document";
pub const APPEND_TO_DOCUMENT: &str = "append_to_document";
pub const CREATE_SPREADSHEET: &str = "create_spreadsheet";
pub const READ_SPREADSHEET: &str = "read_spreadsheet";
pub const UPDATE_SPREADSHEET: &str = "update_spreadsheet";
pub const APPEND_TO_SPREADSHEET: &str = "append_to_spreadsheet";
pub const CREATE_PRESENTATION: &str = "create_presentation";
pub const GET_PRESENTATION: &str = "get_presentation";
pub const ADD_SLIDE: &str = "add_slide";

use FieldKind::{Grid, Number, String as Str};

/// Every tool served by this process, in catalog order.
pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        // Gmail
        ToolDefinition::new(
            GET_ACCOUNT_INFO,
            "Get the email address of the currently authenticated Google account.",
            ArgumentSchema::empty(),
        ),
        ToolDefinition::new(
            SEND_EMAIL,
            "Send a simple email via Gmail.",
            ArgumentSchema::new(vec![
                FieldSpec::required("to", Str, "Recipient address"),
                FieldSpec::required("subject", Str, "Subject line"),
                FieldSpec::required("body", Str, "Plain-text body"),
            ]),
        ),
        // Calendar
        ToolDefinition::new(
            LIST_CALENDAR_EVENTS,
            "List upcoming events from the primary Google Calendar.",
            ArgumentSchema::new(vec![
                FieldSpec::optional("max_results", Number, "Maximum number of events", json!(10)),
                FieldSpec::optional(
                    "days_back",
                    Number,
                    "Also include events from this many past days",
                    json!(0),
                ),
            ]),
        ),
        ToolDefinition::new(
            CREATE_CALENDAR_EVENT,
            "Create a calendar event. Times use the format YYYY-MM-DDTHH:MM in the configured time zone.",
            ArgumentSchema::new(vec![
                FieldSpec::required("summary", Str, "Event title"),
                FieldSpec::required("start_time", Str, "Start, YYYY-MM-DDTHH:MM"),
                FieldSpec::required("end_time", Str, "End, YYYY-MM-DDTHH:MM"),
                FieldSpec::optional("description", Str, "Event description", json!("")),
            ]),
        ),
        // Drive
        ToolDefinition::new(
            LIST_DRIVE_FOLDERS,
            "List all folders in Google Drive.",
            ArgumentSchema::new(vec![FieldSpec::optional(
                "parent_id",
                Str,
                "Parent folder ID",
                json!("root"),
            )]),
        ),
        ToolDefinition::new(
            SEARCH_DRIVE,
            "Search for files in Google Drive.",
            ArgumentSchema::new(vec![FieldSpec::required(
                "query",
                Str,
                "Drive search query, e.g. name contains 'report'",
            )]),
        ),
        // Docs
        ToolDefinition::new(
            CREATE_DOCUMENT,
            "Create a new Google Docs document.",
            ArgumentSchema::new(vec![
                FieldSpec::required("title", Str, "Document title"),
                FieldSpec::optional("body_text", Str, "Initial body text", json!("")),
            ]),
        ),
        ToolDefinition::new(
            GET_DOCUMENT,
            "Get the full text content of a Google Docs document.",
            ArgumentSchema::new(vec![FieldSpec::required("document_id", Str, "Document ID")]),
        ),
        ToolDefinition::new(
            APPEND_TO_DOCUMENT,
            "Append text to the end of a Google Docs document.",
            ArgumentSchema::new(vec![
                FieldSpec::required("document_id", Str, "Document ID"),
                FieldSpec::required("text", Str, "Text to append"),
            ]),
        ),
        // Sheets
        ToolDefinition::new(
            CREATE_SPREADSHEET,
            "Create a new Google Sheets spreadsheet.",
            ArgumentSchema::new(vec![
                FieldSpec::required("title", Str, "Spreadsheet title"),
                FieldSpec::optional("sheet_name", Str, "Name of the first sheet", json!("Sheet1")),
            ]),
        ),
        ToolDefinition::new(
            READ_SPREADSHEET,
            "Read data from a Google Sheets spreadsheet.",
            ArgumentSchema::new(vec![
                FieldSpec::required("spreadsheet_id", Str, "Spreadsheet ID"),
                FieldSpec::optional("range", Str, "A1 range to read", json!("Sheet1")),
            ]),
        ),
        ToolDefinition::new(
            UPDATE_SPREADSHEET,
            "Update cells in a spreadsheet. Values format: JSON 2D array.",
            ArgumentSchema::new(vec![
                FieldSpec::required("spreadsheet_id", Str, "Spreadsheet ID"),
                FieldSpec::required("range", Str, "A1 range to overwrite"),
                FieldSpec::required("values", Grid, "JSON array of rows, e.g. [[\"a\", 1]]"),
            ]),
        ),
        ToolDefinition::new(
            APPEND_TO_SPREADSHEET,
            "Append rows to a spreadsheet. Values format: JSON 2D array.",
            ArgumentSchema::new(vec![
                FieldSpec::required("spreadsheet_id", Str, "Spreadsheet ID"),
                FieldSpec::required("range", Str, "A1 range whose table receives the rows"),
                FieldSpec::required("values", Grid, "JSON array of rows, e.g. [[\"a\", 1]]"),
            ]),
        ),
        // Slides
        ToolDefinition::new(
            CREATE_PRESENTATION,
            "Create a new Google Slides presentation.",
            ArgumentSchema::new(vec![FieldSpec::required("title", Str, "Presentation title")]),
        ),
        ToolDefinition::new(
            GET_PRESENTATION,
            "Get metadata and slide content from a Google Slides presentation.",
            ArgumentSchema::new(vec![FieldSpec::required(
                "presentation_id",
                Str,
                "Presentation ID",
            )]),
        ),
        ToolDefinition::new(
            ADD_SLIDE,
            "Add a new slide to a presentation.",
            ArgumentSchema::new(vec![
                FieldSpec::required("presentation_id", Str, "Presentation ID"),
                FieldSpec::optional("layout", Str, "Layout name, e.g. BLANK or TITLE", json!("BLANK")),
            ]),
        ),
    ]
}
