use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};

use super::GoogleWorkspace;
use crate::error::HandlerResult;
use crate::tools::schema::ToolArgs;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedSpreadsheet {
    spreadsheet_id: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateResponse {
    #[serde(default)]
    updated_cells: Option<u64>,
}

#[derive(Deserialize)]
struct AppendResponse {
    #[serde(default)]
    updates: Option<AppendUpdates>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    #[serde(default)]
    updated_rows: Option<u64>,
}

/// Renders a cell the way it reads in the sheet (strings without quotes).
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl GoogleWorkspace {
    pub(super) async fn create_spreadsheet(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let body = json!({
            "properties": { "title": args.str("title")? },
            "sheets": [ { "properties": { "title": args.str("sheet_name")? } } ],
        });
        let request = self
            .request(Method::POST, &self.api.sheets_base, &["spreadsheets"], token)?
            .json(&body);
        let created: CreatedSpreadsheet = self.call(request).await?;
        Ok(format!(
            "Spreadsheet created: https://docs.google.com/spreadsheets/d/{}/edit",
            created.spreadsheet_id
        ))
    }

    pub(super) async fn read_spreadsheet(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let request = self.request(
            Method::GET,
            &self.api.sheets_base,
            &["spreadsheets", args.str("spreadsheet_id")?, "values", args.str("range")?],
            token,
        )?;
        let range: ValueRange = self.call(request).await?;

        if range.values.is_empty() {
            return Ok("No data found.".to_string());
        }
        Ok(range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>().join("\t"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub(super) async fn update_spreadsheet(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let id = args.str("spreadsheet_id")?;
        let range = args.str("range")?;
        let request = self
            .request(
                Method::PUT,
                &self.api.sheets_base,
                &["spreadsheets", id, "values", range],
                token,
            )?
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&json!({ "values": args.grid("values")? }));
        let updated: UpdateResponse = self.call(request).await?;

        Ok(match updated.updated_cells {
            Some(cells) => format!("Updated {range} in spreadsheet {id} ({cells} cells)"),
            None => format!("Updated {range} in spreadsheet {id}"),
        })
    }

    pub(super) async fn append_to_spreadsheet(&self, token: &str, args: &ToolArgs) -> HandlerResult {
        let id = args.str("spreadsheet_id")?;
        let range = args.str("range")?;
        let target = format!("{range}:append");
        let request = self
            .request(
                Method::POST,
                &self.api.sheets_base,
                &["spreadsheets", id, "values", target.as_str()],
                token,
            )?
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": args.grid("values")? }));
        let appended: AppendResponse = self.call(request).await?;

        let rows = appended
            .updates
            .and_then(|u| u.updated_rows)
            .unwrap_or(0);
        Ok(format!("Appended {rows} rows to {range}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog;
    use crate::tools::dispatcher::CapabilityHandler;
    use crate::workspace::tests::{args_for, credential, handler_for};
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&json!("a")), "a");
        assert_eq!(cell_text(&json!(3)), "3");
        assert_eq!(cell_text(&json!(true)), "true");
        assert_eq!(cell_text(&Value::Null), "");
    }

    #[tokio::test]
    async fn test_create_spreadsheet_names_first_sheet() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets"))
            .and(body_partial_json(json!({
                "properties": {"title": "Budget"},
                "sheets": [{"properties": {"title": "Sheet1"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"spreadsheetId": "ss-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let text = handler_for(&server)
            .invoke(
                catalog::CREATE_SPREADSHEET,
                &args_for(catalog::CREATE_SPREADSHEET, json!({"title": "Budget"})),
                &credential(Some("tok")),
            )
            .await
            .unwrap();
        assert_eq!(
            text,
            "Spreadsheet created: https://docs.google.com/spreadsheets/d/ss-1/edit"
        );
    }

    #[tokio::test]
    async fn test_read_spreadsheet_tab_joins_rows() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/ss-1/values/Sheet1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Sheet1!A1:B2",
                "values": [["Name", "Qty"], ["Apples", 3]]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = handler_for(&server)
            .invoke(
                catalog::READ_SPREADSHEET,
                &args_for(catalog::READ_SPREADSHEET, json!({"spreadsheet_id": "ss-1"})),
                &credential(Some("tok")),
            )
            .await
            .unwrap();
        assert_eq!(text, "Name\tQty\nApples\t3");
    }

    #[tokio::test]
    async fn test_read_empty_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spreadsheets/ss-1/values/Sheet1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"range": "Sheet1"})))
            .mount(&server)
            .await;

        let text = handler_for(&server)
            .invoke(
                catalog::READ_SPREADSHEET,
                &args_for(catalog::READ_SPREADSHEET, json!({"spreadsheet_id": "ss-1"})),
                &credential(Some("tok")),
            )
            .await
            .unwrap();
        assert_eq!(text, "No data found.");
    }

    #[tokio::test]
    async fn test_update_spreadsheet_writes_user_entered_values() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/spreadsheets/ss-1/values/A1:B1"))
            .and(query_param("valueInputOption", "USER_ENTERED"))
            .and(body_json(json!({"values": [["x", 1]]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updatedCells": 2})))
            .expect(1)
            .mount(&server)
            .await;

        let args = args_for(
            catalog::UPDATE_SPREADSHEET,
            json!({"spreadsheet_id": "ss-1", "range": "A1:B1", "values": "[[\"x\", 1]]"}),
        );
        let text = handler_for(&server)
            .invoke(catalog::UPDATE_SPREADSHEET, &args, &credential(Some("tok")))
            .await
            .unwrap();
        assert_eq!(text, "Updated A1:B1 in spreadsheet ss-1 (2 cells)");
    }

    #[tokio::test]
    async fn test_append_reports_inserted_rows() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/spreadsheets/ss-1/values/Sheet1:append"))
            .and(query_param("insertDataOption", "INSERT_ROWS"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "updates": {"updatedRows": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let args = args_for(
            catalog::APPEND_TO_SPREADSHEET,
            json!({"spreadsheet_id": "ss-1", "range": "Sheet1", "values": [["a"], ["b"]]}),
        );
        let text = handler_for(&server)
            .invoke(catalog::APPEND_TO_SPREADSHEET, &args, &credential(Some("tok")))
            .await
            .unwrap();
        assert_eq!(text, "Appended 2 rows to Sheet1");
    }
}
