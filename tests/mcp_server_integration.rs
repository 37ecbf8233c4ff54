//! MCP server over an in-memory transport
//!
//! Runs a full session (initialize, tools/list, tools/call) against the real
//! Google Workspace catalog, with the remote APIs mocked.

mod common;

use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{fresh_token, mock_config, workspace_dispatcher, write_token};
use gg_workspace_mcp::mcp::McpServer;

async fn session(dir: &TempDir, server: &MockServer, requests: &[Value]) -> Vec<Value> {
    let (dispatcher, _) = workspace_dispatcher(&mock_config(dir, server));
    let input: String = requests
        .iter()
        .map(|r| format!("{r}\n"))
        .collect();

    let (writer, mut output) = tokio::io::duplex(256 * 1024);
    McpServer::new(Arc::new(dispatcher))
        .serve(input.as_bytes(), writer)
        .await
        .unwrap();

    let mut text = String::new();
    output.read_to_string(&mut text).await.unwrap();
    text.lines().map(|l| serde_json::from_str(l).unwrap()).collect()
}

fn response_for(responses: &[Value], id: i64) -> &Value {
    responses
        .iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("no response with id {id}"))
}

#[tokio::test]
async fn test_full_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/spreadsheets/ss-1/values/Sheet1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["a", "b"], ["1", "2"]]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "name contains 'plan'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"id": "f-1", "name": "plan.txt"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    write_token(&dir, &fresh_token("tok"));

    let responses = session(
        &dir,
        &server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2025-06-18",
                "capabilities": {},
                "clientInfo": {"name": "it", "version": "0"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "read_spreadsheet",
                "arguments": {"spreadsheet_id": "ss-1"}
            }}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call", "params": {
                "name": "search_drive",
                "arguments": {"query": "name contains 'plan'"}
            }}),
        ],
    )
    .await;

    assert_eq!(responses.len(), 4);
    assert_eq!(
        response_for(&responses, 1)["result"]["protocolVersion"],
        "2025-06-18"
    );

    let tools = response_for(&responses, 2)["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 16);
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names[0], "get_account_info");
    assert!(names.contains(&"add_slide"));
    let read = tools.iter().find(|t| t["name"] == "read_spreadsheet").unwrap();
    assert_eq!(read["inputSchema"]["properties"]["range"]["default"], "Sheet1");
    assert_eq!(read["inputSchema"]["required"], json!(["spreadsheet_id"]));

    let sheet = &response_for(&responses, 3)["result"];
    assert_eq!(sheet["isError"], false);
    assert_eq!(sheet["content"][0]["type"], "text");
    assert_eq!(sheet["content"][0]["text"], "a\tb\n1\t2");

    let drive = &response_for(&responses, 4)["result"];
    assert_eq!(drive["content"][0]["text"], "- plan.txt (f-1)");
}

#[tokio::test]
async fn test_tool_failure_is_a_result_with_is_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let responses = session(
        &dir,
        &server,
        &[json!({"jsonrpc": "2.0", "id": 7, "method": "tools/call", "params": {
            "name": "get_account_info",
            "arguments": {}
        }})],
    )
    .await;

    let response = response_for(&responses, 7);
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], true);
    let text = response["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: "));
    assert!(text.contains("http://localhost:3838"));
}
