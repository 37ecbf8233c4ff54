//! MCP protocol types and JSON-RPC 2.0 primitives
//!
//! The server side of the Model Context Protocol needs only the lifecycle,
//! ping, and tool methods. Struct fields are `camelCase` on the wire and
//! `Option<>` fields are omitted from JSON when `None`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::tools::ToolDefinition;

// ---------------------------------------------------------------------------
// Protocol version constants
// ---------------------------------------------------------------------------

/// The most recent supported MCP protocol revision.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Earlier protocol revisions still accepted during negotiation.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] =
    &[LATEST_PROTOCOL_VERSION, "2025-03-26", "2024-11-05"];

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "gg-workspace-mcp";

// ---------------------------------------------------------------------------
// JSON-RPC method constants
// ---------------------------------------------------------------------------

/// Lifecycle: client sends `initialize` to open a session.
pub const METHOD_INITIALIZE: &str = "initialize";
/// Lifecycle: client sends `notifications/initialized` after the server ACKs.
pub const METHOD_INITIALIZED: &str = "notifications/initialized";
/// Keepalive ping.
pub const METHOD_PING: &str = "ping";
/// Request the tool catalog.
pub const METHOD_TOOLS_LIST: &str = "tools/list";
/// Invoke a named tool.
pub const METHOD_TOOLS_CALL: &str = "tools/call";

// ---------------------------------------------------------------------------
// JSON-RPC error codes
// ---------------------------------------------------------------------------

/// Invalid JSON was received.
pub const PARSE_ERROR: i64 = -32700;
/// The JSON sent is not a valid request object.
pub const INVALID_REQUEST: i64 = -32600;
/// The method does not exist.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// Invalid method parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// Internal JSON-RPC error.
pub const INTERNAL_ERROR: i64 = -32603;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 wire types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request or notification as read from the client.
///
/// `id` is `None` for notifications, which never receive a response.
///
/// # Examples
///
/// ```
/// use gg_workspace_mcp::mcp::types::JsonRpcRequest;
///
/// let req: JsonRpcRequest =
///     serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).unwrap();
/// assert_eq!(req.method, "ping");
/// assert!(!req.is_notification());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version identifier; always `"2.0"`.
    pub jsonrpc: String,
    /// Request correlation identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// The method name to invoke.
    pub method: String,
    /// Optional method parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns `true` when no response is expected.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A JSON-RPC 2.0 response object.
///
/// Exactly one of `result` or `error` is present. `id` serializes as `null`
/// when the request could not be parsed far enough to recover it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version identifier; always `"2.0"`.
    pub jsonrpc: String,
    /// Mirrors the `id` from the corresponding request.
    pub id: Value,
    /// Successful result value; mutually exclusive with `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error object; mutually exclusive with `result`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Successful response carrying `result`.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Error response with `code` and `message`.
    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// A JSON-RPC 2.0 error object.
///
/// # Examples
///
/// ```
/// use gg_workspace_mcp::mcp::types::JsonRpcError;
///
/// let e = JsonRpcError { code: -32601, message: "Method not found".to_string(), data: None };
/// assert_eq!(e.to_string(), "JSON-RPC error -32601: Method not found");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable error description.
    pub message: String,
    /// Optional additional error context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

// ---------------------------------------------------------------------------
// Lifecycle types
// ---------------------------------------------------------------------------

/// Identifies a client or server implementation by name and version.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Implementation {
    /// Short name of the implementation.
    pub name: String,
    /// Semantic version string.
    pub version: String,
}

impl Implementation {
    /// Identity of this server.
    pub fn server() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Capabilities advertised by this server. Only tools are offered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    /// Present when the server exposes `tools/list` and `tools/call`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

/// Tool capability descriptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// The catalog is fixed, so this is always `false`.
    pub list_changed: bool,
}

/// Parameters sent by the client in the `initialize` request.
///
/// Only the requested protocol version matters to this server; client
/// capabilities are accepted and ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// The protocol version the client wishes to use.
    #[serde(default)]
    pub protocol_version: Option<String>,
    /// Information identifying the client implementation.
    #[serde(default)]
    pub client_info: Option<Implementation>,
}

/// Response returned by the server to an `initialize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResponse {
    /// The protocol version selected for this session.
    pub protocol_version: String,
    /// Capabilities advertised by this server.
    pub capabilities: ServerCapabilities,
    /// Information identifying this server implementation.
    pub server_info: Implementation,
}

impl InitializeResponse {
    /// Builds the response for a client that asked for `requested`.
    ///
    /// A supported version is echoed back; anything else gets the latest.
    pub fn negotiate(requested: Option<&str>) -> Self {
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(LATEST_PROTOCOL_VERSION)
            .to_string();
        Self {
            protocol_version,
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
            server_info: Implementation::server(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tool types
// ---------------------------------------------------------------------------

/// A tool as published by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    /// Unique name of the tool.
    pub name: String,
    /// Human-readable description of the tool's purpose.
    pub description: String,
    /// JSON Schema describing the tool's input parameters.
    pub input_schema: Value,
}

impl From<&ToolDefinition> for McpTool {
    fn from(definition: &ToolDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            description: definition.description.clone(),
            input_schema: definition.schema.to_json_schema(),
        }
    }
}

/// Response to a `tools/list` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListToolsResponse {
    /// Every registered tool, in catalog order.
    pub tools: Vec<McpTool>,
}

/// Parameters for a `tools/call` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Name of the tool to invoke.
    pub name: String,
    /// Arguments to pass to the tool.
    #[serde(default)]
    pub arguments: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::schema::{ArgumentSchema, FieldKind, FieldSpec};
    use serde_json::json;

    #[test]
    fn test_request_without_id_is_notification() {
        let req: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
                .unwrap();
        assert!(req.is_notification());
        assert!(req.params.is_none());
    }

    #[test]
    fn test_success_response_omits_error() {
        let json = serde_json::to_value(JsonRpcResponse::success(json!(7), json!({}))).unwrap();
        assert_eq!(json, json!({"jsonrpc": "2.0", "id": 7, "result": {}}));
    }

    #[test]
    fn test_failure_response_keeps_null_id() {
        let json =
            serde_json::to_value(JsonRpcResponse::failure(Value::Null, PARSE_ERROR, "Parse error"))
                .unwrap();
        assert_eq!(json["id"], Value::Null);
        assert_eq!(json["error"]["code"], -32700);
        assert!(json.get("result").is_none());
    }

    #[test]
    fn test_negotiate_echoes_supported_version() {
        let response = InitializeResponse::negotiate(Some("2025-03-26"));
        assert_eq!(response.protocol_version, "2025-03-26");
        assert_eq!(response.server_info.name, "gg-workspace-mcp");
    }

    #[test]
    fn test_negotiate_falls_back_to_latest() {
        assert_eq!(
            InitializeResponse::negotiate(Some("1999-01-01")).protocol_version,
            LATEST_PROTOCOL_VERSION
        );
        assert_eq!(
            InitializeResponse::negotiate(None).protocol_version,
            LATEST_PROTOCOL_VERSION
        );
    }

    #[test]
    fn test_initialize_response_wire_shape() {
        let json = serde_json::to_value(InitializeResponse::negotiate(None)).unwrap();
        assert_eq!(json["capabilities"], json!({"tools": {"listChanged": false}}));
        assert!(json["serverInfo"]["version"].is_string());
    }

    #[test]
    fn test_mcp_tool_from_definition() {
        let definition = ToolDefinition::new(
            "get_document",
            "Read a document",
            ArgumentSchema::new(vec![FieldSpec::required(
                "document_id",
                FieldKind::String,
                "Document id",
            )]),
        );
        let json = serde_json::to_value(McpTool::from(&definition)).unwrap();
        assert_eq!(json["name"], "get_document");
        assert_eq!(json["inputSchema"]["type"], "object");
        assert_eq!(json["inputSchema"]["required"], json!(["document_id"]));
    }
}
