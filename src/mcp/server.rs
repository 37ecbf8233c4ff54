//! Newline-delimited JSON-RPC server loop
//!
//! Reads one JSON-RPC message per line, answers lifecycle and catalog
//! requests inline, and runs each `tools/call` in its own task so slow tool
//! calls never block the reader. Every response goes through a channel to a
//! single writer task, so lines are never interleaved.
//!
//! Each tool-call task holds a sender clone, so the writer drains only once
//! input has closed and the last call has answered. A call that panics is
//! still answered, with an internal error for its request id.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::types::{
    CallToolParams, InitializeParams, InitializeResponse, JsonRpcRequest, JsonRpcResponse,
    ListToolsResponse, McpTool, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_INITIALIZE, METHOD_INITIALIZED, METHOD_NOT_FOUND, METHOD_PING, METHOD_TOOLS_CALL,
    METHOD_TOOLS_LIST, PARSE_ERROR,
};
use crate::error::Result;
use crate::tools::dispatcher::{Dispatcher, ToolInvocation};

/// MCP server exposing the dispatcher's tool catalog.
pub struct McpServer {
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    /// Creates a server over `dispatcher`.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Serves the process's stdin and stdout until stdin closes.
    pub async fn serve_stdio(&self) -> Result<()> {
        tracing::info!("MCP server listening on stdio");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serves requests read from `reader`, writing responses to `writer`.
    ///
    /// Returns once the reader reaches end of input and every in-flight tool
    /// call has answered.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing a response fails.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.handle_line(line, &tx);
        }

        tracing::debug!("Input closed, waiting for in-flight tool calls");
        drop(tx);

        writer_task.await??;
        tracing::info!("MCP server stopped");
        Ok(())
    }

    fn handle_line(&self, line: &str, tx: &UnboundedSender<JsonRpcResponse>) {
        let raw: Value = match serde_json::from_str(line) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Unparseable message: {}", e);
                send(tx, JsonRpcResponse::failure(Value::Null, PARSE_ERROR, "Parse error"));
                return;
            }
        };

        let id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(request) => request,
            Err(e) => {
                send(
                    tx,
                    JsonRpcResponse::failure(id, INVALID_REQUEST, format!("Invalid request: {e}")),
                );
                return;
            }
        };

        let Some(id) = request.id.clone() else {
            if request.method != METHOD_INITIALIZED {
                tracing::debug!("Ignoring notification {}", request.method);
            }
            return;
        };

        match request.method.as_str() {
            METHOD_INITIALIZE => {
                let params: InitializeParams = request
                    .params
                    .and_then(|p| serde_json::from_value(p).ok())
                    .unwrap_or_default();
                if let Some(client) = &params.client_info {
                    tracing::info!("Client connected: {} {}", client.name, client.version);
                }
                let response = InitializeResponse::negotiate(params.protocol_version.as_deref());
                send(tx, to_response(id, &response));
            }
            METHOD_PING => send(tx, JsonRpcResponse::success(id, json!({}))),
            METHOD_TOOLS_LIST => {
                let response = ListToolsResponse {
                    tools: self
                        .dispatcher
                        .registry()
                        .definitions()
                        .iter()
                        .map(McpTool::from)
                        .collect(),
                };
                send(tx, to_response(id, &response));
            }
            METHOD_TOOLS_CALL => {
                let params: CallToolParams = match request
                    .params
                    .map(serde_json::from_value)
                    .transpose()
                {
                    Ok(Some(params)) => params,
                    _ => {
                        send(
                            tx,
                            JsonRpcResponse::failure(
                                id,
                                INVALID_PARAMS,
                                "tools/call requires a string 'name'",
                            ),
                        );
                        return;
                    }
                };

                let dispatcher = Arc::clone(&self.dispatcher);
                let tx = tx.clone();
                tokio::spawn(async move {
                    let name = params.name.clone();
                    let invocation =
                        ToolInvocation::new(params.name, params.arguments.unwrap_or(Value::Null));
                    let call = tokio::spawn(async move { dispatcher.dispatch(invocation).await });
                    let response = match call.await {
                        Ok(result) => to_response(id, &result),
                        Err(e) => {
                            tracing::error!("Tool call {} did not complete: {}", name, e);
                            JsonRpcResponse::failure(
                                id,
                                INTERNAL_ERROR,
                                format!("Internal error: tool '{name}' did not complete"),
                            )
                        }
                    };
                    send(&tx, response);
                });
            }
            other => send(
                tx,
                JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {other}")),
            ),
        }
    }
}

fn to_response(id: Value, result: &impl serde::Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::failure(id, INTERNAL_ERROR, format!("Internal error: {e}")),
    }
}

fn send(tx: &UnboundedSender<JsonRpcResponse>, response: JsonRpcResponse) {
    if tx.send(response).is_err() {
        tracing::warn!("Response dropped: output is closed");
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: UnboundedReceiver<JsonRpcResponse>,
) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_string(&response)?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
