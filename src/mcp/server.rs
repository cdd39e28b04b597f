//! MCP Server implementation for the knowledge-base proxy
//!
//! Implements the Model Context Protocol (JSON-RPC 2.0, one message per
//! line) directly without external SDK dependencies.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::Instrument;
use ulid::Ulid;

use super::jsonrpc::{
    JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use super::tools::{call_tool, text_result, Tool, ERROR_PREFIX};
use crate::config::SessionConfig;
use crate::remote::{BackendClient, ChatBackend};

/// Protocol revisions we can speak, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// Outcome of handling one request
pub enum Dispatch {
    /// Answer is ready
    Reply(JsonRpcResponse),
    /// Answer needs a backend round-trip
    Deferred(BoxFuture<'static, JsonRpcResponse>),
}

/// MCP Server handler
pub struct ProxyServer {
    backend: Arc<dyn ChatBackend>,
    /// Whether client has sent `notifications/initialized`
    initialized: bool,
    /// Unique session ID for this MCP connection
    session_id: String,
}

impl ProxyServer {
    /// Create a server and register its tools
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        let session_id = format!("mcp-{}", Ulid::new());
        let tools: Vec<&str> = Tool::ALL.iter().map(|t| t.name()).collect();
        tracing::info!(session = %session_id, ?tools, "registered tools");

        Self {
            backend,
            initialized: false,
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handle a JSON-RPC request
    pub fn handle_request(&mut self, request: JsonRpcRequest) -> Option<Dispatch> {
        // Notifications (no id) don't get responses
        if request.is_notification() {
            match request.method.as_str() {
                "notifications/initialized" => {
                    self.initialized = true;
                    tracing::info!("client initialized");
                }
                "notifications/cancelled" => {
                    tracing::debug!(params = %request.params, "request cancelled by client");
                }
                other => {
                    tracing::debug!(method = other, "unknown notification");
                }
            }
            return None;
        }

        let id = request.id.unwrap_or(Value::Null);

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(&request.params),
            "tools/list" => self.handle_list_tools(),
            "tools/call" => return Some(self.handle_call_tool(id, request.params)),
            "ping" => Ok(json!({})),
            _ => Err((
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            )),
        };

        Some(Dispatch::Reply(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err((code, msg)) => JsonRpcResponse::error(id, code, msg),
        }))
    }

    fn handle_initialize(&self, params: &Value) -> Result<Value, (i64, String)> {
        let requested = params["protocolVersion"].as_str();
        let version = requested
            .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
            .copied()
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        tracing::info!(
            client = params["clientInfo"]["name"].as_str().unwrap_or("unknown"),
            requested = requested.unwrap_or("none"),
            negotiated = version,
            "initialize"
        );

        Ok(json!({
            "protocolVersion": version,
            "capabilities": {
                "tools": {
                    "listChanged": false
                }
            },
            "serverInfo": {
                "name": "kbridge",
                "version": env!("CARGO_PKG_VERSION")
            },
            "instructions": "kbridge answers questions from a remote knowledge base. Use search_knowledge_base for questions about documented internal knowledge, ask_question for general questions. Every call starts a fresh conversation."
        }))
    }

    fn handle_list_tools(&self) -> Result<Value, (i64, String)> {
        let tools: Vec<Value> = Tool::ALL.iter().map(|t| t.definition()).collect();
        Ok(json!({ "tools": tools }))
    }

    fn handle_call_tool(&self, id: Value, params: Value) -> Dispatch {
        let Some(name) = params["name"].as_str() else {
            return Dispatch::Reply(JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                "Missing tool name".to_string(),
            ));
        };

        let Some(tool) = Tool::from_name(name) else {
            tracing::warn!(tool = name, "unknown tool");
            return Dispatch::Reply(JsonRpcResponse::success(
                id,
                text_result(format!("{}Unknown tool: {}", ERROR_PREFIX, name)),
            ));
        };

        let backend = Arc::clone(&self.backend);
        let arguments = params["arguments"].clone();
        let span = tracing::info_span!("tool_call", tool = tool.name(), call = %Ulid::new());

        Dispatch::Deferred(Box::pin(
            async move {
                let text = call_tool(backend.as_ref(), tool, &arguments).await;
                JsonRpcResponse::success(id, text_result(text))
            }
            .instrument(span),
        ))
    }
}

/// Serve MCP over a newline-delimited duplex channel until the reader hits EOF.
///
/// Tool calls run as independent tasks; a single writer task owns the output.
pub async fn serve<R, W>(mut server: ProxyServer, reader: R, writer: W) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let span = tracing::info_span!("mcp", session = %server.session_id());

    async move {
        let (tx, rx) = mpsc::unbounded_channel::<JsonRpcResponse>();
        let mut writer_task = tokio::spawn(write_responses(writer, rx));

        let mut lines = BufReader::new(reader).lines();
        let mut calls = JoinSet::new();

        tracing::info!("serving");

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("Failed to read from MCP transport")? else {
                        break;
                    };
                    if line.trim().is_empty() {
                        continue;
                    }

                    tracing::debug!(received = preview(&line));

                    // Writer is gone, nothing we start could be delivered
                    if tx.is_closed() {
                        break;
                    }

                    let request: JsonRpcRequest = match serde_json::from_str(&line) {
                        Ok(req) => req,
                        Err(e) => {
                            tracing::warn!(error = %e, "unparseable message");
                            let response = JsonRpcResponse::error(
                                Value::Null,
                                PARSE_ERROR,
                                format!("Parse error: {}", e),
                            );
                            if tx.send(response).is_err() {
                                break;
                            }
                            continue;
                        }
                    };

                    match server.handle_request(request) {
                        Some(Dispatch::Reply(response)) => {
                            if tx.send(response).is_err() {
                                break;
                            }
                        }
                        Some(Dispatch::Deferred(call)) => {
                            let tx = tx.clone();
                            calls.spawn(async move {
                                let _ = tx.send(call.await);
                            });
                        }
                        None => {}
                    }
                }
                written = &mut writer_task => {
                    calls.shutdown().await;
                    written.context("MCP writer task panicked")??;
                    anyhow::bail!("MCP transport closed for writing");
                }
                Some(joined) = calls.join_next(), if !calls.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!(error = %e, "tool call task failed");
                    }
                }
            }
        }

        if !calls.is_empty() {
            tracing::info!(in_flight = calls.len(), "transport closed, abandoning calls");
        }
        calls.shutdown().await;
        drop(tx);

        writer_task.await.context("MCP writer task panicked")??;
        tracing::info!("transport closed, stopping");
        Ok::<(), anyhow::Error>(())
    }
    .instrument(span)
    .await
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<JsonRpcResponse>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let json = serde_json::to_string(&response)?;
        tracing::debug!(sending = preview(&json));
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// First 200 characters, for logs
fn preview(s: &str) -> &str {
    match s.char_indices().nth(200) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Run the MCP proxy with STDIO transport
pub async fn run_stdio(config: Arc<SessionConfig>) -> Result<()> {
    tracing::info!(
        api_url = %config.api_url,
        client = %config.client,
        "kbridge MCP proxy starting"
    );

    let backend = BackendClient::from_config(config)?;
    let server = ProxyServer::new(Arc::new(backend));

    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}
