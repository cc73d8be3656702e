#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use mcp_tool_bridge::{
    adapters::rmcp::RmcpToolServer,
    domain::server::{JsonObject, RemoteTool, ToolServer, ToolServerError},
};
use parking_lot::Mutex;
use rmcp::{
    ErrorData, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use serde_json::{Value, json};
use std::{future::Future, sync::Arc};

/// rmcp server handler served in-process for round trips through the real
/// client session.
#[derive(Clone, Default)]
pub struct FixtureServer;

fn schema(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

impl FixtureServer {
    fn tools() -> Vec<Tool> {
        vec![
            Tool::new(
                "echo",
                "Echo back the supplied text.",
                schema(json!({
                    "type": "object",
                    "properties": {"text": {"type": "string"}}
                })),
            ),
            Tool::new(
                "add",
                "Sum a list of numbers.",
                schema(json!({
                    "type": "object",
                    "properties": {
                        "values": {"type": "array", "items": {"type": "number"}}
                    }
                })),
            ),
            Tool::new(
                "split",
                "Return every word as its own content item.",
                schema(json!({
                    "type": "object",
                    "properties": {"text": {"type": "string"}}
                })),
            ),
            Tool::new(
                "reject",
                "Always reports a tool-level error.",
                schema(json!({"type": "object"})),
            ),
            Tool::new(
                "explode",
                "Always fails at the protocol level.",
                schema(json!({"type": "object"})),
            ),
        ]
    }

    fn call(request: CallToolRequestParam) -> Result<CallToolResult, ErrorData> {
        let arguments = request.arguments.unwrap_or_default();
        let text = arguments
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match request.name.as_ref() {
            "echo" => Ok(CallToolResult::success(vec![Content::text(text)])),
            "add" => {
                let sum: f64 = arguments
                    .get("values")
                    .and_then(Value::as_array)
                    .map(|values| values.iter().filter_map(Value::as_f64).sum())
                    .unwrap_or_default();
                Ok(CallToolResult::success(vec![Content::text(sum.to_string())]))
            }
            "split" => Ok(CallToolResult::success(
                text.split_whitespace().map(Content::text).collect(),
            )),
            "reject" => Ok(CallToolResult::error(vec![Content::text("bad input")])),
            "explode" => Err(ErrorData::internal_error("fixture exploded", None)),
            other => Err(ErrorData::invalid_params(
                format!("unknown tool: {other}"),
                None,
            )),
        }
    }
}

impl ServerHandler for FixtureServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move {
            Ok(ListToolsResult {
                tools: Self::tools(),
                next_cursor: None,
            })
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        let response = Self::call(request);
        async move { response }
    }
}

/// Connects a real rmcp client session to a [`FixtureServer`] running on
/// the same runtime.
pub async fn connect_fixture(name: &str) -> Result<RmcpToolServer> {
    let (client_io, server_io) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        if let Ok(server) = FixtureServer.serve(server_io).await {
            let _ = server.waiting().await;
        }
    });
    let service = ().serve(client_io).await?;
    Ok(RmcpToolServer::new(name, service))
}

/// Plain [`ToolServer`] double: each tool answers with its own name and the
/// arguments it received.
pub struct StaticServer {
    name: String,
    tools: Vec<RemoteTool>,
    pub calls: Mutex<Vec<(String, JsonObject)>>,
}

impl StaticServer {
    pub fn new(name: &str, tools: Vec<RemoteTool>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            tools,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl ToolServer for StaticServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolServerError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<Value, ToolServerError> {
        self.calls.lock().push((name.to_string(), arguments.clone()));
        if name == "echo" {
            let text = arguments.get("text").cloned().unwrap_or(Value::Null);
            return Ok(json!({"content": [text]}));
        }
        Ok(json!({"content": [format!("{name} ran")]}))
    }
}

/// A server whose listing always fails.
pub struct DownServer(pub &'static str);

#[async_trait]
impl ToolServer for DownServer {
    fn name(&self) -> &str {
        self.0
    }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolServerError> {
        Err(ToolServerError::connect(self.0, "connection refused"))
    }

    async fn call_tool(
        &self,
        _name: &str,
        _arguments: JsonObject,
    ) -> Result<Value, ToolServerError> {
        Err(ToolServerError::Closed {
            server: self.0.to_string(),
        })
    }
}
