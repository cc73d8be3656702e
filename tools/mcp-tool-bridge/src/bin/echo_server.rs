//! Minimal stdio MCP server used to smoke-test the bridge end to end.
//!
//! `echo` returns its `text` argument and `pid` the server's process id.
//! Every tool description carries the number of `tools/list` requests served
//! so far, which makes cached listings observable.

use anyhow::Result;
use clap::Parser;
use rmcp::{
    ErrorData, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, JsonObject, ListToolsResult,
        PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    transport::stdio,
};
use serde_json::{Value, json};
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mcp-echo-server")]
struct Args {
    /// Delay every `tools/list` response by this many milliseconds.
    #[arg(long, default_value_t = 0)]
    list_delay_ms: u64,
}

#[derive(Clone)]
struct EchoServer {
    listings: Arc<AtomicUsize>,
    list_delay: Duration,
}

fn object_schema(value: Value) -> Arc<JsonObject> {
    match value {
        Value::Object(map) => Arc::new(map),
        _ => Arc::new(JsonObject::new()),
    }
}

impl EchoServer {
    fn tools(listing: usize) -> Vec<Tool> {
        vec![
            Tool::new(
                "echo",
                format!("Echo back the supplied text (listing {listing})"),
                object_schema(json!({
                    "type": "object",
                    "properties": {"text": {"type": "string"}}
                })),
            ),
            Tool::new(
                "pid",
                format!("Report the server process id (listing {listing})"),
                object_schema(json!({"type": "object"})),
            ),
        ]
    }

    fn call(request: CallToolRequestParam) -> Result<CallToolResult, ErrorData> {
        match request.name.as_ref() {
            "echo" => {
                let text = request
                    .arguments
                    .as_ref()
                    .and_then(|args| args.get("text"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            "pid" => Ok(CallToolResult::success(vec![Content::text(
                std::process::id().to_string(),
            )])),
            other => Err(ErrorData::invalid_params(
                format!("unknown tool: {other}"),
                None,
            )),
        }
    }
}

impl ServerHandler for EchoServer {
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
        let listing = self.listings.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.list_delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            tracing::info!(listing, "served tools/list");
            Ok(ListToolsResult {
                tools: Self::tools(listing),
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

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .try_init();

    let args = Args::parse();
    let server = EchoServer {
        listings: Arc::new(AtomicUsize::new(0)),
        list_delay: Duration::from_millis(args.list_delay_ms),
    };
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
