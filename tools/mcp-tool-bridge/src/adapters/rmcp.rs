use async_trait::async_trait;
use rmcp::{RoleClient, model::CallToolRequestParam, service::RunningService};
use serde_json::Value;

use crate::domain::server::{JsonObject, RemoteTool, ToolServer, ToolServerError};

/// [`ToolServer`] over an initialized rmcp client session.
///
/// Tools and call results cross into the bridge in their MCP wire form, so
/// the core never sees rmcp model types.
pub struct RmcpToolServer {
    name: String,
    service: RunningService<RoleClient, ()>,
}

impl RmcpToolServer {
    pub fn new(name: impl Into<String>, service: RunningService<RoleClient, ()>) -> Self {
        Self {
            name: name.into(),
            service,
        }
    }

    pub fn server_version(&self) -> Option<String> {
        self.service
            .peer_info()
            .map(|info| info.server_info.version.clone())
    }

    pub async fn close(self) -> Result<(), ToolServerError> {
        let Self { name, service } = self;
        service
            .cancel()
            .await
            .map(|reason| tracing::debug!(server = %name, ?reason, "session closed"))
            .map_err(|err| ToolServerError::request(name, err))
    }
}

#[async_trait]
impl ToolServer for RmcpToolServer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolServerError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|err| ToolServerError::request(&self.name, err))?;
        tools
            .iter()
            .map(|tool| {
                serde_json::to_value(tool)
                    .and_then(serde_json::from_value::<RemoteTool>)
                    .map_err(|err| {
                        ToolServerError::request(&self.name, format!("malformed tool listing: {err}"))
                    })
            })
            .collect()
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<Value, ToolServerError> {
        let result = self
            .service
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(|err| ToolServerError::request(&self.name, err))?;
        if result.is_error.unwrap_or(false) {
            tracing::debug!(server = %self.name, tool = %name, "tool reported an error result");
        }
        let mut wire = serde_json::to_value(&result).map_err(|err| {
            ToolServerError::request(&self.name, format!("unserializable tool result: {err}"))
        })?;
        unwrap_text_items(&mut wire);
        Ok(wire)
    }
}

/// Replaces `{"type": "text", "text": ...}` content items with their text so
/// a lone text item flattens to plain text.
pub fn unwrap_text_items(result: &mut Value) {
    let Some(Value::Array(items)) = result.get_mut("content") else {
        return;
    };
    for item in items.iter_mut() {
        let text = match item {
            Value::Object(fields) if fields.get("type").and_then(Value::as_str) == Some("text") => {
                fields.get("text").and_then(Value::as_str).map(str::to_owned)
            }
            _ => None,
        };
        if let Some(text) = text {
            *item = Value::String(text);
        }
    }
}
