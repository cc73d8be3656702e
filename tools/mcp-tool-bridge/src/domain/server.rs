use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::error::BridgeError;

pub type JsonObject = Map<String, Value>;

/// How to launch one stdio tool server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub name: String,
}

impl ToolServerConfig {
    pub fn new<C, N>(command: C, args: Vec<String>, name: N) -> Self
    where
        C: Into<String>,
        N: Into<String>,
    {
        Self {
            command: command.into(),
            args,
            name: name.into(),
        }
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.name.trim().is_empty() {
            return Err(BridgeError::Configuration(format!(
                "server with command '{}' has an empty name",
                self.command
            )));
        }
        if self.command.trim().is_empty() {
            return Err(BridgeError::Configuration(format!(
                "server '{}' has an empty command",
                self.name
            )));
        }
        Ok(())
    }
}

/// A tool as advertised by a remote server, in MCP wire naming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default = "empty_schema")]
    pub input_schema: Value,
}

impl RemoteTool {
    pub fn new<N, D>(name: N, description: D, input_schema: Value) -> Self
    where
        N: Into<String>,
        D: Into<String>,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

fn empty_schema() -> Value {
    Value::Object(JsonObject::new())
}

fn null_as_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Error)]
pub enum ToolServerError {
    #[error("failed to connect to tool server '{server}': {reason}")]
    Connect { server: String, reason: String },
    #[error("tool server '{server}' request failed: {reason}")]
    Request { server: String, reason: String },
    #[error("tool server '{server}' is shut down")]
    Closed { server: String },
}

impl ToolServerError {
    pub fn connect(server: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connect {
            server: server.into(),
            reason: reason.to_string(),
        }
    }

    pub fn request(server: impl Into<String>, reason: impl ToString) -> Self {
        Self::Request {
            server: server.into(),
            reason: reason.to_string(),
        }
    }
}

/// The two operations the bridge needs from a connected tool server.
///
/// `call_tool` returns the raw result object (`{"content": [...], ...}`).
/// Implementations must tolerate concurrent calls from several adapters.
#[async_trait]
pub trait ToolServer: Send + Sync {
    fn name(&self) -> &str;

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolServerError>;

    async fn call_tool(&self, name: &str, arguments: JsonObject)
    -> Result<Value, ToolServerError>;
}
