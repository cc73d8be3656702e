use thiserror::Error;

use crate::domain::server::ToolServerError;

/// Structural failures: they abort setup for the affected server instead of
/// being folded into a tool observation.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid tool server configuration: {0}")]
    Configuration(String),
    #[error("tool discovery failed for server '{server}': {source}")]
    Discovery {
        server: String,
        #[source]
        source: ToolServerError,
    },
}

impl BridgeError {
    /// Name of the server the error belongs to, when there is one.
    pub fn server(&self) -> Option<&str> {
        match self {
            BridgeError::Discovery { server, .. } => Some(server.as_str()),
            BridgeError::Configuration(_) => None,
        }
    }
}
