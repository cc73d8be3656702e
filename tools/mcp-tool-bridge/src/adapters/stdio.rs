use async_trait::async_trait;
use rmcp::{ServiceExt, transport::child_process::TokioChildProcess};
use serde_json::Value;
use std::{process::Stdio, sync::Arc, time::Duration};
use tokio::{process::Command, sync::Mutex, time::timeout};

use crate::{
    adapters::rmcp::RmcpToolServer,
    domain::server::{JsonObject, RemoteTool, ToolServer, ToolServerConfig, ToolServerError},
};

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_millis(15_000);

#[derive(Debug, Clone)]
pub struct StdioOptions {
    pub cache_tools_list: bool,
    pub handshake_timeout: Duration,
}

impl Default for StdioOptions {
    fn default() -> Self {
        Self {
            cache_tools_list: true,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }
}

enum Session {
    Idle,
    Connected(Arc<RmcpToolServer>),
    Closed,
}

/// Handle to a tool server launched as a child process speaking MCP over
/// stdio.
///
/// The process is spawned on first use. A failed spawn or handshake leaves
/// the handle idle so the next request tries again.
pub struct StdioToolServer {
    config: ToolServerConfig,
    options: StdioOptions,
    session: Mutex<Session>,
    tools_cache: parking_lot::Mutex<Option<Vec<RemoteTool>>>,
}

impl StdioToolServer {
    pub fn new(config: ToolServerConfig, options: StdioOptions) -> Self {
        Self {
            config,
            options,
            session: Mutex::new(Session::Idle),
            tools_cache: parking_lot::Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ToolServerConfig {
        &self.config
    }

    pub fn invalidate_tools_cache(&self) {
        self.tools_cache.lock().take();
    }

    /// Ends the session. Later requests fail with [`ToolServerError::Closed`].
    pub async fn shutdown(&self) {
        let previous = {
            let mut state = self.session.lock().await;
            self.invalidate_tools_cache();
            std::mem::replace(&mut *state, Session::Closed)
        };
        let Session::Connected(session) = previous else {
            return;
        };
        match Arc::try_unwrap(session) {
            Ok(session) => {
                if let Err(err) = session.close().await {
                    tracing::warn!(server = %self.config.name, %err, "failed to close session");
                }
            }
            Err(_) => {
                tracing::debug!(server = %self.config.name, "session still in use; dropped after last call")
            }
        }
    }

    async fn session(&self) -> Result<Arc<RmcpToolServer>, ToolServerError> {
        let mut state = self.session.lock().await;
        match &*state {
            Session::Connected(session) => return Ok(session.clone()),
            Session::Closed => {
                return Err(ToolServerError::Closed {
                    server: self.config.name.clone(),
                });
            }
            Session::Idle => {}
        }
        let session = Arc::new(self.connect().await?);
        *state = Session::Connected(session.clone());
        Ok(session)
    }

    async fn connect(&self) -> Result<RmcpToolServer, ToolServerError> {
        let name = &self.config.name;
        let program = which::which(&self.config.command).map_err(|err| {
            ToolServerError::connect(name, format!("command '{}': {err}", self.config.command))
        })?;

        let mut cmd = Command::new(program);
        cmd.args(&self.config.args);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let transport = TokioChildProcess::new(cmd)
            .map_err(|err| ToolServerError::connect(name, format!("spawn: {err}")))?;
        let handshake_timeout = self.options.handshake_timeout;
        let service = timeout(handshake_timeout, ().serve(transport))
            .await
            .map_err(|_| {
                ToolServerError::connect(
                    name,
                    format!(
                        "stdio handshake timed out after {} ms",
                        handshake_timeout.as_millis()
                    ),
                )
            })?
            .map_err(|err| ToolServerError::connect(name, err))?;

        let session = RmcpToolServer::new(name.clone(), service);
        tracing::info!(
            server = %name,
            version = ?session.server_version(),
            "connected to tool server"
        );
        Ok(session)
    }
}

#[async_trait]
impl ToolServer for StdioToolServer {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn list_tools(&self) -> Result<Vec<RemoteTool>, ToolServerError> {
        if self.options.cache_tools_list {
            let cached = self.tools_cache.lock().clone();
            if let Some(tools) = cached {
                return Ok(tools);
            }
        }
        let tools = self.session().await?.list_tools().await?;
        if self.options.cache_tools_list {
            // shutdown clears the cache under the same lock
            let state = self.session.lock().await;
            if matches!(*state, Session::Closed) {
                return Err(ToolServerError::Closed {
                    server: self.config.name.clone(),
                });
            }
            *self.tools_cache.lock() = Some(tools.clone());
        }
        Ok(tools)
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<Value, ToolServerError> {
        self.session().await?.call_tool(name, arguments).await
    }
}

/// One handle per config, in config order. Nothing is spawned until a
/// handle is first used.
pub fn build_servers(
    configs: &[ToolServerConfig],
    options: &StdioOptions,
) -> Vec<Arc<StdioToolServer>> {
    configs
        .iter()
        .map(|config| Arc::new(StdioToolServer::new(config.clone(), options.clone())))
        .collect()
}
