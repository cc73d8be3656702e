use std::sync::Arc;

use crate::{
    app::function_tool::{FunctionTool, ToolInvoker},
    domain::{
        schema::strictify,
        server::{RemoteTool, ToolServer, ToolServerError},
    },
};

/// Turns the tools advertised by a connected server into function tools.
#[derive(Clone, Default)]
pub struct DiscoveryService;

impl DiscoveryService {
    pub fn new() -> Self {
        Self
    }

    /// Lists the server's tools once and wraps each of them, keeping the
    /// server's order. Listing errors are returned untouched.
    pub async fn discover(
        &self,
        server: &Arc<dyn ToolServer>,
        convert_schemas_to_strict: bool,
    ) -> Result<Vec<FunctionTool>, ToolServerError> {
        let tools = server.list_tools().await?;
        tracing::info!(
            server = %server.name(),
            count = tools.len(),
            strict = convert_schemas_to_strict,
            "discovered tools"
        );
        Ok(tools
            .into_iter()
            .map(|tool| self.to_function_tool(tool, server.clone(), convert_schemas_to_strict))
            .collect())
    }

    pub fn to_function_tool(
        &self,
        tool: RemoteTool,
        server: Arc<dyn ToolServer>,
        convert_schemas_to_strict: bool,
    ) -> FunctionTool {
        let RemoteTool {
            name,
            description,
            input_schema,
        } = tool;

        let schema = if convert_schemas_to_strict {
            let strict = strictify(&input_schema);
            tracing::debug!(
                tool = %name,
                original = %input_schema,
                strict = %strict,
                "converted input schema to strict form"
            );
            strict
        } else {
            input_schema
        };

        let invoker = ToolInvoker::new(name.clone(), server);
        FunctionTool::new(
            name,
            description,
            schema,
            convert_schemas_to_strict,
            invoker,
        )
    }
}
