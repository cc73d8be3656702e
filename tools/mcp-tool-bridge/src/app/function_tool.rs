use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::Instrument;

use crate::{
    domain::{
        result::flatten_call_result,
        server::{JsonObject, ToolServer},
    },
    infra::metrics::{self, CallOutcome, PendingGaugeGuard},
    shared::{
        types::{DefinitionKind, FunctionDefinition},
        utils::measure_latency,
    },
};

/// Invocation routine bound to exactly one remote tool on one server.
#[derive(Clone)]
pub struct ToolInvoker {
    tool_name: String,
    server: Arc<dyn ToolServer>,
}

impl ToolInvoker {
    pub fn new(tool_name: impl Into<String>, server: Arc<dyn ToolServer>) -> Self {
        Self {
            tool_name: tool_name.into(),
            server,
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn server_name(&self) -> &str {
        self.server.name()
    }

    /// Run the tool with the model-provided argument JSON. Never fails:
    /// argument and call errors come back as diagnostic text so the
    /// conversation can carry on.
    pub async fn invoke(&self, input_json: &str) -> String {
        let call_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "tool_call",
            %call_id,
            tool = %self.tool_name,
            server = %self.server.name()
        );
        self.invoke_inner(input_json).instrument(span).await
    }

    async fn invoke_inner(&self, input_json: &str) -> String {
        let arguments = match parse_arguments(input_json) {
            Ok(arguments) => arguments,
            Err(ArgumentError::Syntax(reason)) => {
                metrics::record_call(CallOutcome::ArgumentError);
                tracing::warn!(%reason, "rejected tool arguments");
                return format!(
                    "Error parsing input JSON for tool '{}': {}",
                    self.tool_name, reason
                );
            }
            // valid JSON the protocol cannot carry; reported like a failed call
            Err(ArgumentError::NotAnObject(kind)) => {
                metrics::record_call(CallOutcome::ArgumentError);
                tracing::warn!(kind, "tool arguments are not a JSON object");
                return format!(
                    "Error calling tool '{}': expected a JSON object, got {}",
                    self.tool_name, kind
                );
            }
        };

        let _pending = PendingGaugeGuard::new();
        let (result, elapsed) =
            measure_latency(|| self.server.call_tool(&self.tool_name, arguments)).await;
        metrics::observe_call_latency(elapsed);

        match result {
            Ok(result) => {
                metrics::record_call(CallOutcome::Ok);
                tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "tool call ok");
                flatten_call_result(&result)
            }
            Err(err) => {
                metrics::record_call(CallOutcome::CallError);
                tracing::warn!(%err, "tool call failed");
                format!("Error calling tool '{}': {}", self.tool_name, err)
            }
        }
    }
}

impl fmt::Debug for ToolInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolInvoker")
            .field("tool_name", &self.tool_name)
            .field("server", &self.server.name())
            .finish()
    }
}

enum ArgumentError {
    Syntax(String),
    NotAnObject(&'static str),
}

fn parse_arguments(input_json: &str) -> Result<JsonObject, ArgumentError> {
    if input_json.trim().is_empty() {
        return Ok(JsonObject::new());
    }
    match serde_json::from_str::<Value>(input_json) {
        Ok(Value::Object(arguments)) => Ok(arguments),
        Ok(Value::Null) => Ok(JsonObject::new()),
        Ok(other) => Err(ArgumentError::NotAnObject(json_kind(&other))),
        Err(err) => Err(ArgumentError::Syntax(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A remote tool exposed as one callable function.
#[derive(Clone)]
pub struct FunctionTool {
    name: String,
    description: String,
    params_json_schema: Value,
    strict_json_schema: bool,
    invoker: ToolInvoker,
}

impl FunctionTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        params_json_schema: Value,
        strict_json_schema: bool,
        invoker: ToolInvoker,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params_json_schema,
            strict_json_schema,
            invoker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn params_json_schema(&self) -> &Value {
        &self.params_json_schema
    }

    pub fn strict_json_schema(&self) -> bool {
        self.strict_json_schema
    }

    pub fn invoker(&self) -> &ToolInvoker {
        &self.invoker
    }

    pub async fn invoke(&self, input_json: &str) -> String {
        self.invoker.invoke(input_json).await
    }

    pub fn definition(&self) -> FunctionDefinition {
        FunctionDefinition {
            kind: DefinitionKind::Function,
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.params_json_schema.clone(),
            strict: self.strict_json_schema,
        }
    }
}

impl fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("strict_json_schema", &self.strict_json_schema)
            .field("server", &self.invoker.server_name())
            .finish()
    }
}
