use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    #[default]
    Function,
}

/// Function definition as handed to a function-calling LLM runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    #[serde(rename = "type")]
    pub kind: DefinitionKind,
    pub name: String,
    pub description: String,
    pub parameters: Value,
    pub strict: bool,
}

/// One server that could not offer tools, as reported by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryFailureReport {
    pub server: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogListing {
    pub tools: Vec<FunctionDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<DiscoveryFailureReport>,
}
