use futures::future::join_all;
use std::sync::Arc;

use crate::{
    app::{discovery::DiscoveryService, function_tool::FunctionTool},
    domain::{error::BridgeError, server::ToolServer},
    infra::metrics,
    shared::types::{CatalogListing, DiscoveryFailureReport, FunctionDefinition},
};

/// Function tools gathered from every configured server.
///
/// A server whose listing fails contributes no tools and is recorded in
/// `failures`; healthy servers are unaffected.
#[derive(Debug, Default)]
pub struct ToolCatalog {
    tools: Vec<FunctionTool>,
    failures: Vec<BridgeError>,
}

impl ToolCatalog {
    pub async fn collect(servers: &[Arc<dyn ToolServer>], convert_schemas_to_strict: bool) -> Self {
        let discovery = DiscoveryService::new();
        let results = join_all(
            servers
                .iter()
                .map(|server| discovery.discover(server, convert_schemas_to_strict)),
        )
        .await;

        let mut catalog = Self::default();
        for (server, result) in servers.iter().zip(results) {
            match result {
                Ok(tools) => catalog.tools.extend(tools),
                Err(source) => {
                    metrics::record_discovery_failure();
                    tracing::warn!(
                        server = %server.name(),
                        error = %source,
                        "skipping server: tool discovery failed"
                    );
                    catalog.failures.push(BridgeError::Discovery {
                        server: server.name().to_string(),
                        source,
                    });
                }
            }
        }
        catalog
    }

    pub fn tools(&self) -> &[FunctionTool] {
        &self.tools
    }

    pub fn failures(&self) -> &[BridgeError] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// First tool registered under `name`, in server order.
    pub fn find(&self, name: &str) -> Option<&FunctionTool> {
        self.tools.iter().find(|tool| tool.name() == name)
    }

    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        self.tools.iter().map(FunctionTool::definition).collect()
    }

    pub fn listing(&self) -> CatalogListing {
        CatalogListing {
            tools: self.definitions(),
            failures: self
                .failures
                .iter()
                .map(|failure| DiscoveryFailureReport {
                    server: failure.server().unwrap_or_default().to_string(),
                    error: failure.to_string(),
                })
                .collect(),
        }
    }

    pub fn into_tools(self) -> Vec<FunctionTool> {
        self.tools
    }
}
