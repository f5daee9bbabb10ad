//! Mock tool execution.
//!
//! `MockToolInvoker` stands in for the per-surface tool servers. Known tools
//! return `"Mock data from <tool>"` unless a fixture is registered for them;
//! failures can be injected per tool for testing.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use ordo_contracts::{
    error::{OrdoError, OrdoResult},
    permission::Surface,
    tool::ToolResult,
};
use ordo_core::traits::ToolInvoker;

use crate::{catalog, mock_data};

#[derive(Debug, Clone, Default)]
pub struct MockToolInvoker {
    fixtures: HashMap<String, Value>,
    failures: HashMap<String, String>,
}

impl MockToolInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// An invoker preloaded with the sample surface data in `mock_data`.
    pub fn with_sample_data() -> Self {
        let mut invoker = Self::new();
        for spec in catalog::catalog() {
            if let Some(data) = mock_data::sample_for(spec.name) {
                invoker.fixtures.insert(spec.name.to_string(), data);
            }
        }
        invoker
    }

    /// Return `data` whenever `tool` is invoked.
    pub fn with_fixture(mut self, tool: impl Into<String>, data: Value) -> Self {
        self.fixtures.insert(tool.into(), data);
        self
    }

    /// Fail every invocation of `tool` with `reason`.
    pub fn with_failure(mut self, tool: impl Into<String>, reason: impl Into<String>) -> Self {
        self.failures.insert(tool.into(), reason.into());
        self
    }
}

#[async_trait]
impl ToolInvoker for MockToolInvoker {
    async fn invoke(
        &self,
        tool_name: &str,
        params: &Value,
        tokens: &BTreeMap<String, String>,
    ) -> OrdoResult<ToolResult> {
        let fixture = self.fixtures.get(tool_name);
        if catalog::lookup(tool_name).is_none() && fixture.is_none() {
            warn!(tool = %tool_name, "unknown tool requested");
            return Err(OrdoError::UnknownTool {
                tool: tool_name.to_string(),
            });
        }

        let surface = Surface::from_tool(tool_name);
        debug!(
            tool = %tool_name,
            surface = %surface,
            has_token = tokens.contains_key(surface.as_str()),
            params = %params,
            "invoking mock tool"
        );

        if let Some(reason) = self.failures.get(tool_name) {
            return Err(OrdoError::ToolFailed {
                tool: tool_name.to_string(),
                reason: reason.clone(),
            });
        }

        let result = match fixture {
            Some(data) => ToolResult::ok(data.clone()),
            None => ToolResult::ok(format!("Mock data from {}", tool_name)),
        };
        Ok(result)
    }
}
