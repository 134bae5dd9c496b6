//! External tool providers: pluggable sources of tools beyond the local set.

mod types;

pub use types::{ToolCallRequest, ToolDefinition, ToolSchema};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// A source of additional tools (an MCP manager, a plugin host, ...).
///
/// Both operations may fail; the registry propagates listing failures and the
/// dispatcher turns invocation failures into error results.
#[async_trait]
pub trait ExternalToolProvider: Send + Sync {
    async fn list_tool_schemas(&self) -> anyhow::Result<Vec<ToolSchema>>;
    async fn invoke(&self, name: &str, args: &HashMap<String, Value>) -> anyhow::Result<String>;
}

/// Provider used when no external tools are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExternalTools;

#[async_trait]
impl ExternalToolProvider for NoExternalTools {
    async fn list_tool_schemas(&self) -> anyhow::Result<Vec<ToolSchema>> {
        Ok(Vec::new())
    }

    async fn invoke(&self, name: &str, _args: &HashMap<String, Value>) -> anyhow::Result<String> {
        anyhow::bail!("Unknown tool: {name}")
    }
}
