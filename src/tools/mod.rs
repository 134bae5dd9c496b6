mod random;
mod simulation;
mod weather;
mod web;

use crate::config::WebToolsConfig;
use crate::providers::{ExternalToolProvider, ToolCallRequest, ToolDefinition, ToolSchema};
use async_trait::async_trait;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

pub use simulation::{SimulationInput, SimulationResult, SimulationTool};
pub use weather::{WeatherReport, WeatherTool};
pub use web::WebSearchTool;

/// Outcome of one tool call. Exactly one variant is produced per call, and
/// the JSON form carries only that variant's fields.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Weather(WeatherReport),
    Content { content: String },
    Error { error: String },
    Simulation(SimulationResult),
    /// Free-form object for tools that define their own result shape.
    #[cfg_attr(not(test), allow(dead_code))]
    Payload(serde_json::Map<String, Value>),
}

impl ToolResult {
    pub fn content(text: impl Into<String>) -> Self {
        Self::Content {
            content: text.into(),
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error { error: msg.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Text form for re-injection into a model context.
    pub fn to_llm_text(&self) -> String {
        match self {
            Self::Content { content } => content.clone(),
            Self::Error { error } => format!("Error: {error}"),
            Self::Weather(_) | Self::Simulation(_) | Self::Payload(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }
}

/// Failures raised by tool handlers. The registry converts every one of these
/// into [`ToolResult::Error`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("Failed to fetch: {0}")]
    Fetch(String),
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
    #[error("tool handler panicked: {0}")]
    Panicked(String),
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> Value;
    fn schema(&self) -> ToolSchema {
        ToolSchema::new(self.name(), self.description(), self.parameters())
    }
    async fn execute(&self, args: &HashMap<String, Value>) -> Result<ToolResult, ToolError>;
}

/// Local tools plus the external provider, behind one calling contract.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    provider: Arc<dyn ExternalToolProvider>,
}

impl ToolRegistry {
    /// Registry with no local tools; every call goes to `provider`.
    pub fn new(provider: Arc<dyn ExternalToolProvider>) -> Self {
        Self {
            tools: Vec::new(),
            provider,
        }
    }

    /// Registry with the built-in weather, web and simulation tools.
    pub fn with_web_config(web: &WebToolsConfig, provider: Arc<dyn ExternalToolProvider>) -> Self {
        let mut registry = Self::new(provider);
        registry.register_builtin_tools(web);
        registry
    }

    fn register_builtin_tools(&mut self, web: &WebToolsConfig) {
        // No idle connections survive a call.
        let shared_http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(0)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();
        self.register(WeatherTool);
        self.register(WebSearchTool::from_config(web, shared_http));
        self.register(SimulationTool::new());
    }

    /// Add a tool, replacing any local tool with the same name in place.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let tool: Arc<dyn Tool> = Arc::new(tool);
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    pub fn list_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn local_schemas(&self) -> Vec<ToolSchema> {
        self.tools.iter().map(|t| t.schema()).collect()
    }

    /// Local schemas in registration order, then the provider's schemas.
    /// Provider failures propagate.
    pub async fn get_tool_definitions(&self) -> Result<Vec<ToolDefinition>, ToolError> {
        let external = self.provider.list_tool_schemas().await?;
        Ok(self
            .local_schemas()
            .into_iter()
            .chain(external)
            .map(ToolDefinition::function)
            .collect())
    }

    /// Run one tool call. Never fails: handler errors and panics come back as
    /// [`ToolResult::Error`].
    pub async fn execute(&self, name: &str, args: &HashMap<String, Value>) -> ToolResult {
        let call_id = uuid::Uuid::new_v4();
        let span = tracing::debug_span!("tool_call", tool = name, %call_id);
        let outcome = AssertUnwindSafe(self.route(name, args).instrument(span))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ToolError::Panicked(panic_message(panic.as_ref()))));

        match outcome {
            Ok(result) => {
                tracing::debug!(tool = name, %call_id, is_error = result.is_error(), "tool call finished");
                result
            }
            Err(err) => {
                tracing::warn!(tool = name, %call_id, "tool call failed: {}", err);
                ToolResult::error(err.to_string())
            }
        }
    }

    /// Run several calls concurrently; results keep the order of `calls`.
    pub async fn execute_all(&self, calls: &[ToolCallRequest]) -> Vec<ToolResult> {
        futures::future::join_all(
            calls
                .iter()
                .map(|call| self.execute(&call.name, &call.arguments)),
        )
        .await
    }

    async fn route(
        &self,
        name: &str,
        args: &HashMap<String, Value>,
    ) -> Result<ToolResult, ToolError> {
        match self.get(name) {
            Some(tool) => tool.execute(args).await,
            None => {
                tracing::debug!(tool = name, "delegating to external provider");
                let text = self.provider.invoke(name, args).await?;
                Ok(ToolResult::content(text))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

pub(crate) fn arg_string(args: &HashMap<String, Value>, key: &str) -> Option<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub(crate) fn arg_f64(args: &HashMap<String, Value>, key: &str) -> Option<f64> {
    args.get(key).and_then(|v| v.as_f64())
}
