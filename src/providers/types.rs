use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Function-calling envelope handed to the language model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolSchema,
}

impl ToolDefinition {
    pub fn function(schema: ToolSchema) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: schema,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

impl ToolSchema {
    pub fn new(name: &str, description: &str, parameters: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: HashMap<String, Value>,
}
