//! Weather stub: well-formed random readings, no network.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use super::random::{RandomSource, RngSource};
use super::{Tool, ToolError, ToolResult, arg_string};

const CONDITIONS: [&str; 4] = ["Sunny", "Cloudy", "Rainy", "Snowy"];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeatherReport {
    pub location: String,
    pub temperature: i32,
    pub condition: String,
    pub humidity: u32,
}

/// Temperature in `[-10, 30)`, humidity in `[0, 100)`.
pub(crate) fn sample_weather(location: &str, rng: &mut impl RandomSource) -> WeatherReport {
    let temperature = rng.uniform(0.0, 40.0).floor() as i32 - 10;
    let idx = (rng.uniform(0.0, CONDITIONS.len() as f64) as usize).min(CONDITIONS.len() - 1);
    let humidity = rng.uniform(0.0, 100.0).floor() as u32;
    WeatherReport {
        location: location.to_string(),
        temperature,
        condition: CONDITIONS[idx].to_string(),
        humidity,
    }
}

fn sample_with_thread_rng(location: &str) -> WeatherReport {
    sample_weather(location, &mut RngSource(rand::rng()))
}

pub struct WeatherTool;

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }
    fn description(&self) -> &str {
        "Get current weather information for a location"
    }
    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": { "type": "string", "description": "The city or location name" }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: &HashMap<String, Value>) -> Result<ToolResult, ToolError> {
        let location = arg_string(args, "location").unwrap_or_default();
        Ok(ToolResult::Weather(sample_with_thread_rng(&location)))
    }
}
