//! Configuration for the tool bridge.
//!
//! Settings come from `~/.toolbridge/config.json` (camelCase or snake_case
//! keys) and are then overlaid with environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
        }
    }
}

fn default_gateway_host() -> String {
    "0.0.0.0".to_string()
}

fn default_gateway_port() -> u16 {
    18790
}

/// Tools configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub web: WebToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WebToolsConfig {
    #[serde(default)]
    pub serpapi: SerpApiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpApiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_serpapi_base_url")]
    pub base_url: String,
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_results")]
    pub default_results: usize,
}

impl Default for SerpApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_serpapi_base_url(),
            timeout_secs: default_search_timeout(),
            default_results: default_results(),
        }
    }
}

impl SerpApiConfig {
    /// Configured credential, ignoring blank values.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

fn default_serpapi_base_url() -> String {
    "https://serpapi.com".to_string()
}

fn default_search_timeout() -> u64 {
    15
}

fn default_results() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_chars: default_max_chars(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_max_chars() -> usize {
    4000
}

pub(crate) fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; WebBot/1.0)".to_string()
}

/// Variables read from the process environment.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    #[serde(default)]
    serpapi_key: Option<String>,
    #[serde(default)]
    toolbridge_serpapi_base_url: Option<String>,
    #[serde(default)]
    toolbridge_gateway_host: Option<String>,
    #[serde(default)]
    toolbridge_gateway_port: Option<u16>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Overlay environment variables on top of file settings.
    pub fn apply_env(mut self) -> anyhow::Result<Self> {
        let env: EnvOverrides = envy::from_env()?;
        self.apply_overrides(env);
        Ok(self)
    }

    fn apply_overrides(&mut self, env: EnvOverrides) {
        if let Some(key) = non_blank(env.serpapi_key) {
            self.tools.web.serpapi.api_key = Some(key);
        }
        if let Some(base) = non_blank(env.toolbridge_serpapi_base_url) {
            self.tools.web.serpapi.base_url = base;
        }
        if let Some(host) = non_blank(env.toolbridge_gateway_host) {
            self.gateway.host = host;
        }
        if let Some(port) = env.toolbridge_gateway_port {
            self.gateway.port = port;
        }
    }
}

/// Get the config path (~/.toolbridge/config.json)
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let home = resolve_home_dir()?;
    Ok(home.join(".toolbridge").join("config.json"))
}

fn resolve_home_dir() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("TOOLBRIDGE_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))
}

/// Load config from file, then apply the environment overlay.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = if path.exists() {
        let data = std::fs::read_to_string(path)?;
        parse_compat_json(&data)?
    } else {
        Config::default()
    };
    config.apply_env()
}

/// Save config to file
pub fn save_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid path"))?;
    std::fs::create_dir_all(dir)?;

    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data)?;
    Ok(())
}

fn parse_compat_json(data: &str) -> anyhow::Result<Config> {
    let value: serde_json::Value = serde_json::from_str(data)?;
    let normalized = normalize_keys(value);
    let config: Config = serde_json::from_value(normalized)?;
    Ok(config)
}

fn normalize_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let normalized = map
                .into_iter()
                .map(|(k, v)| (camel_to_snake(&k), normalize_keys(v)))
                .collect();
            serde_json::Value::Object(normalized)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(normalize_keys).collect())
        }
        other => other,
    }
}

fn camel_to_snake(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let chars: Vec<char> = input.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied().unwrap_or_default();
                if prev.is_ascii_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_ascii_uppercase() && next.is_ascii_lowercase())
                {
                    out.push('_');
                }
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
