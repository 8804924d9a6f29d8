use crate::chat::ResponsePools;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub data: DataConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// OpenAI-compatible chat completions endpoint
    #[default]
    Http,
    /// External program reading the prompt on stdin
    Command,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Http => write!(f, "http"),
            Backend::Command => write!(f, "command"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Command to execute to retrieve the API key, tried when the env var is unset
    #[serde(default)]
    pub api_key_command: Option<String>,
    /// Program used by the command backend
    #[serde(default = "default_command")]
    pub command: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Request JSON-schema structured output from the endpoint
    #[serde(default = "default_json_mode")]
    pub json_mode: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            backend: Backend::Http,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_key_command: None,
            command: default_command(),
            timeout_seconds: default_timeout(),
            temperature: None,
            json_mode: default_json_mode(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "NAVARAH_API_KEY".to_string()
}

fn default_command() -> String {
    "claude --print".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_json_mode() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Quiet,
    Normal,
    Verbose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Response pools for the chat responder; empty lists fall back to the built-in pools
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub greetings: Vec<String>,
    #[serde(default)]
    pub unknown: Vec<String>,
}

impl ChatConfig {
    /// Configured pools with blank entries dropped; a pool left empty uses the built-in one
    pub fn response_pools(&self) -> ResponsePools {
        let defaults = ResponsePools::default();
        let greetings = configured_or(&self.greetings, defaults.greetings());
        let unknown = configured_or(&self.unknown, defaults.unknown());
        // Both lists are non-empty and non-blank here
        ResponsePools::new(greetings, unknown).unwrap_or(defaults)
    }
}

fn configured_or(configured: &[String], fallback: &[String]) -> Vec<String> {
    let entries: Vec<String> = configured
        .iter()
        .filter(|e| !e.trim().is_empty())
        .cloned()
        .collect();
    if entries.is_empty() {
        fallback.to_vec()
    } else {
        entries
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON file with health records; the bundled sample data is used when unset
    #[serde(default)]
    pub health_data: Option<PathBuf>,
    /// JSON file with knowledge-base categories; the bundled articles are used when unset
    #[serde(default)]
    pub knowledge_base: Option<PathBuf>,
}

impl Config {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<Vec<String>, Vec<String>> {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if self.model.model.trim().is_empty() {
            errors.push("Model name is required".to_string());
        }
        if self.model.timeout_seconds == 0 {
            errors.push("Model timeout must be greater than zero".to_string());
        }
        if let Some(t) = self.model.temperature {
            if !(0.0..=2.0).contains(&t) {
                errors.push(format!("Temperature {} is outside 0.0..=2.0", t));
            }
        }

        match self.model.backend {
            Backend::Http => match Url::parse(&self.model.endpoint) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                    if url.scheme() == "http" {
                        warnings.push(format!("Endpoint {} is not using https", url));
                    }
                }
                Ok(url) => errors.push(format!("Unsupported endpoint scheme: {}", url.scheme())),
                Err(e) => errors.push(format!("Invalid endpoint URL '{}': {}", self.model.endpoint, e)),
            },
            Backend::Command => {
                if self.model.command.trim().is_empty() {
                    errors.push("Command backend requires a command".to_string());
                }
            }
        }

        if self.chat.greetings.iter().any(|g| g.trim().is_empty()) {
            errors.push("Chat greetings must not contain blank entries".to_string());
        }
        if self.chat.unknown.iter().any(|u| u.trim().is_empty()) {
            errors.push("Chat unknown responses must not contain blank entries".to_string());
        }

        for (label, path) in [
            ("health_data", &self.data.health_data),
            ("knowledge_base", &self.data.knowledge_base),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    warnings.push(format!("data.{} file {} does not exist", label, path.display()));
                }
            }
        }

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(errors)
        }
    }
}
