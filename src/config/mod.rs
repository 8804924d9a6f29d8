mod types;

pub use types::*;

use crate::error::{NavarahError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Get the XDG-compliant config directory
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "navarah")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| NavarahError::Config("Could not determine config directory".to_string()))
}

/// Get the config file path, honoring an explicit override
pub fn config_path(override_path: Option<&Path>) -> Result<PathBuf> {
    match override_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(config_dir()?.join("config.toml")),
    }
}

/// Load config from a specific path
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(NavarahError::ConfigNotFound(path.display().to_string()));
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Load config, falling back to defaults when the default file is absent.
///
/// An explicit `--config` path must exist.
pub fn load_config(override_path: Option<&Path>) -> Result<Config> {
    let path = config_path(override_path)?;
    if override_path.is_none() && !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(Config::default());
    }
    load_config_from(&path)
}

/// Save config to a specific path
pub fn save_config_to(config: &Config, path: &Path) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Resolve the API key from the configured env var, then the key command
pub fn resolve_api_key(config: &ModelConfig) -> Result<Option<String>> {
    if let Ok(key) = std::env::var(&config.api_key_env) {
        if !key.trim().is_empty() {
            return Ok(Some(key.trim().to_string()));
        }
    }

    match config.api_key_command.as_deref() {
        Some(command) if !command.trim().is_empty() => run_key_command(command).map(Some),
        _ => Ok(None),
    }
}

/// Execute the key command and return its trimmed stdout
fn run_key_command(command: &str) -> Result<String> {
    let output = if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", command]).output()
    } else {
        Command::new("sh").args(["-c", command]).output()
    };

    match output {
        Ok(output) => {
            if output.status.success() {
                let key = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if key.is_empty() {
                    Err(NavarahError::ApiKeyCommand(
                        "Key command returned empty output".to_string(),
                    ))
                } else {
                    Ok(key)
                }
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(NavarahError::ApiKeyCommand(format!(
                    "Key command failed: {}",
                    stderr.trim()
                )))
            }
        }
        Err(e) => Err(NavarahError::ApiKeyCommand(format!(
            "Failed to execute key command: {}",
            e
        ))),
    }
}

/// Redact sensitive information from config for display
pub fn redact_config(config: &Config) -> Config {
    let mut redacted = config.clone();
    if redacted.model.api_key_command.is_some() {
        redacted.model.api_key_command = Some("[REDACTED]".to_string());
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ResponsePools;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[model]
model = "llama3"
timeout_seconds = 15
"#,
        )
        .unwrap();
        assert_eq!(config.model.model, "llama3");
        assert_eq!(config.model.timeout_seconds, 15);
        assert_eq!(config.model.backend, Backend::Http);
        assert!(config.model.json_mode);
        assert_eq!(config.settings.log_format, LogFormat::Text);
        assert!(config.data.health_data.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.model.backend = Backend::Command;
        config.chat.greetings = vec!["Hey!".to_string()];
        save_config_to(&config, &path).unwrap();

        let loaded = load_config(Some(&path)).unwrap();
        assert_eq!(loaded.model.backend, Backend::Command);
        assert_eq!(loaded.chat.greetings, vec!["Hey!".to_string()]);
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        assert!(matches!(
            load_config(Some(&path)),
            Err(NavarahError::ConfigNotFound(_))
        ));
    }

    #[test]
    fn test_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());

        let mut bad = Config::default();
        bad.model.endpoint = "not a url".to_string();
        bad.model.timeout_seconds = 0;
        bad.chat.unknown = vec!["  ".to_string()];
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.len(), 3);

        let mut plain_http = Config::default();
        plain_http.model.endpoint = "http://localhost:11434/v1/chat/completions".to_string();
        let warnings = plain_http.validate().unwrap();
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_chat_pools_override() {
        let mut config = Config::default();
        config.chat.greetings = vec!["Custom hello".to_string()];
        let pools = config.chat.response_pools();
        assert_eq!(pools.greetings(), &["Custom hello".to_string()]);
        assert!(!pools.unknown().is_empty());
    }

    #[test]
    fn test_blank_chat_pool_entries_are_dropped() {
        let defaults = ResponsePools::default();

        let mut config = Config::default();
        config.chat.greetings = vec!["  ".to_string(), String::new()];
        config.chat.unknown = vec!["Could you rephrase?".to_string(), "\t".to_string()];
        let pools = config.chat.response_pools();
        assert_eq!(pools.greetings(), defaults.greetings());
        assert_eq!(pools.unknown(), &["Could you rephrase?".to_string()]);
    }

    #[test]
    fn test_key_command() {
        let mut model = ModelConfig::default();
        model.api_key_env = "NAVARAH_TEST_UNSET_KEY_VAR".to_string();
        model.api_key_command = Some("echo sk-test".to_string());
        assert_eq!(resolve_api_key(&model).unwrap(), Some("sk-test".to_string()));

        model.api_key_command = None;
        assert_eq!(resolve_api_key(&model).unwrap(), None);
    }

    #[test]
    fn test_redact() {
        let mut config = Config::default();
        config.model.api_key_command = Some("pass show openai".to_string());
        let redacted = redact_config(&config);
        assert_eq!(redacted.model.api_key_command.as_deref(), Some("[REDACTED]"));
    }
}
