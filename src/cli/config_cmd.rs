use crate::cli::ConfigCommands;
use crate::config::{self, Config};
use crate::error::{NavarahError, Result};
use crate::ui;
use std::path::Path;
use std::process::Command;

/// Run config subcommands
pub fn run_config(command: ConfigCommands, override_path: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommands::Show => show_config(override_path),
        ConfigCommands::Edit => edit_config(override_path),
        ConfigCommands::Validate => validate_config(override_path),
        ConfigCommands::Path => print_path(override_path),
    }
}

fn show_config(override_path: Option<&Path>) -> Result<()> {
    let config = config::load_config(override_path)?;
    let redacted = config::redact_config(&config);
    let content = toml::to_string_pretty(&redacted)
        .map_err(|e| NavarahError::Config(format!("Failed to serialize config: {}", e)))?;
    println!("{}", content);
    Ok(())
}

fn edit_config(override_path: Option<&Path>) -> Result<()> {
    let path = config::config_path(override_path)?;

    if !path.exists() {
        return Err(NavarahError::ConfigNotFound(path.display().to_string()));
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    let status = Command::new(&editor)
        .arg(&path)
        .status()
        .map_err(|e| NavarahError::Config(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(NavarahError::Config(format!("Editor exited with status {}", status)));
    }

    // Validate the config after editing
    match config::load_config_from(&path) {
        Ok(config) => report(&config).or_else(|_| {
            ui::print_warning("Fix the errors above before the next run");
            Ok(())
        }),
        Err(e) => {
            ui::print_error(&format!("Config has syntax errors: {}", e));
            Ok(())
        }
    }
}

fn validate_config(override_path: Option<&Path>) -> Result<()> {
    let config = config::load_config(override_path)?;
    report(&config)
}

fn report(config: &Config) -> Result<()> {
    match config.validate() {
        Ok(warnings) => {
            for warning in warnings {
                ui::print_warning(&warning);
            }
            ui::print_success("Config is valid");
            Ok(())
        }
        Err(errors) => {
            for error in errors {
                ui::print_error(&error);
            }
            Err(NavarahError::ConfigInvalid("Config validation failed".to_string()))
        }
    }
}

fn print_path(override_path: Option<&Path>) -> Result<()> {
    let path = config::config_path(override_path)?;
    println!("{}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_bad_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model]\ntimeout_seconds = 0\n").unwrap();

        let err = validate_config(Some(&path)).unwrap_err();
        assert!(matches!(err, NavarahError::ConfigInvalid(_)));
    }

    #[test]
    fn test_validate_accepts_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        config::save_config_to(&Config::default(), &path).unwrap();

        assert!(validate_config(Some(&path)).is_ok());
    }

    #[test]
    fn test_explicit_missing_path_is_not_found() {
        let err = show_config(Some(Path::new("/nonexistent/navarah.toml"))).unwrap_err();
        assert!(matches!(err, NavarahError::ConfigNotFound(_)));
    }
}
