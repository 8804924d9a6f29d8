use crate::config::{self, Backend, Config};
use crate::error::Result;
use crate::ui;
use std::path::Path;

/// Run the init command
pub fn run_init(force: bool, override_path: Option<&Path>) -> Result<()> {
    let config_path = config::config_path(override_path)?;

    // Check if config already exists
    if config_path.exists() && !force {
        ui::print_warning(&format!(
            "Config file already exists at {}",
            config_path.display()
        ));
        ui::print_info("Use --force to overwrite");
        return Ok(());
    }

    let config = if ui::is_interactive() {
        prompt_config()?
    } else {
        Config::default()
    };

    config::save_config_to(&config, &config_path)?;

    ui::print_success(&format!("Created config file at {}", config_path.display()));
    match config.model.backend {
        Backend::Http => ui::print_info(&format!(
            "Export your API key as {} before running suggest or search",
            config.model.api_key_env
        )),
        Backend::Command => ui::print_info(&format!(
            "Prompts will be piped to '{}'",
            config.model.command
        )),
    }

    Ok(())
}

fn prompt_config() -> Result<Config> {
    let mut config = Config::default();

    config.model.backend = ui::prompt_select(
        "How should Navarah reach the model?",
        vec![Backend::Http, Backend::Command],
    )?;

    match config.model.backend {
        Backend::Http => {
            config.model.endpoint =
                ui::prompt_text_with_default("Chat completions endpoint:", &config.model.endpoint)?;
            config.model.model = ui::prompt_text_with_default("Model name:", &config.model.model)?;
            config.model.api_key_env =
                ui::prompt_text_with_default("Environment variable with the API key:", &config.model.api_key_env)?;
            config.model.json_mode =
                ui::prompt_confirm("Request JSON-schema structured output?", config.model.json_mode)?;
        }
        Backend::Command => {
            config.model.command =
                ui::prompt_text_with_default("Command to run (reads the prompt on stdin):", &config.model.command)?;
        }
    }

    Ok(config)
}
