mod chat;
mod cli;
mod config;
mod error;
mod flow;
mod health;
mod knowledge;
mod model;
mod schema;
mod template;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, LogFormat, LogLevel};
use error::{ExitStatus, NavarahError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ui::set_quiet_mode(cli.quiet);

    // Config settings feed the log defaults, so load it before logging starts
    let config = match config::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ui::print_error(&e.to_string());
            return e.exit_status().into();
        }
    };

    setup_logging(cli.verbose, cli.quiet, cli.log_format.as_deref(), &config);

    // Run command
    let result = run_command(cli, config).await;

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            ui::print_error(&e.to_string());
            if e.is_retryable() {
                ui::print_info("The model may be temporarily unavailable; try again shortly.");
            }
            e.exit_status().into()
        }
    }
}

async fn run_command(cli: Cli, config: Config) -> Result<ExitStatus, NavarahError> {
    let config_override = cli.config.as_deref();

    match cli.command {
        Some(Commands::Suggest(args)) => cli::run_suggest(args, &config).await,

        Some(Commands::Search(args)) => cli::run_search(args, &config).await,

        Some(Commands::Chat { message, json }) => cli::run_chat(message, json, &config),

        Some(Commands::Config { command }) => {
            cli::run_config(command, config_override)?;
            Ok(ExitStatus::Success)
        }

        Some(Commands::Init { force }) => {
            cli::run_init(force, config_override)?;
            Ok(ExitStatus::Success)
        }

        None => {
            // No command - offer setup on first run, otherwise show help
            if !config::config_path(config_override)?.exists() && ui::is_interactive() {
                ui::print_info("Welcome to Navarah!");
                ui::print_info("Let's set up your configuration.");
                ui::print_blank();
                cli::run_init(false, config_override)?;
            } else {
                use clap::CommandFactory;
                let mut cmd = Cli::command();
                cmd.print_help().ok();
            }
            Ok(ExitStatus::Success)
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool, format: Option<&str>, config: &Config) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => match config.settings.log_level {
                LogLevel::Quiet => "warn",
                LogLevel::Normal => "info",
                LogLevel::Verbose => "debug",
            },
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let json = match format {
        Some(f) => f.eq_ignore_ascii_case("json"),
        None => config.settings.log_format == LogFormat::Json,
    };

    // Logs go to stderr so `--json` output on stdout stays parseable
    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().without_time().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
