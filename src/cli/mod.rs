mod chat;
mod config_cmd;
mod init;
mod search;
mod suggest;

pub use chat::run_chat;
pub use config_cmd::run_config;
pub use init::run_init;
pub use search::run_search;
pub use suggest::run_suggest;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "navarah")]
#[command(author, version, about = "Maternal and child health assistant: suggestions, knowledge search and chat")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (can repeat: -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log format: text (default) or json
    #[arg(long, value_name = "FORMAT", global = true)]
    pub log_format: Option<String>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Get personalized health suggestions and reminders
    Suggest(SuggestArgs),

    /// Search the knowledge base for relevant articles
    Search(SearchArgs),

    /// Chat with the rule-based assistant
    Chat {
        /// Send a single message and exit instead of starting a session
        #[arg(long, short)]
        message: Option<String>,

        /// Output the transcript as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Create a config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Age in years
    #[arg(long, required_unless_present = "input")]
    pub age: Option<f64>,

    /// The user is a mother
    #[arg(long)]
    pub mother: bool,

    /// The user is a child
    #[arg(long)]
    pub child: bool,

    /// Current health concerns or symptoms
    #[arg(long)]
    pub concerns: Option<String>,

    /// General activity level, e.g. "Moderately Active"
    #[arg(long)]
    pub activity_level: Option<String>,

    /// Read the whole request from a JSON file instead of flags
    #[arg(long, value_name = "FILE", conflicts_with_all = ["age", "mother", "child", "concerns", "activity_level"])]
    pub input: Option<PathBuf>,

    /// Health records JSON file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub health_data: Option<PathBuf>,

    /// Print the prompt without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// What to search for
    pub term: String,

    /// Knowledge base JSON file (overrides config)
    #[arg(long, value_name = "FILE")]
    pub knowledge_base: Option<PathBuf>,

    /// Also print the full text of each matching article
    #[arg(long)]
    pub full: bool,

    /// Print the prompt without calling the model
    #[arg(long)]
    pub dry_run: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show config (secrets redacted)
    Show,

    /// Open config in $EDITOR
    Edit,

    /// Validate config file
    Validate,

    /// Print config file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_suggest_requires_age_or_input() {
        assert!(Cli::try_parse_from(["navarah", "suggest", "--mother"]).is_err());
        assert!(Cli::try_parse_from(["navarah", "suggest", "--input", "req.json"]).is_ok());
        assert!(Cli::try_parse_from(["navarah", "suggest", "--age", "29", "--mother"]).is_ok());
    }

    #[test]
    fn test_input_conflicts_with_profile_flags() {
        assert!(Cli::try_parse_from(["navarah", "suggest", "--input", "req.json", "--age", "3"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["navarah", "search", "sleep", "-vv", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Search(args)) => {
                assert_eq!(args.term, "sleep");
                assert!(args.json);
            }
            _ => panic!("expected search command"),
        }
    }
}
