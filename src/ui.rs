use crate::error::{NavarahError, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use inquire::{Confirm, Select, Text};
use serde::Serialize;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Global quiet mode flag - when true, suppresses non-error output
static QUIET_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable quiet mode globally
pub fn set_quiet_mode(quiet: bool) {
    QUIET_MODE.store(quiet, Ordering::SeqCst);
}

/// Check if quiet mode is enabled
pub fn is_quiet() -> bool {
    QUIET_MODE.load(Ordering::SeqCst)
}

/// Prompt for text input; `None` when the user ends input (Ctrl-D / Esc)
pub fn prompt_line(message: &str) -> Result<Option<String>> {
    match Text::new(message).prompt() {
        Ok(line) => Ok(Some(line)),
        Err(inquire::InquireError::OperationCanceled)
        | Err(inquire::InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(NavarahError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            e.to_string(),
        ))),
    }
}

/// Prompt for text input with default value
pub fn prompt_text_with_default(message: &str, default: &str) -> Result<String> {
    Text::new(message)
        .with_default(default)
        .prompt()
        .map_err(|_| NavarahError::UserCancelled)
}

/// Prompt for confirmation
pub fn prompt_confirm(message: &str, default: bool) -> Result<bool> {
    Confirm::new(message)
        .with_default(default)
        .prompt()
        .map_err(|_| NavarahError::UserCancelled)
}

/// Prompt for selection from a list
pub fn prompt_select<T: Display>(message: &str, options: Vec<T>) -> Result<T> {
    Select::new(message, options)
        .prompt()
        .map_err(|_| NavarahError::UserCancelled)
}

/// Spinner shown while waiting on the model; hidden when not on a terminal
pub struct Spinner {
    progress: ProgressBar,
}

impl Spinner {
    /// Create and start a new spinner
    pub fn new(message: &str) -> Self {
        if is_quiet() || !atty::is(atty::Stream::Stderr) {
            return Spinner {
                progress: ProgressBar::hidden(),
            };
        }

        let progress = ProgressBar::new_spinner();
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        progress.set_style(spinner_style);
        progress.set_message(message.to_string());
        progress.enable_steady_tick(Duration::from_millis(100));
        Spinner { progress }
    }

    /// Stop the spinner with an error message
    pub fn finish_with_error(&self, message: &str) {
        self.progress.finish_with_message(format!("{} {}", style("✗").red(), message));
    }

    /// Stop the spinner and clear it
    pub fn finish_and_clear(&self) {
        self.progress.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.progress.is_finished() {
            self.progress.finish_and_clear();
        }
    }
}

/// Print a success message (suppressed in quiet mode)
pub fn print_success(message: &str) {
    if !is_quiet() {
        println!("{} {}", style("✓").green(), message);
    }
}

/// Print an error message (always shown, even in quiet mode)
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Print a warning message (suppressed in quiet mode)
pub fn print_warning(message: &str) {
    if !is_quiet() {
        eprintln!("{} {}", style("!").yellow(), message);
    }
}

/// Print an info message (suppressed in quiet mode)
pub fn print_info(message: &str) {
    if !is_quiet() {
        println!("{} {}", style("→").blue(), message);
    }
}

/// Print a blank line (suppressed in quiet mode)
pub fn print_blank() {
    if !is_quiet() {
        println!();
    }
}

/// Pretty JSON on stdout; printed even in quiet mode since it is the result
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a bullet list item
pub fn print_bullet(text: &str) {
    println!("  {} {}", style("•").cyan(), text);
}

/// Print a heading line
pub fn print_heading(text: &str) {
    println!("{}", style(text).bold());
}

/// Print a dimmed secondary line
pub fn print_dim(text: &str) {
    println!("    {}", style(text).dim());
}

/// Check if running in a TTY
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}
