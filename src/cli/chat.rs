use crate::chat::{ChatSession, Chooser, Responder, Role};
use crate::config::Config;
use crate::error::{ExitStatus, Result};
use crate::ui;
use std::io::{self, BufRead};
use tracing::debug;

const EXIT_WORDS: &[&str] = &["exit", "quit", "bye"];

/// Run the chat command
pub fn run_chat(message: Option<String>, json: bool, config: &Config) -> Result<ExitStatus> {
    let responder = Responder::new(config.chat.response_pools());
    let mut session = ChatSession::new(responder);

    match message {
        Some(text) => {
            let reply = session.exchange(&text).text.clone();
            if !json {
                println!("{}", reply);
            }
        }
        None if ui::is_interactive() => run_repl(&mut session, json)?,
        None => {
            // Piped input: one message per line
            for line in io::stdin().lock().lines() {
                let line = line?;
                let reply = session.exchange(&line).text.clone();
                if !json {
                    println!("{}", reply);
                }
            }
        }
    }

    if json {
        ui::print_json(session.transcript())?;
    }
    Ok(ExitStatus::Success)
}

fn run_repl<C: Chooser>(session: &mut ChatSession<C>, json: bool) -> Result<()> {
    ui::print_info("Ask about pregnancy, infant care, hospitals or general health. Type 'exit' to leave.");

    while let Some(line) = ui::prompt_line("You:")? {
        if EXIT_WORDS.contains(&line.trim().to_lowercase().as_str()) {
            break;
        }

        let reply = session.exchange(&line).text.clone();
        if let Some(user) = session
            .transcript()
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
        {
            debug!(sentiment = ?user.sentiment, "User message recorded");
        }
        if !json {
            println!("{} {}", console::style("Navarah:").magenta().bold(), reply);
        }
    }
    Ok(())
}
