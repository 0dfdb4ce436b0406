//! Interactive console.
//!
//! Each line is a command. A line starting with `?` prints suggestions for
//! the rest of the line; `help` lists commands; `exit` or end of input quits.

use std::io::Write;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::args::ConsoleArgs;
use crate::cli::demo::ConsoleSender;
use crate::cli::render;
use crate::error::{CmdTreeError, ExitCode};
use crate::manager::CommandManager;

/// What to do with one console line.
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank line.
    Empty,
    /// Leave the console.
    Exit,
    /// List commands.
    Help,
    /// Print suggestions for the input.
    Suggest(&'a str),
    /// Run the input.
    Execute(&'a str),
}

/// Classifies a raw console line. Suggestion input keeps trailing spaces.
#[must_use]
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(partial) = line.trim_start().strip_prefix('?') {
        return Line::Suggest(partial);
    }
    match line.trim() {
        "" => Line::Empty,
        "exit" | "quit" => Line::Exit,
        "help" => Line::Help,
        input => Line::Execute(input),
    }
}

/// Runs the console until end of input.
///
/// # Errors
///
/// Returns an error if stdin or stdout fail.
pub async fn run(
    manager: &CommandManager<ConsoleSender>,
    sender: Arc<ConsoleSender>,
    args: &ConsoleArgs,
) -> Result<i32, CmdTreeError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    debug!(coordinator = manager.coordinator_name(), "console started");
    loop {
        print!("{}", args.prompt);
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match classify(&line) {
            Line::Empty => {}
            Line::Exit => break,
            Line::Help => {
                for entry in manager.help(&sender) {
                    match entry.description {
                        Some(description) => println!("{}  {description}", entry.syntax),
                        None => println!("{}", entry.syntax),
                    }
                }
            }
            Line::Suggest(partial) => {
                let suggestions = manager.suggest(Arc::clone(&sender), partial);
                if suggestions.is_empty() {
                    println!("(no suggestions)");
                } else {
                    println!("{}", suggestions.join("  "));
                }
            }
            Line::Execute(input) => {
                let outcome = manager.execute_async(Arc::clone(&sender), input).await;
                if let Some(text) = render::render(&outcome) {
                    println!("{text}");
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
