//! One-shot subcommands: `exec`, `suggest` and `list`.

use std::sync::Arc;

use crate::cli::args::{ExecArgs, ListArgs, OutputFormat, SuggestArgs};
use crate::cli::demo::ConsoleSender;
use crate::cli::render;
use crate::error::{CmdTreeError, ExitCode};
use crate::manager::CommandManager;

/// Runs one command and prints its outcome.
pub async fn exec(
    manager: &CommandManager<ConsoleSender>,
    sender: Arc<ConsoleSender>,
    args: &ExecArgs,
) -> i32 {
    let input = args.input.join(" ");
    let outcome = manager.execute_async(sender, &input).await;
    match args.format {
        OutputFormat::Human => {
            if let Some(text) = render::render(&outcome) {
                if outcome.is_success() {
                    println!("{text}");
                } else {
                    eprintln!("{text}");
                }
            }
        }
        OutputFormat::Json => println!("{}", render::render_json(&outcome)),
    }
    render::exit_code(&outcome)
}

/// Prints suggestions for partial input.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn suggest(
    manager: &CommandManager<ConsoleSender>,
    sender: Arc<ConsoleSender>,
    args: &SuggestArgs,
) -> Result<i32, CmdTreeError> {
    let suggestions = manager.suggest(sender, &args.input);
    match args.format {
        OutputFormat::Human => {
            for suggestion in &suggestions {
                println!("{suggestion}");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&suggestions)?),
    }
    Ok(ExitCode::SUCCESS)
}

/// Lists the commands the sender may run.
///
/// # Errors
///
/// Returns an error if JSON output cannot be serialized.
pub fn list(
    manager: &CommandManager<ConsoleSender>,
    sender: &ConsoleSender,
    args: &ListArgs,
) -> Result<i32, CmdTreeError> {
    let entries = manager.help(sender);
    match args.format {
        OutputFormat::Human => {
            let width = entries.iter().map(|e| e.syntax.len()).max().unwrap_or(0);
            for entry in &entries {
                match &entry.description {
                    Some(description) => println!("{:<width$}  {description}", entry.syntax),
                    None => println!("{}", entry.syntax),
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(ExitCode::SUCCESS)
}
