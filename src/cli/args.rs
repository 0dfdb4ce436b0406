//! CLI argument definitions.
//!
//! All Clap derive structs for `cmdtree` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::CoordinatorKind;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Command tree engine console.
#[derive(Parser, Debug)]
#[command(name = "cmdtree", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "CMDTREE_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormatArg,

    /// Path to the engine configuration file.
    #[arg(short, long, global = true, env = "CMDTREE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the execution coordinator.
    #[arg(long, global = true)]
    pub coordinator: Option<CoordinatorArg>,

    /// Serve Prometheus metrics on this port.
    #[arg(long, global = true, env = "CMDTREE_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Name of the sender issuing commands.
    #[arg(long = "as", default_value = "console", global = true)]
    pub sender: String,

    /// Permission granted to the sender (repeatable, `*` grants all).
    #[arg(long = "permission", global = true)]
    pub permissions: Vec<String>,

    /// Capability declared by the sender (repeatable).
    #[arg(long = "capability", global = true)]
    pub capabilities: Vec<String>,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read commands from stdin; `?<input>` prints suggestions.
    Console(ConsoleArgs),

    /// Run one command.
    Exec(ExecArgs),

    /// Print suggestions for partial input.
    Suggest(SuggestArgs),

    /// List the commands the sender may run.
    List(ListArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `console`.
#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// Prompt shown before each line.
    #[arg(long, default_value = "> ")]
    pub prompt: String,
}

/// Arguments for `exec`.
#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Command input, e.g. `give bob 5`.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub input: Vec<String>,

    /// Output format for the result.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `suggest`.
#[derive(Args, Debug)]
pub struct SuggestArgs {
    /// Partial input; a trailing space completes a new token.
    #[arg(allow_hyphen_values = true, default_value = "")]
    pub input: String,

    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `version`.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Value Enums
// ============================================================================

/// Color output control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for listings and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// JSON.
    Json,
}

/// Log format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormatArg {
    /// Human-readable logs.
    #[default]
    Human,
    /// Newline-delimited JSON logs.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Human => Self::Human,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Coordinator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CoordinatorArg {
    /// Run handlers on the calling thread.
    Inline,
    /// Run handlers on the tokio runtime.
    Concurrent,
}

impl From<CoordinatorArg> for CoordinatorKind {
    fn from(arg: CoordinatorArg) -> Self {
        match arg {
            CoordinatorArg::Inline => Self::Inline,
            CoordinatorArg::Concurrent => Self::Concurrent,
        }
    }
}
