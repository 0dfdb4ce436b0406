//! Error types for `cmdtree`
//!
//! Registration failures, per-token parse failures, handler failures and
//! configuration errors each get their own enum; [`CmdTreeError`] aggregates
//! the ones that can escape to an integrator or the CLI.

use std::path::PathBuf;
use thiserror::Error;

use crate::value::ValueKind;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for the `cmdtree` console binary.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// The command tree could not be built
    pub const CONSTRUCTION_ERROR: i32 = 4;

    /// The input was rejected before execution (unknown command, bad argument, denied)
    pub const REJECTED: i32 = 5;

    /// The command handler failed
    pub const EXECUTION_FAILED: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `cmdtree` operations.
///
/// Dispatch-time failures are not part of this enum: they are reported as
/// values inside [`ExecutionOutcome`](crate::execution::ExecutionOutcome).
#[derive(Debug, Error)]
pub enum CmdTreeError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Command registration error
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CmdTreeError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Construction(_) => ExitCode::CONSTRUCTION_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Construction Errors
// ============================================================================

/// Errors raised while registering a command into a
/// [`CommandTree`](crate::tree::CommandTree).
///
/// A failed registration leaves the tree exactly as it was.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConstructionError {
    /// The command path has no components
    #[error("command path is empty")]
    EmptyPath,

    /// The first component of a path is not a literal
    #[error("command '{name}' must start with a literal")]
    InvalidRoot {
        /// Name of the offending first component
        name: String,
    },

    /// A literal, argument or flag name is unusable
    #[error("invalid name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Two sibling literals share a name or alias
    #[error("literal '{name}' conflicts with existing sibling '{existing}'")]
    LiteralConflict {
        /// The name or alias being registered
        name: String,
        /// The sibling literal it collides with
        existing: String,
    },

    /// A literal or required argument follows an optional argument
    #[error("'{component}' cannot follow optional argument '{optional}'")]
    RequiredAfterOptional {
        /// The required component
        component: String,
        /// The optional argument preceding it
        optional: String,
    },

    /// A positional component follows a greedy argument
    #[error("'{component}' cannot follow greedy argument '{greedy}'")]
    GreedyNotLast {
        /// The trailing component
        component: String,
        /// The greedy argument
        greedy: String,
    },

    /// A positional component follows a flag
    #[error("'{component}' cannot follow flag '{flag}'; flags must be trailing")]
    FlagNotTrailing {
        /// The positional component
        component: String,
        /// The flag preceding it
        flag: String,
    },

    /// A parent would gain a second, different argument child
    #[error("argument '{new}' is ambiguous with sibling argument '{existing}' under '{parent}'")]
    AmbiguousArgument {
        /// Display name of the parent node
        parent: String,
        /// The argument already registered
        existing: String,
        /// The argument being registered
        new: String,
    },

    /// The same argument name appears twice in one command
    #[error("argument '{name}' appears more than once")]
    DuplicateArgument {
        /// Repeated argument name
        name: String,
    },

    /// The same flag name or alias appears twice in one command
    #[error("flag '{name}' is declared more than once")]
    DuplicateFlag {
        /// Repeated flag name or alias
        name: String,
    },

    /// Flags on one command would hide flags of another reached only
    /// through optional arguments
    #[error("flags of '{syntax}' conflict with flags registered on '{owner}'")]
    ShadowedFlags {
        /// Syntax of the command being registered
        syntax: String,
        /// Display name of the node whose flags overlap the new command's
        owner: String,
    },

    /// A command is already registered on the terminal node
    #[error("a command is already registered for '{syntax}'")]
    DuplicateCommand {
        /// Syntax of the command being registered
        syntax: String,
    },

    /// An optional argument default does not match the parser's value kind
    #[error("default for '{argument}' is {actual}, parser produces {expected}")]
    DefaultTypeMismatch {
        /// The optional argument
        argument: String,
        /// Kind produced by the parser
        expected: ValueKind,
        /// Kind of the supplied default
        actual: ValueKind,
    },
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Failure reported by an [`ArgumentParser`](crate::parser::ArgumentParser).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ArgumentParseError {
    /// The cursor had no token left
    #[error("no input provided")]
    NoInput,

    /// The token is not a valid value of the expected type
    #[error("'{input}' is not a valid {expected}")]
    InvalidFormat {
        /// Offending input
        input: String,
        /// Human-readable expected type
        expected: &'static str,
    },

    /// The value parsed but lies outside the accepted range
    #[error("'{input}' is not in the range [{min}, {max}]")]
    OutOfRange {
        /// Offending input
        input: String,
        /// Lower bound, rendered
        min: String,
        /// Upper bound, rendered
        max: String,
    },

    /// The token is not one of the accepted choices
    #[error("'{input}' is not one of: {}", expected.join(", "))]
    UnknownChoice {
        /// Offending input
        input: String,
        /// Accepted values
        expected: Vec<String>,
    },

    /// The token does not match the required pattern
    #[error("'{input}' does not match {pattern}")]
    PatternMismatch {
        /// Offending input
        input: String,
        /// The pattern, rendered
        pattern: String,
    },

    /// A quoted string was opened but never closed
    #[error("unterminated quoted string")]
    UnterminatedQuote,

    /// Parser-specific failure
    #[error("{0}")]
    Custom(String),
}

/// What went wrong at a specific token during resolution.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An argument parser rejected the input
    #[error("invalid value for '{argument}': {source}")]
    Argument {
        /// Argument name
        argument: String,
        /// Parser failure
        #[source]
        source: ArgumentParseError,
    },

    /// Input ended before a required argument
    #[error("missing required argument '{argument}'")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// The token matched none of the expected literals
    #[error("invalid syntax, expected: {expected}")]
    InvalidSyntax {
        /// Rendered expected syntax
        expected: String,
    },

    /// Input continued past a complete command
    #[error("unexpected token '{token}'")]
    UnexpectedToken {
        /// The extra token
        token: String,
    },

    /// A flag-shaped token names no flag of the command
    #[error("unknown flag '{flag}'")]
    UnknownFlag {
        /// The unrecognized flag token
        flag: String,
    },

    /// A flag was given twice
    #[error("flag '{flag}' given more than once")]
    DuplicateFlag {
        /// Flag name
        flag: String,
    },

    /// A valued flag had no value after it
    #[error("flag '{flag}' requires a value")]
    MissingFlagValue {
        /// Flag name
        flag: String,
    },

    /// A parser reported success without consuming input
    #[error("parser for '{argument}' consumed no input")]
    NoProgress {
        /// Argument name
        argument: String,
    },
}

/// A parse failure pinned to the index of the offending token.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("at token {index}: {kind}")]
pub struct ParseError {
    /// Zero-based index into the token sequence
    pub index: usize,
    /// Classified failure
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Creates a parse error at `index`.
    #[must_use]
    pub const fn new(index: usize, kind: ParseErrorKind) -> Self {
        Self { index, kind }
    }
}

// ============================================================================
// Context Errors
// ============================================================================

/// Lookup failures on a [`CommandContext`](crate::context::CommandContext).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// No value is bound under the name
    #[error("missing argument '{name}'")]
    Missing {
        /// Requested name
        name: String,
    },

    /// A value is bound but has another type
    #[error("argument '{name}' is {actual}, not {expected}")]
    TypeMismatch {
        /// Requested name
        name: String,
        /// Requested Rust type
        expected: &'static str,
        /// Kind of the bound value
        actual: ValueKind,
    },

    /// A binding was written twice during parsing
    #[error("argument '{name}' is already bound")]
    AlreadyBound {
        /// Name bound twice
        name: String,
    },
}

// ============================================================================
// Execution Errors
// ============================================================================

/// Boxed error returned by command handlers.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a dispatched command did not complete successfully.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The handler returned an error
    #[error("command failed: {0}")]
    Handler(#[source] HandlerError),

    /// The handler panicked
    #[error("command panicked: {0}")]
    Panicked(String),

    /// The caller cancelled the pending execution
    #[error("command execution was cancelled")]
    Cancelled,

    /// The coordinator's execution timeout elapsed
    #[error("command timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// The worker dropped the result channel without reporting
    #[error("command worker stopped without reporting a result")]
    WorkerLost,
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", format_issues(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("{path} is {size} bytes (limit: {limit})")]
    TooLarge {
        /// Path to the configuration file
        path: PathBuf,
        /// Actual size in bytes
        size: u64,
        /// Limit in bytes
        limit: u64,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "`flag_prefix`")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents configuration from being used
    Error,
    /// Warning - potential issue that does not prevent configuration loading
    Warning,
}

// ============================================================================
// Result Type Alias
// ============================================================================

/// Result type alias for `cmdtree` operations.
pub type Result<T> = std::result::Result<T, CmdTreeError>;

// ============================================================================
// Tests
// ============================================================================
