//! Text rendering of outcomes for the console.

use crate::error::{ExecutionError, ExitCode};
use crate::execution::ExecutionOutcome;

/// Renders `outcome` for a terminal. `None` means there is nothing to print.
#[must_use]
pub fn render(outcome: &ExecutionOutcome) -> Option<String> {
    match outcome {
        ExecutionOutcome::Success(serde_json::Value::Null) => None,
        ExecutionOutcome::Success(serde_json::Value::String(text)) => Some(text.clone()),
        ExecutionOutcome::Success(value) => {
            Some(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
        }
        ExecutionOutcome::ArgumentError(err) => Some(format!("invalid input: {err}")),
        ExecutionOutcome::ExecutionFailure(ExecutionError::Handler(cause)) => {
            Some(format!("command failed: {cause}"))
        }
        other => Some(other.to_string()),
    }
}

/// Renders `outcome` as a JSON document.
#[must_use]
pub fn render_json(outcome: &ExecutionOutcome) -> serde_json::Value {
    match outcome {
        ExecutionOutcome::Success(value) => serde_json::json!({
            "outcome": outcome.kind().as_str(),
            "value": value,
        }),
        ExecutionOutcome::ArgumentError(err) => serde_json::json!({
            "outcome": outcome.kind().as_str(),
            "index": err.index,
            "message": err.to_string(),
        }),
        other => serde_json::json!({
            "outcome": other.kind().as_str(),
            "message": other.to_string(),
        }),
    }
}

/// Process exit code for `outcome`.
#[must_use]
pub const fn exit_code(outcome: &ExecutionOutcome) -> i32 {
    match outcome {
        ExecutionOutcome::Success(_) => ExitCode::SUCCESS,
        ExecutionOutcome::ExecutionFailure(_) => ExitCode::EXECUTION_FAILED,
        _ => ExitCode::REJECTED,
    }
}
