//! Argument parsers.
//!
//! An [`ArgumentParser`] consumes tokens from a [`TokenCursor`] and turns
//! them into a [`Value`], or fails with a classified
//! [`ArgumentParseError`]. Parsers also offer completions for a partial
//! token. They must be deterministic and free of side effects: the suggestion
//! walk runs them speculatively against the same tree used for dispatch.

pub mod boolean;
pub mod choice;
pub mod duration;
pub mod numeric;
pub mod string;

pub use boolean::BooleanParser;
pub use choice::ChoiceParser;
pub use duration::DurationParser;
pub use numeric::{FloatParser, IntegerParser};
pub use string::{RegexParser, StringMode, StringParser};

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::tokenizer::TokenCursor;
use crate::value::{Value, ValueKind};

/// Parses one argument from the token stream.
///
/// `S` is the sender type, available through the context for parsers whose
/// accepted values depend on who is asking.
pub trait ArgumentParser<S>: Send + Sync {
    /// Consumes one or more tokens and produces a value.
    ///
    /// On failure the walker discards any cursor movement.
    ///
    /// # Errors
    ///
    /// Returns an [`ArgumentParseError`] describing why the input was rejected.
    fn parse(
        &self,
        context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError>;

    /// Candidate completions for `partial`. Results are filtered afterwards,
    /// so returning every candidate is fine.
    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<String> {
        Vec::new()
    }

    /// Kind of value this parser produces.
    fn value_kind(&self) -> ValueKind;

    /// Whether the parser consumes all remaining positional tokens.
    fn is_greedy(&self) -> bool {
        false
    }

    /// Describes the parser's configuration.
    ///
    /// Two registrations share an argument node only when their parsers are
    /// the same instance or report equal signatures. `None` restricts sharing
    /// to the same instance.
    fn signature(&self) -> Option<String> {
        None
    }
}

/// Takes the next token or fails with [`ArgumentParseError::NoInput`].
pub(crate) fn require_token<'a>(input: &TokenCursor<'a>) -> Result<&'a str, ArgumentParseError> {
    input.peek().ok_or(ArgumentParseError::NoInput)
}
