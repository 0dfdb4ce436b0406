//! Fixed-choice parser.

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::tokenizer::TokenCursor;
use crate::value::{Value, ValueKind};

use super::{ArgumentParser, require_token};

/// Accepts one of a fixed set of words and binds the canonical spelling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceParser {
    choices: Vec<String>,
    case_insensitive: bool,
}

impl ChoiceParser {
    /// Creates a case-sensitive choice parser.
    #[must_use]
    pub fn new<I, T>(choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
            case_insensitive: false,
        }
    }

    /// Matches choices ignoring ASCII case.
    #[must_use]
    pub const fn ignore_case(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// The accepted values.
    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    fn find(&self, token: &str) -> Option<&String> {
        self.choices.iter().find(|choice| {
            if self.case_insensitive {
                choice.eq_ignore_ascii_case(token)
            } else {
                choice.as_str() == token
            }
        })
    }
}

impl<S> ArgumentParser<S> for ChoiceParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = require_token(input)?;
        let choice = self
            .find(token)
            .ok_or_else(|| ArgumentParseError::UnknownChoice {
                input: token.to_string(),
                expected: self.choices.clone(),
            })?;
        input.next_token();
        Ok(Value::String(choice.clone()))
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<String> {
        self.choices.clone()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn signature(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }
}
