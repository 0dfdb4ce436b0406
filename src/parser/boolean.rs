//! Boolean parser.

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::tokenizer::TokenCursor;
use crate::value::{Value, ValueKind};

use super::{ArgumentParser, require_token};

const STRICT_TRUE: &[&str] = &["true"];
const STRICT_FALSE: &[&str] = &["false"];
const LIBERAL_TRUE: &[&str] = &["true", "yes", "on"];
const LIBERAL_FALSE: &[&str] = &["false", "no", "off"];

/// Parses `true`/`false`, case-insensitively.
///
/// Liberal mode also accepts `yes`/`no` and `on`/`off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BooleanParser {
    liberal: bool,
}

impl BooleanParser {
    /// Accepts only `true` and `false`.
    #[must_use]
    pub const fn strict() -> Self {
        Self { liberal: false }
    }

    /// Also accepts `yes`/`no` and `on`/`off`.
    #[must_use]
    pub const fn liberal() -> Self {
        Self { liberal: true }
    }

    const fn words(self) -> (&'static [&'static str], &'static [&'static str]) {
        if self.liberal {
            (LIBERAL_TRUE, LIBERAL_FALSE)
        } else {
            (STRICT_TRUE, STRICT_FALSE)
        }
    }
}

impl<S> ArgumentParser<S> for BooleanParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = require_token(input)?;
        let (yes, no) = self.words();
        let matches = |words: &[&str]| words.iter().any(|w| w.eq_ignore_ascii_case(token));
        let value = if matches(yes) {
            true
        } else if matches(no) {
            false
        } else {
            return Err(ArgumentParseError::InvalidFormat {
                input: token.to_string(),
                expected: "boolean",
            });
        };
        input.next_token();
        Ok(Value::Bool(value))
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<String> {
        let (yes, no) = self.words();
        yes.iter().chain(no).map(ToString::to_string).collect()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn signature(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::{context, run};

    #[test]
    fn strict_accepts_true_false_only() {
        assert_eq!(run(&BooleanParser::strict(), "TRUE").0, Ok(Value::Bool(true)));
        assert_eq!(run(&BooleanParser::strict(), "false").0, Ok(Value::Bool(false)));
        assert!(run(&BooleanParser::strict(), "yes").0.is_err());
    }

    #[test]
    fn liberal_accepts_yes_no_on_off() {
        assert_eq!(run(&BooleanParser::liberal(), "yes").0, Ok(Value::Bool(true)));
        assert_eq!(run(&BooleanParser::liberal(), "Off").0, Ok(Value::Bool(false)));
    }

    #[test]
    fn suggestions_list_accepted_words() {
        let suggestions = BooleanParser::liberal().suggestions(&context(), "");
        assert_eq!(suggestions, ["true", "yes", "on", "false", "no", "off"]);
    }
}
