//! String parsers.

use regex::Regex;

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::tokenizer::TokenCursor;
use crate::value::{Value, ValueKind};

use super::{ArgumentParser, require_token};

/// How many tokens a [`StringParser`] consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringMode {
    /// Exactly one token.
    #[default]
    Single,
    /// One token, or a `"double quoted"` run of tokens.
    Quoted,
    /// Every remaining token up to the first flag.
    Greedy,
}

/// Parses free text.
#[derive(Debug, Clone, Default)]
pub struct StringParser {
    mode: StringMode,
    suggestions: Vec<String>,
}

impl StringParser {
    /// Single-token string.
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    /// Single token or double-quoted phrase.
    #[must_use]
    pub fn quoted() -> Self {
        Self {
            mode: StringMode::Quoted,
            ..Self::default()
        }
    }

    /// Rest of the input, stopping at the first flag.
    #[must_use]
    pub fn greedy() -> Self {
        Self {
            mode: StringMode::Greedy,
            ..Self::default()
        }
    }

    /// Offers a fixed list of completions without restricting input.
    #[must_use]
    pub fn with_suggestions<I, T>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    /// The consumption mode.
    #[must_use]
    pub const fn mode(&self) -> StringMode {
        self.mode
    }
}

/// Whether `body` ends with a closing quote that is not escaped.
fn closes_quote(body: &str) -> bool {
    let Some(before) = body.strip_suffix('"') else {
        return false;
    };
    let backslashes = before.chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 0
}

fn parse_quoted(input: &mut TokenCursor<'_>) -> Result<Value, ArgumentParseError> {
    let first = require_token(input)?;
    if !first.starts_with('"') {
        input.next_token();
        return Ok(Value::String(first.to_string()));
    }

    let remaining = input.remaining();
    let end = remaining
        .iter()
        .enumerate()
        .position(|(offset, token)| {
            let body = if offset == 0 {
                token.strip_prefix('"').unwrap_or(token.as_str())
            } else {
                token.as_str()
            };
            closes_quote(body)
        })
        .ok_or(ArgumentParseError::UnterminatedQuote)?;

    let joined = remaining[..=end].join(" ");
    let mut words = shlex::split(&joined).ok_or(ArgumentParseError::UnterminatedQuote)?;
    if words.len() != 1 {
        return Err(ArgumentParseError::InvalidFormat {
            input: joined,
            expected: "quoted string",
        });
    }
    for _ in 0..=end {
        input.next_token();
    }
    Ok(Value::String(words.remove(0)))
}

fn parse_greedy(input: &mut TokenCursor<'_>) -> Result<Value, ArgumentParseError> {
    let mut words = Vec::new();
    while !input.peek_is_flag() {
        match input.next_token() {
            Some(token) => words.push(token),
            None => break,
        }
    }
    if words.is_empty() {
        return Err(ArgumentParseError::NoInput);
    }
    Ok(Value::String(words.join(" ")))
}

impl<S> ArgumentParser<S> for StringParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        match self.mode {
            StringMode::Single => {
                let token = require_token(input)?;
                input.next_token();
                Ok(Value::String(token.to_string()))
            }
            StringMode::Quoted => parse_quoted(input),
            StringMode::Greedy => parse_greedy(input),
        }
    }

    fn suggestions(&self, _context: &CommandContext<S>, _partial: &str) -> Vec<String> {
        self.suggestions.clone()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn signature(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }

    fn is_greedy(&self) -> bool {
        self.mode == StringMode::Greedy
    }
}

/// Single-token string that must fully match a regular expression.
#[derive(Debug, Clone)]
pub struct RegexParser {
    regex: Regex,
    pattern: String,
}

impl RegexParser {
    /// Compiles `pattern`. The whole token must match, not a substring.
    ///
    /// # Errors
    ///
    /// Returns the compilation error when `pattern` is not a valid regex.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
            pattern: pattern.to_string(),
        })
    }

    /// The pattern as given.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl<S> ArgumentParser<S> for RegexParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = require_token(input)?;
        if !self.regex.is_match(token) {
            return Err(ArgumentParseError::PatternMismatch {
                input: token.to_string(),
                pattern: self.pattern.clone(),
            });
        }
        input.next_token();
        Ok(Value::String(token.to_string()))
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn signature(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::test_support::run;

    #[test]
    fn single_takes_one_token() {
        let (result, consumed) = run(&StringParser::single(), "bob 5");
        assert_eq!(result, Ok(Value::from("bob")));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn quoted_joins_until_closing_quote() {
        let (result, consumed) = run(&StringParser::quoted(), r#""hello big world" next"#);
        assert_eq!(result, Ok(Value::from("hello big world")));
        assert_eq!(consumed, 3);
    }

    #[test]
    fn quoted_single_token_and_escapes() {
        let (result, consumed) = run(&StringParser::quoted(), r#""one" two"#);
        assert_eq!(result, Ok(Value::from("one")));
        assert_eq!(consumed, 1);

        let (result, _) = run(&StringParser::quoted(), r#""say \"hi\" now""#);
        assert_eq!(result, Ok(Value::from(r#"say "hi" now"#)));
    }

    #[test]
    fn quoted_without_quote_is_single_token() {
        let (result, consumed) = run(&StringParser::quoted(), "plain words");
        assert_eq!(result, Ok(Value::from("plain")));
        assert_eq!(consumed, 1);
    }

    #[test]
    fn unterminated_quote_is_rejected_without_consuming() {
        let (result, consumed) = run(&StringParser::quoted(), r#""never closed"#);
        assert_eq!(result, Err(ArgumentParseError::UnterminatedQuote));
        assert_eq!(consumed, 0);
    }

    #[test]
    fn greedy_stops_at_flags() {
        let parser = StringParser::greedy();
        let (result, consumed) = run(&parser, "hello there --silent");
        assert_eq!(result, Ok(Value::from("hello there")));
        assert_eq!(consumed, 2);
        assert!(ArgumentParser::<()>::is_greedy(&parser));

        let (result, _) = run(&parser, "--silent");
        assert_eq!(result, Err(ArgumentParseError::NoInput));
    }

    #[test]
    fn greedy_keeps_negative_numbers() {
        let (result, consumed) = run(&StringParser::greedy(), "x -5 y");
        assert_eq!(result, Ok(Value::from("x -5 y")));
        assert_eq!(consumed, 3);
    }

    #[test]
    fn regex_requires_full_match() {
        let parser = RegexParser::new("[a-z]+").unwrap();
        let (result, _) = run(&parser, "abc");
        assert_eq!(result, Ok(Value::from("abc")));
        let (result, consumed) = run(&parser, "abc1");
        assert_eq!(
            result,
            Err(ArgumentParseError::PatternMismatch {
                input: "abc1".to_string(),
                pattern: "[a-z]+".to_string()
            })
        );
        assert_eq!(consumed, 0);
    }

    #[test]
    fn invalid_regex_fails_to_build() {
        assert!(RegexParser::new("(").is_err());
    }
}
