//! Duration parser backed by `humantime`.

use std::time::Duration;

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::tokenizer::TokenCursor;
use crate::value::{Value, ValueKind};

use super::{ArgumentParser, require_token};

const UNIT_SUFFIXES: &[&str] = &["s", "m", "h", "d"];

/// Parses a single-token duration such as `30s`, `5m` or `1h30m`.
///
/// A bare integer is read as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParser {
    max: Option<Duration>,
}

impl DurationParser {
    /// Accepts any duration.
    #[must_use]
    pub const fn new() -> Self {
        Self { max: None }
    }

    /// Rejects durations longer than `max`.
    #[must_use]
    pub const fn with_max(mut self, max: Duration) -> Self {
        self.max = Some(max);
        self
    }
}

fn parse_duration(token: &str) -> Option<Duration> {
    if let Ok(secs) = token.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    humantime::parse_duration(token).ok()
}

impl<S> ArgumentParser<S> for DurationParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = require_token(input)?;
        let duration = parse_duration(token).ok_or_else(|| ArgumentParseError::InvalidFormat {
            input: token.to_string(),
            expected: "duration",
        })?;
        if let Some(max) = self.max
            && duration > max
        {
            return Err(ArgumentParseError::OutOfRange {
                input: token.to_string(),
                min: "0s".to_string(),
                max: humantime::format_duration(max).to_string(),
            });
        }
        input.next_token();
        Ok(Value::Duration(duration))
    }

    fn suggestions(&self, _context: &CommandContext<S>, partial: &str) -> Vec<String> {
        if partial.is_empty() || !partial.chars().all(|c| c.is_ascii_digit()) {
            return Vec::new();
        }
        UNIT_SUFFIXES
            .iter()
            .map(|unit| format!("{partial}{unit}"))
            .filter(|candidate| {
                self.max
                    .is_none_or(|max| parse_duration(candidate).is_some_and(|d| d <= max))
            })
            .collect()
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Duration
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
    fn parses_humantime_units() {
        assert_eq!(
            run(&DurationParser::new(), "90s").0,
            Ok(Value::Duration(Duration::from_secs(90)))
        );
        assert_eq!(
            run(&DurationParser::new(), "1h30m").0,
            Ok(Value::Duration(Duration::from_secs(5400)))
        );
    }

    #[test]
    fn bare_integer_is_seconds() {
        assert_eq!(
            run(&DurationParser::new(), "45").0,
            Ok(Value::Duration(Duration::from_secs(45)))
        );
    }

    #[test]
    fn rejects_garbage_and_overlong() {
        assert!(matches!(
            run(&DurationParser::new(), "soon").0,
            Err(ArgumentParseError::InvalidFormat { .. })
        ));
        let capped = DurationParser::new().with_max(Duration::from_secs(60));
        assert!(matches!(
            run(&capped, "2m").0,
            Err(ArgumentParseError::OutOfRange { .. })
        ));
    }

    #[test]
    fn suggests_units_after_digits() {
        let parser = DurationParser::new().with_max(Duration::from_secs(3600));
        assert_eq!(parser.suggestions(&context(), "5"), ["5s", "5m"]);
        assert!(
            ArgumentParser::<()>::suggestions(&DurationParser::new(), &context(), "x").is_empty()
        );
    }
}
