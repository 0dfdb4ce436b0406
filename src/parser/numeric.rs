//! Integer and floating point parsers.

use std::collections::BTreeSet;

use crate::context::CommandContext;
use crate::error::ArgumentParseError;
use crate::tokenizer::TokenCursor;
use crate::value::{Value, ValueKind};

use super::{ArgumentParser, require_token};

/// How many "append a digit" continuations to suggest.
const MAX_SUGGESTION_INCREMENT: i64 = 10;

/// Parses a signed 64-bit integer within an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerParser {
    min: i64,
    max: i64,
}

impl Default for IntegerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerParser {
    /// Accepts any `i64`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// Accepts values in `min..=max`.
    #[must_use]
    pub const fn range(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Sets the lower bound.
    #[must_use]
    pub const fn with_min(mut self, min: i64) -> Self {
        self.min = min;
        self
    }

    /// Sets the upper bound.
    #[must_use]
    pub const fn with_max(mut self, max: i64) -> Self {
        self.max = max;
        self
    }

    /// Lower bound.
    #[must_use]
    pub const fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound.
    #[must_use]
    pub const fn max(&self) -> i64 {
        self.max
    }
}

/// Suggests the typed number and the numbers reachable by appending one
/// more digit, keeping the sign and staying inside `min..=max`.
///
/// An empty input or a lone `-` counts as zero. Non-numeric input yields no
/// suggestions.
#[must_use]
pub fn integer_suggestions(min: i64, max: i64, input: &str) -> Vec<String> {
    let negative = input.starts_with('-');
    let parsed = if input.is_empty() || input == "-" {
        Some(0)
    } else {
        input.parse::<i64>().ok()
    };
    let Some(value) = parsed else {
        return Vec::new();
    };

    let magnitude = value.unsigned_abs();
    let mut numbers = BTreeSet::new();
    numbers.insert(magnitude);
    for digit in 0..MAX_SUGGESTION_INCREMENT {
        let Some(shifted) = value.checked_mul(10).and_then(|v| v.checked_add(digit)) else {
            break;
        };
        if shifted > max {
            break;
        }
        if let Some(next) = magnitude
            .checked_mul(10)
            .and_then(|m| m.checked_add(digit.unsigned_abs()))
        {
            numbers.insert(next);
        }
    }

    numbers
        .into_iter()
        .filter_map(|n| {
            let n = i64::try_from(n).ok()?;
            Some(if negative { -n } else { n })
        })
        .filter(|n| (min..=max).contains(n))
        .map(|n| n.to_string())
        .collect()
}

impl<S> ArgumentParser<S> for IntegerParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = require_token(input)?;
        let value: i64 = token
            .parse()
            .map_err(|_| ArgumentParseError::InvalidFormat {
                input: token.to_string(),
                expected: "integer",
            })?;
        if !(self.min..=self.max).contains(&value) {
            return Err(ArgumentParseError::OutOfRange {
                input: token.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }
        input.next_token();
        Ok(Value::Integer(value))
    }

    fn suggestions(&self, _context: &CommandContext<S>, partial: &str) -> Vec<String> {
        integer_suggestions(self.min, self.max, partial)
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Integer
    }

    fn signature(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }
}

/// Parses a finite `f64` within an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatParser {
    min: f64,
    max: f64,
}

impl Default for FloatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatParser {
    /// Accepts any finite `f64`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min: f64::MIN,
            max: f64::MAX,
        }
    }

    /// Accepts values in `min..=max`.
    #[must_use]
    pub const fn range(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl<S> ArgumentParser<S> for FloatParser {
    fn parse(
        &self,
        _context: &CommandContext<S>,
        input: &mut TokenCursor<'_>,
    ) -> Result<Value, ArgumentParseError> {
        let token = require_token(input)?;
        let value: f64 = token
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| ArgumentParseError::InvalidFormat {
                input: token.to_string(),
                expected: "number",
            })?;
        if value < self.min || value > self.max {
            return Err(ArgumentParseError::OutOfRange {
                input: token.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            });
        }
        input.next_token();
        Ok(Value::Float(value))
    }

    fn value_kind(&self) -> ValueKind {
        ValueKind::Float
    }

    fn signature(&self) -> Option<String> {
        Some(format!("{self:?}"))
    }
}
