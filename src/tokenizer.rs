//! Input tokenization and the token cursor consumed by argument parsers.
//!
//! Raw input is split on whitespace. Suggestion-mode tokenization keeps a
//! trailing partial token (empty when the input ends in whitespace) so the
//! suggestion walk always knows which token is being completed.

use std::ops::Deref;
use std::sync::Arc;

/// How flag tokens are recognized.
///
/// A token is flag-shaped when it starts with the long prefix (`--silent`)
/// or the short prefix (`-s`) and the character right after the prefix is
/// alphabetic, so `-5` stays a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSyntax {
    long: String,
    short: String,
}

/// A flag-shaped token with its prefix removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagToken<'a> {
    /// `--name`
    Long(&'a str),
    /// `-n` or a cluster such as `-sf`
    Short(&'a str),
}

impl Default for FlagSyntax {
    fn default() -> Self {
        Self::new("--", "-")
    }
}

impl FlagSyntax {
    /// Creates a flag syntax with the given prefixes.
    #[must_use]
    pub fn new(long: impl Into<String>, short: impl Into<String>) -> Self {
        Self {
            long: long.into(),
            short: short.into(),
        }
    }

    /// Long flag prefix, e.g. `--`.
    #[must_use]
    pub fn long_prefix(&self) -> &str {
        &self.long
    }

    /// Short flag prefix, e.g. `-`.
    #[must_use]
    pub fn short_prefix(&self) -> &str {
        &self.short
    }

    /// Classifies `token`, returning `None` when it is not flag-shaped.
    #[must_use]
    pub fn classify<'a>(&self, token: &'a str) -> Option<FlagToken<'a>> {
        let starts_alpha = |s: &str| s.chars().next().is_some_and(char::is_alphabetic);
        if let Some(rest) = token.strip_prefix(self.long.as_str()) {
            if starts_alpha(rest) {
                return Some(FlagToken::Long(rest));
            }
            return None;
        }
        token
            .strip_prefix(self.short.as_str())
            .filter(|rest| starts_alpha(rest))
            .map(FlagToken::Short)
    }

    /// Whether `token` is flag-shaped.
    #[must_use]
    pub fn is_flag(&self, token: &str) -> bool {
        self.classify(token).is_some()
    }

    /// Renders the long form of a flag name, e.g. `--silent`.
    #[must_use]
    pub fn render_long(&self, name: &str) -> String {
        format!("{}{name}", self.long)
    }
}

/// Splits raw input into tokens.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    command_prefix: Option<String>,
}

impl Tokenizer {
    /// Creates a tokenizer that strips `command_prefix` (such as `/`) from
    /// the start of the input when present.
    #[must_use]
    pub fn new(command_prefix: Option<String>) -> Self {
        Self {
            command_prefix: command_prefix.filter(|p| !p.is_empty()),
        }
    }

    fn strip<'a>(&self, input: &'a str) -> &'a str {
        let input = input.trim_start();
        match &self.command_prefix {
            Some(prefix) => input.strip_prefix(prefix.as_str()).unwrap_or(input),
            None => input,
        }
    }

    /// Tokenizes input for dispatch.
    #[must_use]
    pub fn tokenize(&self, input: &str) -> TokenSequence {
        TokenSequence::new(
            self.strip(input)
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        )
    }

    /// Tokenizes input for suggestions. The last token is always the partial
    /// token being completed.
    #[must_use]
    pub fn tokenize_partial(&self, input: &str) -> TokenSequence {
        let stripped = self.strip(input);
        let mut tokens: Vec<String> = stripped.split_whitespace().map(str::to_string).collect();
        if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
            tokens.push(String::new());
        }
        TokenSequence::new(tokens)
    }
}

/// An immutable, cheaply clonable token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSequence(Arc<[String]>);

impl TokenSequence {
    /// Wraps a token list.
    #[must_use]
    pub fn new(tokens: Vec<String>) -> Self {
        Self(tokens.into())
    }

    /// All tokens except the last one.
    #[must_use]
    pub fn complete(&self) -> &[String] {
        self.0.split_last().map_or(&[], |(_, rest)| rest)
    }

    /// The last token, treated as partial input during suggestion.
    #[must_use]
    pub fn partial(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }
}

impl Deref for TokenSequence {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

/// Read position over a token slice.
///
/// Parsers advance the cursor past the tokens they consume. The walker only
/// commits the new position when the parser succeeds.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [String],
    position: usize,
    flags: &'a FlagSyntax,
}

impl<'a> TokenCursor<'a> {
    /// Creates a cursor over `tokens` starting at `position`.
    #[must_use]
    pub const fn new(tokens: &'a [String], position: usize, flags: &'a FlagSyntax) -> Self {
        Self {
            tokens,
            position,
            flags,
        }
    }

    /// Index of the next unread token.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The next token without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// Consumes and returns the next token.
    pub fn next_token(&mut self) -> Option<&'a str> {
        let token = self.peek()?;
        self.position += 1;
        Some(token)
    }

    /// Whether the next token is flag-shaped.
    #[must_use]
    pub fn peek_is_flag(&self) -> bool {
        self.peek().is_some_and(|t| self.flags.is_flag(t))
    }

    /// Unread tokens.
    #[must_use]
    pub fn remaining(&self) -> &'a [String] {
        self.tokens.get(self.position..).unwrap_or(&[])
    }

    /// Whether every token has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// The flag syntax in effect.
    #[must_use]
    pub const fn flag_syntax(&self) -> &'a FlagSyntax {
        self.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn tokenize_splits_on_any_whitespace() {
        let t = Tokenizer::default().tokenize("  give\tbob   5 ");
        assert_eq!(&*t, toks(&["give", "bob", "5"]).as_slice());
    }

    #[test]
    fn tokenize_strips_command_prefix_once() {
        let t = Tokenizer::new(Some("/".to_string())).tokenize("/tp /home");
        assert_eq!(&*t, toks(&["tp", "/home"]).as_slice());
    }

    #[test]
    fn partial_tokenization_adds_empty_token_after_space() {
        let t = Tokenizer::default().tokenize_partial("give ");
        assert_eq!(&*t, toks(&["give", ""]).as_slice());
        assert_eq!(t.partial(), "");
        assert_eq!(t.complete(), toks(&["give"]).as_slice());
    }

    #[test]
    fn partial_tokenization_keeps_partial_word() {
        let t = Tokenizer::default().tokenize_partial("give bo");
        assert_eq!(t.partial(), "bo");
        assert_eq!(t.complete().len(), 1);
    }

    #[test]
    fn partial_tokenization_of_empty_input() {
        let t = Tokenizer::default().tokenize_partial("");
        assert_eq!(&*t, toks(&[""]).as_slice());
        assert!(t.complete().is_empty());
    }

    #[test]
    fn flag_syntax_classifies_tokens() {
        let syntax = FlagSyntax::default();
        assert_eq!(syntax.classify("--silent"), Some(FlagToken::Long("silent")));
        assert_eq!(syntax.classify("-sf"), Some(FlagToken::Short("sf")));
        assert_eq!(syntax.classify("-5"), None);
        assert_eq!(syntax.classify("--"), None);
        assert_eq!(syntax.classify("---x"), None);
        assert_eq!(syntax.classify("bob"), None);
    }

    #[test]
    fn custom_flag_prefixes() {
        let syntax = FlagSyntax::new("/", "+");
        assert!(syntax.is_flag("/silent"));
        assert!(syntax.is_flag("+s"));
        assert!(!syntax.is_flag("--silent"));
        assert_eq!(syntax.render_long("silent"), "/silent");
    }

    #[test]
    fn cursor_consumes_in_order() {
        let tokens = toks(&["a", "--b", "c"]);
        let syntax = FlagSyntax::default();
        let mut cursor = TokenCursor::new(&tokens, 0, &syntax);
        assert_eq!(cursor.next_token(), Some("a"));
        assert!(cursor.peek_is_flag());
        assert_eq!(cursor.remaining().len(), 2);
        cursor.next_token();
        cursor.next_token();
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.next_token(), None);
        assert_eq!(cursor.position(), 3);
    }
}
