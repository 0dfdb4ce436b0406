//! Path components shared by the builder and the tree nodes.

use std::fmt;
use std::sync::Arc;

use crate::parser::ArgumentParser;
use crate::value::{Value, ValueKind};

/// A fixed keyword, matched by name or alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralSpec {
    name: String,
    aliases: Vec<String>,
}

impl LiteralSpec {
    /// Creates a literal without aliases.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Primary name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Primary name followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether `token` is this literal's name or one of its aliases.
    #[must_use]
    pub fn matches(&self, token: &str, case_insensitive: bool) -> bool {
        self.names().any(|name| names_equal(name, token, case_insensitive))
    }

    pub(crate) fn add_alias(&mut self, alias: String) {
        self.aliases.push(alias);
    }
}

/// A typed argument slot.
pub struct ArgumentSpec<S> {
    name: String,
    parser: Arc<dyn ArgumentParser<S>>,
    required: bool,
    default: Option<Value>,
}

impl<S> ArgumentSpec<S> {
    /// A required argument.
    #[must_use]
    pub fn required(name: impl Into<String>, parser: Arc<dyn ArgumentParser<S>>) -> Self {
        Self {
            name: name.into(),
            parser,
            required: true,
            default: None,
        }
    }

    /// An optional argument, left unbound when absent.
    #[must_use]
    pub fn optional(name: impl Into<String>, parser: Arc<dyn ArgumentParser<S>>) -> Self {
        Self {
            required: false,
            ..Self::required(name, parser)
        }
    }

    /// An optional argument bound to `default` when absent.
    #[must_use]
    pub fn with_default(
        name: impl Into<String>,
        parser: Arc<dyn ArgumentParser<S>>,
        default: Value,
    ) -> Self {
        Self {
            default: Some(default),
            ..Self::optional(name, parser)
        }
    }

    /// Argument name, used as the binding key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The parser.
    #[must_use]
    pub fn parser(&self) -> &Arc<dyn ArgumentParser<S>> {
        &self.parser
    }

    /// Whether the argument must be supplied.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    /// Value bound when an optional argument is absent.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether the parser consumes the rest of the positional input.
    #[must_use]
    pub fn is_greedy(&self) -> bool {
        self.parser.is_greedy()
    }

    /// Kind of value the parser produces.
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        self.parser.value_kind()
    }

    /// Whether two slots may share a tree node.
    pub(crate) fn is_compatible(&self, other: &Self) -> bool {
        self.name == other.name
            && self.required == other.required
            && self.value_kind() == other.value_kind()
            && self.is_greedy() == other.is_greedy()
            && self.default == other.default
            && self.same_parser(other)
    }

    fn same_parser(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.parser, &other.parser)
            || self
                .parser
                .signature()
                .is_some_and(|signature| other.parser.signature().as_ref() == Some(&signature))
    }
}

impl<S> Clone for ArgumentSpec<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            parser: Arc::clone(&self.parser),
            required: self.required,
            default: self.default.clone(),
        }
    }
}

impl<S> fmt::Debug for ArgumentSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("name", &self.name)
            .field("kind", &self.value_kind())
            .field("required", &self.required)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

/// A named flag. Presence flags carry no parser.
///
/// Long form matches the name or any alias; short form matches
/// single-character aliases.
pub struct FlagSpec<S> {
    name: String,
    aliases: Vec<String>,
    parser: Option<Arc<dyn ArgumentParser<S>>>,
}

impl<S> FlagSpec<S> {
    /// A flag that is either present or absent.
    #[must_use]
    pub fn presence(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            parser: None,
        }
    }

    /// A flag followed by a value.
    #[must_use]
    pub fn valued(name: impl Into<String>, parser: Arc<dyn ArgumentParser<S>>) -> Self {
        Self {
            parser: Some(parser),
            ..Self::presence(name)
        }
    }

    /// Adds an alias. Single-character aliases enable the short form.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Flag name, used as the key in the flag set.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aliases in declaration order.
    #[must_use]
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Name followed by aliases.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Value parser, `None` for presence flags.
    #[must_use]
    pub const fn parser(&self) -> Option<&Arc<dyn ArgumentParser<S>>> {
        self.parser.as_ref()
    }

    /// Whether the flag takes a value.
    #[must_use]
    pub const fn is_valued(&self) -> bool {
        self.parser.is_some()
    }

    /// Whether `name` (prefix removed) selects this flag in long form.
    #[must_use]
    pub fn matches_long(&self, name: &str) -> bool {
        self.names().any(|n| n == name)
    }

    /// Whether `c` selects this flag in short form.
    #[must_use]
    pub fn matches_short(&self, c: char) -> bool {
        self.aliases.iter().any(|alias| {
            let mut chars = alias.chars();
            chars.next() == Some(c) && chars.next().is_none()
        })
    }
}

impl<S> Clone for FlagSpec<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            aliases: self.aliases.clone(),
            parser: self.parser.clone(),
        }
    }
}

impl<S> fmt::Debug for FlagSpec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlagSpec")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("kind", &self.parser.as_ref().map(|p| p.value_kind()))
            .finish()
    }
}

/// One component of a command path, in declaration order.
pub enum PathComponent<S> {
    /// Fixed keyword.
    Literal(LiteralSpec),
    /// Typed argument.
    Argument(ArgumentSpec<S>),
    /// Trailing flag.
    Flag(FlagSpec<S>),
}

impl<S> PathComponent<S> {
    /// Display name of the component.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Literal(l) => l.name(),
            Self::Argument(a) => a.name(),
            Self::Flag(f) => f.name(),
        }
    }
}

impl<S> Clone for PathComponent<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(l) => Self::Literal(l.clone()),
            Self::Argument(a) => Self::Argument(a.clone()),
            Self::Flag(f) => Self::Flag(f.clone()),
        }
    }
}

impl<S> fmt::Debug for PathComponent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(l) => l.fmt(f),
            Self::Argument(a) => a.fmt(f),
            Self::Flag(flag) => flag.fmt(f),
        }
    }
}

pub(crate) fn names_equal(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.to_lowercase() == b.to_lowercase()
    } else {
        a == b
    }
}
