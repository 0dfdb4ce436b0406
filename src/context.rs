//! Per-invocation command context.
//!
//! A [`CommandContext`] is created fresh for every resolution attempt. The
//! walker writes argument and flag bindings into it exactly once per name;
//! once resolution finishes, handlers and suggestion providers only read
//! them. The side store is the one mutable area, for state handlers want to
//! share during an invocation.

use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;

use crate::error::ContextError;
use crate::execution::ExecutionId;
use crate::tokenizer::TokenSequence;
use crate::value::{FromValue, Value};

/// Flags present on an invocation.
///
/// Presence flags are stored without a value.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    flags: IndexMap<String, Option<Value>>,
}

impl FlagSet {
    /// Whether the flag `name` was given.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// The value of a valued flag.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Missing`] when the flag is absent or carries no
    /// value, and [`ContextError::TypeMismatch`] when the value has another type.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ContextError> {
        let value = self
            .value(name)
            .ok_or_else(|| ContextError::Missing {
                name: name.to_string(),
            })?;
        convert(name, value)
    }

    /// The raw value of a valued flag.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.flags.get(name).and_then(Option::as_ref)
    }

    /// Names of the given flags, in input order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Number of flags given.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no flag was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub(crate) fn set(&mut self, name: &str, value: Option<Value>) -> Result<(), ContextError> {
        if self.flags.contains_key(name) {
            return Err(ContextError::AlreadyBound {
                name: name.to_string(),
            });
        }
        self.flags.insert(name.to_string(), value);
        Ok(())
    }
}

/// Everything a handler or parser knows about one invocation.
#[derive(Debug)]
pub struct CommandContext<S> {
    sender: Arc<S>,
    tokens: TokenSequence,
    arguments: IndexMap<String, Value>,
    flags: FlagSet,
    store: DashMap<String, serde_json::Value>,
    execution_id: Option<ExecutionId>,
    suggesting: bool,
}

impl<S> CommandContext<S> {
    /// Creates an empty context for `sender` over `tokens`.
    #[must_use]
    pub fn new(sender: Arc<S>, tokens: TokenSequence) -> Self {
        Self {
            sender,
            tokens,
            arguments: IndexMap::new(),
            flags: FlagSet::default(),
            store: DashMap::new(),
            execution_id: None,
            suggesting: false,
        }
    }

    /// Creates a context used only to compute suggestions.
    #[must_use]
    pub fn for_suggestions(sender: Arc<S>, tokens: TokenSequence) -> Self {
        Self {
            suggesting: true,
            ..Self::new(sender, tokens)
        }
    }

    /// The sender that issued the command.
    #[must_use]
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Shared handle to the sender.
    #[must_use]
    pub const fn sender_handle(&self) -> &Arc<S> {
        &self.sender
    }

    /// The tokenized input.
    #[must_use]
    pub const fn tokens(&self) -> &TokenSequence {
        &self.tokens
    }

    /// Reads the argument `name` as `T`.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Missing`] when nothing is bound under `name`
    /// and [`ContextError::TypeMismatch`] when the value has another type.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T, ContextError> {
        let value = self
            .arguments
            .get(name)
            .ok_or_else(|| ContextError::Missing {
                name: name.to_string(),
            })?;
        convert(name, value)
    }

    /// Reads the argument `name`, falling back to `default` when it is absent
    /// or has another type.
    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    /// The raw value bound under `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    /// Whether an argument is bound under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.arguments.contains_key(name)
    }

    /// Bound arguments in parse order.
    pub fn arguments(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.arguments.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bound arguments as a JSON object, in parse order.
    #[must_use]
    pub fn arguments_json(&self) -> serde_json::Value {
        self.arguments
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<serde_json::Map<_, _>>()
            .into()
    }

    /// Flags given on the invocation.
    #[must_use]
    pub const fn flags(&self) -> &FlagSet {
        &self.flags
    }

    /// Stores `value` under `key` in the side store, returning the previous value.
    pub fn put(&self, key: impl Into<String>, value: serde_json::Value) -> Option<serde_json::Value> {
        self.store.insert(key.into(), value)
    }

    /// Reads `key` from the side store.
    #[must_use]
    pub fn fetch(&self, key: &str) -> Option<serde_json::Value> {
        self.store.get(key).map(|entry| entry.value().clone())
    }

    /// Identifier assigned by the execution coordinator, if dispatched.
    #[must_use]
    pub const fn execution_id(&self) -> Option<ExecutionId> {
        self.execution_id
    }

    /// Whether this context only serves a suggestion walk.
    #[must_use]
    pub const fn is_suggesting(&self) -> bool {
        self.suggesting
    }

    pub(crate) fn bind(&mut self, name: &str, value: Value) -> Result<(), ContextError> {
        if self.arguments.contains_key(name) {
            return Err(ContextError::AlreadyBound {
                name: name.to_string(),
            });
        }
        self.arguments.insert(name.to_string(), value);
        Ok(())
    }

    pub(crate) const fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    pub(crate) const fn assign_execution(&mut self, id: ExecutionId) {
        self.execution_id = Some(id);
    }
}

fn convert<T: FromValue>(name: &str, value: &Value) -> Result<T, ContextError> {
    T::from_value(value).ok_or_else(|| ContextError::TypeMismatch {
        name: name.to_string(),
        expected: T::TYPE_NAME,
        actual: value.kind(),
    })
}
