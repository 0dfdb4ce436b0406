//! Registered commands and their handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CommandContext;
use crate::error::HandlerError;
use crate::sender::{Permission, SenderRequirement};

/// What a handler returns: a JSON payload or an error.
pub type HandlerResult = Result<serde_json::Value, HandlerError>;

/// Synchronous handler closure.
pub type SyncHandler<S> = Arc<dyn Fn(&CommandContext<S>) -> HandlerResult + Send + Sync>;

/// Asynchronous command handler.
///
/// The context is shared so the returned future can outlive the caller's
/// stack frame when it runs on a worker.
#[async_trait]
pub trait AsyncCommandHandler<S>: Send + Sync {
    /// Runs the command.
    async fn handle(&self, context: Arc<CommandContext<S>>) -> HandlerResult;
}

struct AsyncFn<F>(F);

#[async_trait]
impl<S, F, Fut> AsyncCommandHandler<S> for AsyncFn<F>
where
    S: Send + Sync + 'static,
    F: Fn(Arc<CommandContext<S>>) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn handle(&self, context: Arc<CommandContext<S>>) -> HandlerResult {
        (self.0)(context).await
    }
}

/// A command handler.
pub enum Handler<S> {
    /// Runs to completion on the invoking thread.
    Sync(SyncHandler<S>),
    /// Returns a future.
    Async(Arc<dyn AsyncCommandHandler<S>>),
}

impl<S: Send + Sync + 'static> Handler<S> {
    /// Wraps a synchronous closure.
    pub fn sync(f: impl Fn(&CommandContext<S>) -> HandlerResult + Send + Sync + 'static) -> Self {
        Self::Sync(Arc::new(f))
    }

    /// Wraps an async closure.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<CommandContext<S>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Async(Arc::new(AsyncFn(f)))
    }

    /// Wraps a handler object.
    pub fn object(handler: impl AsyncCommandHandler<S> + 'static) -> Self {
        Self::Async(Arc::new(handler))
    }

    /// A handler that returns `null`.
    #[must_use]
    pub fn noop() -> Self {
        Self::sync(|_| Ok(serde_json::Value::Null))
    }
}

impl<S> Clone for Handler<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Sync(f) => Self::Sync(Arc::clone(f)),
            Self::Async(h) => Self::Async(Arc::clone(h)),
        }
    }
}

impl<S> fmt::Debug for Handler<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Async(_) => f.write_str("Handler::Async"),
        }
    }
}

/// Bounds on the number of positional tokens a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    /// Literals plus required arguments.
    pub min: usize,
    /// All positional components; `None` when a greedy argument is present.
    pub max: Option<usize>,
}

/// A command registered in a tree.
///
/// Only the tree creates commands, so the syntax and arity always describe
/// the path the command was registered under.
pub struct Command<S> {
    root: String,
    syntax: String,
    description: Option<String>,
    permission: Permission<S>,
    requirement: SenderRequirement<S>,
    handler: Handler<S>,
    arity: Arity,
}

impl<S> Command<S> {
    pub(crate) const fn new(
        root: String,
        syntax: String,
        description: Option<String>,
        permission: Permission<S>,
        requirement: SenderRequirement<S>,
        handler: Handler<S>,
        arity: Arity,
    ) -> Self {
        Self {
            root,
            syntax,
            description,
            permission,
            requirement,
            handler,
            arity,
        }
    }

    /// Name of the first literal.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Rendered syntax, e.g. `give <player> [amount]`.
    #[must_use]
    pub fn syntax(&self) -> &str {
        &self.syntax
    }

    /// Help text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Permission rule.
    #[must_use]
    pub const fn permission(&self) -> &Permission<S> {
        &self.permission
    }

    /// Sender-type constraint.
    #[must_use]
    pub const fn requirement(&self) -> &SenderRequirement<S> {
        &self.requirement
    }

    /// The handler.
    #[must_use]
    pub const fn handler(&self) -> &Handler<S> {
        &self.handler
    }

    /// Positional arity bounds.
    #[must_use]
    pub const fn arity(&self) -> Arity {
        self.arity
    }
}

impl<S> fmt::Debug for Command<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("syntax", &self.syntax)
            .field("description", &self.description)
            .field("permission", &self.permission)
            .field("requirement", &self.requirement)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
