//! Fluent command registration.

use std::future::Future;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::parser::ArgumentParser;
use crate::sender::{Permission, SenderRequirement};
use crate::value::Value;

use super::command::{Handler, HandlerResult};
use super::component::{ArgumentSpec, FlagSpec, LiteralSpec, PathComponent};

/// A command ready to be inserted into a [`CommandTree`](super::CommandTree).
pub struct CommandSpec<S> {
    pub(crate) components: Vec<PathComponent<S>>,
    pub(crate) description: Option<String>,
    pub(crate) permission: Permission<S>,
    pub(crate) requirement: SenderRequirement<S>,
    pub(crate) handler: Handler<S>,
}

impl<S> CommandSpec<S> {
    /// Path components in declaration order.
    #[must_use]
    pub fn components(&self) -> &[PathComponent<S>] {
        &self.components
    }
}

/// Builds a [`CommandSpec`].
///
/// ```
/// use cmdtree::parser::IntegerParser;
/// use cmdtree::tree::CommandBuilder;
///
/// let spec = CommandBuilder::<()>::new("give")
///     .argument("player", cmdtree::parser::StringParser::single())
///     .optional_with_default("amount", IntegerParser::range(1, 64), 1)
///     .permission_node("game.give")
///     .build();
/// assert_eq!(spec.components().len(), 3);
/// ```
pub struct CommandBuilder<S> {
    components: Vec<PathComponent<S>>,
    description: Option<String>,
    permission: Permission<S>,
    requirement: SenderRequirement<S>,
    handler: Option<Handler<S>>,
}

impl<S: Send + Sync + 'static> CommandBuilder<S> {
    /// Starts a command at the root literal `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            components: vec![PathComponent::Literal(LiteralSpec::new(name))],
            description: None,
            permission: Permission::Open,
            requirement: SenderRequirement::Any,
            handler: None,
        }
    }

    /// Adds an alias to the root literal.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        if let Some(PathComponent::Literal(root)) = self.components.first_mut() {
            root.add_alias(alias.into());
        }
        self
    }

    /// Appends a literal segment.
    #[must_use]
    pub fn literal(self, name: impl Into<String>) -> Self {
        self.component(PathComponent::Literal(LiteralSpec::new(name)))
    }

    /// Appends a literal segment with aliases.
    #[must_use]
    pub fn literal_with_aliases<I, T>(self, name: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let literal = aliases
            .into_iter()
            .fold(LiteralSpec::new(name), |l, a| l.alias(a));
        self.component(PathComponent::Literal(literal))
    }

    /// Appends a required argument.
    #[must_use]
    pub fn argument(
        self,
        name: impl Into<String>,
        parser: impl ArgumentParser<S> + 'static,
    ) -> Self {
        self.component(PathComponent::Argument(ArgumentSpec::required(
            name,
            Arc::new(parser),
        )))
    }

    /// Appends an optional argument without a default.
    #[must_use]
    pub fn optional(
        self,
        name: impl Into<String>,
        parser: impl ArgumentParser<S> + 'static,
    ) -> Self {
        self.component(PathComponent::Argument(ArgumentSpec::optional(
            name,
            Arc::new(parser),
        )))
    }

    /// Appends an optional argument bound to `default` when absent.
    #[must_use]
    pub fn optional_with_default(
        self,
        name: impl Into<String>,
        parser: impl ArgumentParser<S> + 'static,
        default: impl Into<Value>,
    ) -> Self {
        self.component(PathComponent::Argument(ArgumentSpec::with_default(
            name,
            Arc::new(parser),
            default.into(),
        )))
    }

    /// Appends a trailing flag.
    #[must_use]
    pub fn flag(self, flag: FlagSpec<S>) -> Self {
        self.component(PathComponent::Flag(flag))
    }

    /// Appends any component, e.g. an argument sharing a parser with others.
    #[must_use]
    pub fn component(mut self, component: PathComponent<S>) -> Self {
        self.components.push(component);
        self
    }

    /// Sets the permission rule.
    #[must_use]
    pub fn permission(mut self, permission: Permission<S>) -> Self {
        self.permission = permission;
        self
    }

    /// Requires the permission node `node`.
    #[must_use]
    pub fn permission_node(self, node: impl Into<String>) -> Self {
        self.permission(Permission::node(node))
    }

    /// Sets the sender-type constraint.
    #[must_use]
    pub fn sender(mut self, requirement: SenderRequirement<S>) -> Self {
        self.requirement = requirement;
        self
    }

    /// Requires the sender to declare `capability`.
    #[must_use]
    pub fn requires_capability(self, capability: impl Into<String>) -> Self {
        self.sender(SenderRequirement::Capability(capability.into()))
    }

    /// Sets the help text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a synchronous handler.
    #[must_use]
    pub fn handler(
        self,
        f: impl Fn(&CommandContext<S>) -> HandlerResult + Send + Sync + 'static,
    ) -> Self {
        self.with_handler(Handler::sync(f))
    }

    /// Sets an async handler.
    #[must_use]
    pub fn async_handler<F, Fut>(self, f: F) -> Self
    where
        F: Fn(Arc<CommandContext<S>>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.with_handler(Handler::from_async(f))
    }

    /// Sets a prepared handler.
    #[must_use]
    pub fn with_handler(mut self, handler: Handler<S>) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Finishes the command. Without a handler the command returns `null`.
    #[must_use]
    pub fn build(self) -> CommandSpec<S> {
        CommandSpec {
            components: self.components,
            description: self.description,
            permission: self.permission,
            requirement: self.requirement,
            handler: self.handler.unwrap_or_else(Handler::noop),
        }
    }
}

impl<S: Send + Sync + 'static> From<CommandBuilder<S>> for CommandSpec<S> {
    fn from(builder: CommandBuilder<S>) -> Self {
        builder.build()
    }
}
