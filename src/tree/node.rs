//! Tree nodes.

use std::fmt;
use std::sync::Arc;

use super::command::Command;
use super::component::{ArgumentSpec, FlagSpec, LiteralSpec};

/// What a node matches.
pub enum NodeComponent<S> {
    /// The tree sentinel; never matches input.
    Root,
    /// Fixed keyword.
    Literal(LiteralSpec),
    /// Typed argument slot.
    Argument(ArgumentSpec<S>),
    /// Flag owned by the command on the parent node.
    Flag(FlagSpec<S>),
}

impl<S> fmt::Debug for NodeComponent<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("Root"),
            Self::Literal(l) => l.fmt(f),
            Self::Argument(a) => a.fmt(f),
            Self::Flag(flag) => flag.fmt(f),
        }
    }
}

/// A node in the command tree.
///
/// Children keep insertion order. `reachable` lists every command registered
/// at or below this node and drives per-node permission filtering.
pub struct CommandNode<S> {
    component: NodeComponent<S>,
    children: Vec<Self>,
    command: Option<Arc<Command<S>>>,
    reachable: Vec<Arc<Command<S>>>,
}

impl<S> CommandNode<S> {
    pub(crate) const fn root() -> Self {
        Self::new(NodeComponent::Root)
    }

    pub(crate) const fn new(component: NodeComponent<S>) -> Self {
        Self {
            component,
            children: Vec::new(),
            command: None,
            reachable: Vec::new(),
        }
    }

    /// What this node matches.
    #[must_use]
    pub const fn component(&self) -> &NodeComponent<S> {
        &self.component
    }

    /// Child nodes in insertion order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Command terminating at this node.
    #[must_use]
    pub const fn command(&self) -> Option<&Arc<Command<S>>> {
        self.command.as_ref()
    }

    /// Commands registered at or below this node.
    #[must_use]
    pub fn reachable(&self) -> &[Arc<Command<S>>] {
        &self.reachable
    }

    /// Display name: literal, argument or flag name; empty for the root.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.component {
            NodeComponent::Root => "",
            NodeComponent::Literal(l) => l.name(),
            NodeComponent::Argument(a) => a.name(),
            NodeComponent::Flag(f) => f.name(),
        }
    }

    /// The literal spec, when this is a literal node.
    #[must_use]
    pub const fn as_literal(&self) -> Option<&LiteralSpec> {
        match &self.component {
            NodeComponent::Literal(l) => Some(l),
            _ => None,
        }
    }

    /// The argument spec, when this is an argument node.
    #[must_use]
    pub const fn as_argument(&self) -> Option<&ArgumentSpec<S>> {
        match &self.component {
            NodeComponent::Argument(a) => Some(a),
            _ => None,
        }
    }

    /// The flag spec, when this is a flag node.
    #[must_use]
    pub const fn as_flag(&self) -> Option<&FlagSpec<S>> {
        match &self.component {
            NodeComponent::Flag(f) => Some(f),
            _ => None,
        }
    }

    /// Literal children.
    pub fn literals(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(|c| c.as_literal().is_some())
    }

    /// The argument child; construction allows at most one.
    #[must_use]
    pub fn argument(&self) -> Option<&Self> {
        self.children.iter().find(|c| c.as_argument().is_some())
    }

    /// Flag children.
    pub fn flags(&self) -> impl Iterator<Item = &FlagSpec<S>> {
        self.children.iter().filter_map(Self::as_flag)
    }

    /// Whether any flag is registered on this node.
    #[must_use]
    pub fn has_flags(&self) -> bool {
        self.flags().next().is_some()
    }

    /// Whether the node has literal or argument children.
    #[must_use]
    pub fn has_positional_children(&self) -> bool {
        self.children.iter().any(|c| c.as_flag().is_none())
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    pub(crate) const fn component_mut(&mut self) -> &mut NodeComponent<S> {
        &mut self.component
    }

    pub(crate) fn set_command(&mut self, command: Arc<Command<S>>) {
        self.command = Some(command);
    }

    pub(crate) fn add_reachable(&mut self, command: &Arc<Command<S>>) {
        self.reachable.push(Arc::clone(command));
    }
}

impl<S> fmt::Debug for CommandNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("component", &self.component)
            .field("children", &self.children)
            .field("command", &self.command.as_ref().map(|c| c.syntax()))
            .finish_non_exhaustive()
    }
}
