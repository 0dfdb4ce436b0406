//! Sender abstraction and access rules.
//!
//! The engine never manages permissions itself. It asks a
//! [`PermissionChecker`] for a yes/no answer per permission node and asks the
//! [`Sender`] which capabilities it declares.

use std::fmt;
use std::sync::Arc;

/// Whoever issued a command: a player, a console, a bot user.
pub trait Sender: Send + Sync + 'static {
    /// Display name, used in logs.
    fn name(&self) -> &str;

    /// Whether the sender holds `permission`.
    fn has_permission(&self, permission: &str) -> bool;

    /// Whether the sender declares `capability` (e.g. `"player"`, `"console"`).
    fn has_capability(&self, _capability: &str) -> bool {
        false
    }
}

/// Answers permission queries for senders of type `S`.
pub trait PermissionChecker<S>: Send + Sync {
    /// Whether `sender` holds `permission`.
    fn has_permission(&self, sender: &S, permission: &str) -> bool;
}

/// Default checker: asks the sender itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct SenderPermissions;

impl<S: Sender> PermissionChecker<S> for SenderPermissions {
    fn has_permission(&self, sender: &S, permission: &str) -> bool {
        sender.has_permission(permission)
    }
}

type SenderPredicate<S> = Arc<dyn Fn(&S) -> bool + Send + Sync>;

/// Permission rule attached to a command.
pub enum Permission<S> {
    /// Everyone may run the command.
    Open,
    /// The sender must hold this permission node.
    Node(String),
    /// Arbitrary predicate over the sender.
    Predicate(SenderPredicate<S>),
    /// At least one of the rules must pass.
    AnyOf(Vec<Self>),
    /// Every rule must pass.
    AllOf(Vec<Self>),
}

impl<S> Permission<S> {
    /// Requires the permission node `node`.
    #[must_use]
    pub fn node(node: impl Into<String>) -> Self {
        Self::Node(node.into())
    }

    /// Requires `predicate` to hold for the sender.
    #[must_use]
    pub fn predicate(predicate: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(predicate))
    }

    /// Evaluates the rule for `sender`.
    pub fn allows(&self, sender: &S, checker: &dyn PermissionChecker<S>) -> bool {
        match self {
            Self::Open => true,
            Self::Node(node) => checker.has_permission(sender, node),
            Self::Predicate(predicate) => predicate(sender),
            Self::AnyOf(rules) => rules.iter().any(|r| r.allows(sender, checker)),
            Self::AllOf(rules) => rules.iter().all(|r| r.allows(sender, checker)),
        }
    }
}

impl<S> Clone for Permission<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Open => Self::Open,
            Self::Node(node) => Self::Node(node.clone()),
            Self::Predicate(p) => Self::Predicate(Arc::clone(p)),
            Self::AnyOf(rules) => Self::AnyOf(rules.clone()),
            Self::AllOf(rules) => Self::AllOf(rules.clone()),
        }
    }
}

impl<S> fmt::Debug for Permission<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::AnyOf(rules) => f.debug_tuple("AnyOf").field(rules).finish(),
            Self::AllOf(rules) => f.debug_tuple("AllOf").field(rules).finish(),
        }
    }
}

/// Sender-type constraint attached to a command.
pub enum SenderRequirement<S> {
    /// Any sender.
    Any,
    /// The sender must declare the capability.
    Capability(String),
    /// Arbitrary predicate over the sender.
    Predicate(SenderPredicate<S>),
}

impl<S: Sender> SenderRequirement<S> {
    /// Requires the sender to declare `capability`.
    #[must_use]
    pub fn capability(capability: impl Into<String>) -> Self {
        Self::Capability(capability.into())
    }

    /// Whether `sender` satisfies the constraint.
    pub fn accepts(&self, sender: &S) -> bool {
        match self {
            Self::Any => true,
            Self::Capability(capability) => sender.has_capability(capability),
            Self::Predicate(predicate) => predicate(sender),
        }
    }
}

impl<S> SenderRequirement<S> {
    /// Requires `predicate` to hold for the sender.
    #[must_use]
    pub fn predicate(predicate: impl Fn(&S) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(Arc::new(predicate))
    }
}

impl<S> Clone for SenderRequirement<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Any => Self::Any,
            Self::Capability(c) => Self::Capability(c.clone()),
            Self::Predicate(p) => Self::Predicate(Arc::clone(p)),
        }
    }
}

impl<S> fmt::Debug for SenderRequirement<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Capability(c) => f.debug_tuple("Capability").field(c).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Result of checking a sender against one or more commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The sender may proceed.
    Granted,
    /// The sender type is not accepted.
    WrongSenderType,
    /// The sender lacks permission.
    Denied,
}
