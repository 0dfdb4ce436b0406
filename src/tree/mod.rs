//! The command tree.
//!
//! Commands are registered while the tree is exclusively owned. Once the tree
//! is handed to a [`CommandManager`](crate::manager::CommandManager) it sits
//! behind an `Arc` and is never mutated again, so walks need no locking.
//!
//! Registration is atomic: a path is validated on its own, then checked
//! against the existing tree without modifying it, and only then applied.

pub mod builder;
pub mod command;
pub mod component;
pub mod node;
pub mod syntax;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

pub use builder::{CommandBuilder, CommandSpec};
pub use command::{Arity, AsyncCommandHandler, Command, Handler, HandlerResult, SyncHandler};
pub use component::{ArgumentSpec, FlagSpec, LiteralSpec, PathComponent};
pub use node::{CommandNode, NodeComponent};

use crate::error::ConstructionError;
use crate::tokenizer::FlagSyntax;
use component::names_equal;

/// Matching rules fixed when the tree is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSettings {
    /// Compare literals ignoring case.
    pub case_insensitive: bool,
    /// Flag prefixes.
    pub flags: FlagSyntax,
}

/// Rooted tree of registered command paths.
pub struct CommandTree<S> {
    root: CommandNode<S>,
    commands: Vec<Arc<Command<S>>>,
    settings: TreeSettings,
}

impl<S> Default for CommandTree<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> std::fmt::Debug for CommandTree<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandTree")
            .field("settings", &self.settings)
            .field("root", &self.root)
            .finish()
    }
}

impl<S> CommandTree<S> {
    /// Creates an empty tree with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(TreeSettings::default())
    }

    /// Creates an empty tree.
    #[must_use]
    pub const fn with_settings(settings: TreeSettings) -> Self {
        Self {
            root: CommandNode::root(),
            commands: Vec::new(),
            settings,
        }
    }

    /// Matching rules.
    #[must_use]
    pub const fn settings(&self) -> &TreeSettings {
        &self.settings
    }

    /// The root sentinel.
    #[must_use]
    pub const fn root(&self) -> &CommandNode<S> {
        &self.root
    }

    /// Children of `node` in insertion order.
    #[must_use]
    pub fn children<'n>(&self, node: &'n CommandNode<S>) -> &'n [CommandNode<S>] {
        node.children()
    }

    /// Registered commands in registration order.
    #[must_use]
    pub fn commands(&self) -> &[Arc<Command<S>>] {
        &self.commands
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Registers a command.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] when the path is malformed or clashes
    /// with an existing registration. The tree is unchanged on error.
    pub fn insert(&mut self, spec: impl Into<CommandSpec<S>>) -> Result<(), ConstructionError> {
        let spec = spec.into();
        self.validate_path(&spec.components)?;
        let syntax = syntax::render(&spec.components, &self.settings.flags);
        self.check_conflicts(&spec.components, &syntax)?;

        let root = spec.components[0].name().to_string();
        let arity = syntax::arity(&spec.components);
        let command = Arc::new(Command::new(
            root,
            syntax,
            spec.description,
            spec.permission,
            spec.requirement,
            spec.handler,
            arity,
        ));
        self.apply(spec.components, &command);
        debug!(syntax = command.syntax(), "registered command");
        self.commands.push(command);
        Ok(())
    }

    fn check_name(&self, name: &str, flag: bool) -> Result<(), ConstructionError> {
        let invalid = |reason| ConstructionError::InvalidName {
            name: name.to_string(),
            reason,
        };
        if name.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("must not contain whitespace"));
        }
        if flag {
            if !name.chars().next().is_some_and(char::is_alphabetic) {
                return Err(invalid("flag names must start with a letter"));
            }
        } else if self.settings.flags.is_flag(name) {
            return Err(invalid("must not look like a flag"));
        }
        Ok(())
    }

    fn validate_path(&self, components: &[PathComponent<S>]) -> Result<(), ConstructionError> {
        let first = components.first().ok_or(ConstructionError::EmptyPath)?;
        if !matches!(first, PathComponent::Literal(_)) {
            return Err(ConstructionError::InvalidRoot {
                name: first.name().to_string(),
            });
        }

        let mut optional: Option<&str> = None;
        let mut greedy: Option<&str> = None;
        let mut trailing_flag: Option<&str> = None;
        let mut argument_names = HashSet::new();
        let mut flag_names = HashSet::new();

        for component in components {
            if let PathComponent::Flag(flag) = component {
                for alias in flag.names() {
                    self.check_name(alias, true)?;
                    if !flag_names.insert(alias) {
                        return Err(ConstructionError::DuplicateFlag {
                            name: alias.to_string(),
                        });
                    }
                }
                trailing_flag.get_or_insert(flag.name());
                continue;
            }

            let name = component.name();
            if let Some(flag) = trailing_flag {
                return Err(ConstructionError::FlagNotTrailing {
                    component: name.to_string(),
                    flag: flag.to_string(),
                });
            }
            if let Some(greedy) = greedy {
                return Err(ConstructionError::GreedyNotLast {
                    component: name.to_string(),
                    greedy: greedy.to_string(),
                });
            }
            let required_after_optional = |optional: &str| ConstructionError::RequiredAfterOptional {
                component: name.to_string(),
                optional: optional.to_string(),
            };

            match component {
                PathComponent::Literal(literal) => {
                    for alias in literal.names() {
                        self.check_name(alias, false)?;
                    }
                    if let Some(optional) = optional {
                        return Err(required_after_optional(optional));
                    }
                }
                PathComponent::Argument(arg) => {
                    self.check_name(arg.name(), false)?;
                    if !argument_names.insert(arg.name()) {
                        return Err(ConstructionError::DuplicateArgument {
                            name: arg.name().to_string(),
                        });
                    }
                    if arg.is_required() {
                        if let Some(optional) = optional {
                            return Err(required_after_optional(optional));
                        }
                    } else {
                        if let Some(default) = arg.default_value()
                            && default.kind() != arg.value_kind()
                        {
                            return Err(ConstructionError::DefaultTypeMismatch {
                                argument: arg.name().to_string(),
                                expected: arg.value_kind(),
                                actual: default.kind(),
                            });
                        }
                        optional.get_or_insert(arg.name());
                    }
                    if arg.is_greedy() {
                        greedy = Some(arg.name());
                    }
                }
                PathComponent::Flag(_) => {}
            }
        }
        Ok(())
    }

    /// Checks a validated path against the existing tree.
    ///
    /// A flag token ends positional parsing at the first node that owns
    /// flags, so a flagged command may not sit below another flagged node
    /// with only optional arguments between them.
    fn check_conflicts(
        &self,
        components: &[PathComponent<S>],
        syntax: &str,
    ) -> Result<(), ConstructionError> {
        let ci = self.settings.case_insensitive;
        let has_flags = components
            .iter()
            .any(|c| matches!(c, PathComponent::Flag(_)));
        let mut node = Some(&self.root);
        let mut flag_owner: Option<&CommandNode<S>> = None;

        for component in components {
            let next = match (component, node) {
                (PathComponent::Flag(_), _) => continue,
                (PathComponent::Literal(literal), Some(current)) => {
                    let existing = current
                        .literals()
                        .find(|child| names_equal(child.name(), literal.name(), ci));
                    for sibling in current.literals() {
                        if existing.is_some_and(|e| std::ptr::eq(e, sibling)) {
                            continue;
                        }
                        let Some(spec) = sibling.as_literal() else {
                            continue;
                        };
                        if let Some(name) = literal.names().find(|n| spec.matches(n, ci)) {
                            return Err(ConstructionError::LiteralConflict {
                                name: name.to_string(),
                                existing: sibling.name().to_string(),
                            });
                        }
                    }
                    existing
                }
                (PathComponent::Argument(arg), Some(current)) => {
                    let child = current.argument();
                    if let Some(existing) = child.and_then(CommandNode::as_argument)
                        && !existing.is_compatible(arg)
                    {
                        return Err(ConstructionError::AmbiguousArgument {
                            parent: current.name().to_string(),
                            existing: existing.name().to_string(),
                            new: arg.name().to_string(),
                        });
                    }
                    child
                }
                (_, None) => None,
            };
            let optional = matches!(component, PathComponent::Argument(arg) if !arg.is_required());
            if !optional {
                flag_owner = None;
            }
            if let Some(next) = next
                && next.has_flags()
            {
                flag_owner = Some(next);
            }
            node = next;
        }

        if let Some(terminal) = node
            && terminal.command().is_some()
        {
            return Err(ConstructionError::DuplicateCommand {
                syntax: syntax.to_string(),
            });
        }
        if !has_flags {
            return Ok(());
        }
        let shadowed = |owner: &CommandNode<S>| ConstructionError::ShadowedFlags {
            syntax: syntax.to_string(),
            owner: owner.name().to_string(),
        };
        if let Some(owner) = flag_owner {
            return Err(shadowed(owner));
        }
        let mut below = node.and_then(CommandNode::argument);
        while let Some(child) = below {
            match child.as_argument() {
                Some(arg) if !arg.is_required() => {
                    if child.has_flags() {
                        return Err(shadowed(child));
                    }
                    below = child.argument();
                }
                _ => break,
            }
        }

        Ok(())
    }

    fn apply(&mut self, components: Vec<PathComponent<S>>, command: &Arc<Command<S>>) {
        let ci = self.settings.case_insensitive;
        let mut node = &mut self.root;
        node.add_reachable(command);
        let mut flags = Vec::new();

        for component in components {
            let index = match component {
                PathComponent::Literal(literal) => {
                    let found = node.children().iter().position(|child| {
                        child
                            .as_literal()
                            .is_some_and(|l| names_equal(l.name(), literal.name(), ci))
                    });
                    match found {
                        Some(index) => {
                            if let NodeComponent::Literal(existing) =
                                node.children_mut()[index].component_mut()
                            {
                                for alias in literal.aliases() {
                                    if !existing.matches(alias, ci) {
                                        existing.add_alias(alias.clone());
                                    }
                                }
                            }
                            index
                        }
                        None => push_child(node, NodeComponent::Literal(literal)),
                    }
                }
                PathComponent::Argument(arg) => {
                    match node.children().iter().position(|c| c.as_argument().is_some()) {
                        Some(index) => index,
                        None => push_child(node, NodeComponent::Argument(arg)),
                    }
                }
                PathComponent::Flag(flag) => {
                    flags.push(flag);
                    continue;
                }
            };
            node = &mut node.children_mut()[index];
            node.add_reachable(command);
        }

        for flag in flags {
            let index = push_child(node, NodeComponent::Flag(flag));
            node.children_mut()[index].add_reachable(command);
        }
        node.set_command(Arc::clone(command));
    }
}

fn push_child<S>(node: &mut CommandNode<S>, component: NodeComponent<S>) -> usize {
    let children = node.children_mut();
    children.push(CommandNode::new(component));
    children.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{BooleanParser, IntegerParser, StringParser};
    use crate::value::{Value, ValueKind};

    fn give() -> CommandBuilder<()> {
        CommandBuilder::new("give")
            .argument("player", StringParser::single())
            .optional_with_default("amount", IntegerParser::range(1, 64), 1)
    }

    #[test]
    fn insert_builds_shared_prefix() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(CommandBuilder::new("time").literal("set").argument("value", IntegerParser::new()))
            .unwrap();
        tree.insert(CommandBuilder::new("time").literal("query")).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.root().children().len(), 1);
        let time = &tree.root().children()[0];
        assert_eq!(time.name(), "time");
        assert_eq!(time.children().len(), 2);
        assert_eq!(time.reachable().len(), 2);
        assert_eq!(tree.commands()[0].syntax(), "time set <value>");
    }

    #[test]
    fn rejects_empty_and_non_literal_roots() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let spec = CommandSpec {
            components: Vec::new(),
            description: None,
            permission: crate::sender::Permission::Open,
            requirement: crate::sender::SenderRequirement::Any,
            handler: Handler::noop(),
        };
        assert_eq!(tree.insert(spec), Err(ConstructionError::EmptyPath));

        let spec = CommandSpec {
            components: vec![PathComponent::Argument(ArgumentSpec::required(
                "x",
                Arc::new(StringParser::single()),
            ))],
            description: None,
            permission: crate::sender::Permission::Open,
            requirement: crate::sender::SenderRequirement::Any,
            handler: Handler::noop(),
        };
        assert_eq!(
            tree.insert(spec),
            Err(ConstructionError::InvalidRoot {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn rejects_bad_names() {
        let mut tree: CommandTree<()> = CommandTree::new();
        assert!(matches!(
            tree.insert(CommandBuilder::new("two words")),
            Err(ConstructionError::InvalidName { .. })
        ));
        assert!(matches!(
            tree.insert(CommandBuilder::new("--opt")),
            Err(ConstructionError::InvalidName { .. })
        ));
        assert!(matches!(
            tree.insert(CommandBuilder::new("x").flag(FlagSpec::presence("1st"))),
            Err(ConstructionError::InvalidName { .. })
        ));
        assert!(tree.is_empty());
    }

    #[test]
    fn required_after_optional_is_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let err = tree
            .insert(
                CommandBuilder::new("x")
                    .optional("a", IntegerParser::new())
                    .argument("b", IntegerParser::new()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::RequiredAfterOptional {
                component: "b".to_string(),
                optional: "a".to_string()
            }
        );
        assert!(matches!(
            tree.insert(CommandBuilder::new("x").optional("a", IntegerParser::new()).literal("y")),
            Err(ConstructionError::RequiredAfterOptional { .. })
        ));
    }

    #[test]
    fn optional_chain_is_allowed() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(
            CommandBuilder::new("tp")
                .optional("x", IntegerParser::new())
                .optional("y", IntegerParser::new()),
        )
        .unwrap();
    }

    #[test]
    fn greedy_must_be_last() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let err = tree
            .insert(
                CommandBuilder::new("say")
                    .argument("message", StringParser::greedy())
                    .argument("after", StringParser::single()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::GreedyNotLast {
                component: "after".to_string(),
                greedy: "message".to_string()
            }
        );
    }

    #[test]
    fn flags_must_trail() {
        let mut tree: CommandTree<()> = CommandTree::new();
        let err = tree
            .insert(
                CommandBuilder::new("tp")
                    .flag(FlagSpec::presence("silent"))
                    .argument("player", StringParser::single()),
            )
            .unwrap_err();
        assert!(matches!(err, ConstructionError::FlagNotTrailing { .. }));
    }

    #[test]
    fn duplicate_argument_and_flag_names() {
        let mut tree: CommandTree<()> = CommandTree::new();
        assert!(matches!(
            tree.insert(
                CommandBuilder::new("x")
                    .argument("a", IntegerParser::new())
                    .argument("a", IntegerParser::new())
            ),
            Err(ConstructionError::DuplicateArgument { .. })
        ));
        assert_eq!(
            tree.insert(
                CommandBuilder::new("x")
                    .flag(FlagSpec::presence("silent").alias("s"))
                    .flag(FlagSpec::presence("strict").alias("s"))
            ),
            Err(ConstructionError::DuplicateFlag {
                name: "s".to_string()
            })
        );
    }

    #[test]
    fn incompatible_sibling_arguments_are_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(give()).unwrap();
        let err = tree
            .insert(CommandBuilder::new("give").argument("target", IntegerParser::new()))
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::AmbiguousArgument {
                parent: "give".to_string(),
                existing: "player".to_string(),
                new: "target".to_string()
            }
        );
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn compatible_arguments_merge() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(CommandBuilder::new("tp").argument("player", StringParser::single()))
            .unwrap();
        tree.insert(
            CommandBuilder::new("tp")
                .argument("player", StringParser::single())
                .argument("target", StringParser::single()),
        )
        .unwrap();
        let tp = &tree.root().children()[0];
        assert_eq!(tp.children().len(), 1);
        assert!(tp.children()[0].command().is_some());
        assert!(tp.children()[0].children()[0].command().is_some());
    }

    #[test]
    fn differently_configured_parsers_do_not_merge() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(CommandBuilder::new("x").argument("n", IntegerParser::range(1, 10)))
            .unwrap();
        let err = tree
            .insert(
                CommandBuilder::new("x")
                    .argument("n", IntegerParser::new())
                    .argument("m", StringParser::single()),
            )
            .unwrap_err();
        assert_eq!(
            err,
            ConstructionError::AmbiguousArgument {
                parent: "x".to_string(),
                existing: "n".to_string(),
                new: "n".to_string()
            }
        );
        assert_eq!(tree.len(), 1);

        tree.insert(
            CommandBuilder::new("x")
                .argument("n", IntegerParser::range(1, 10))
                .argument("m", StringParser::single()),
        )
        .unwrap();
    }

    #[test]
    fn opaque_parsers_merge_only_when_shared() {
        struct Opaque;

        impl crate::parser::ArgumentParser<()> for Opaque {
            fn parse(
                &self,
                _context: &crate::context::CommandContext<()>,
                input: &mut crate::tokenizer::TokenCursor<'_>,
            ) -> Result<Value, crate::error::ArgumentParseError> {
                input.next_token().map(Value::from).ok_or(crate::error::ArgumentParseError::NoInput)
            }

            fn value_kind(&self) -> ValueKind {
                ValueKind::String
            }
        }

        let shared: Arc<dyn crate::parser::ArgumentParser<()>> = Arc::new(Opaque);
        let slot = || PathComponent::Argument(ArgumentSpec::required("who", Arc::clone(&shared)));
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(CommandBuilder::new("find").component(slot())).unwrap();
        tree.insert(
            CommandBuilder::new("find")
                .component(slot())
                .argument("where", StringParser::single()),
        )
        .unwrap();
        assert!(matches!(
            tree.insert(
                CommandBuilder::new("find")
                    .argument("who", Opaque)
                    .literal("now")
            ),
            Err(ConstructionError::AmbiguousArgument { .. })
        ));
    }

    #[test]
    fn flags_may_not_hide_behind_optional_arguments() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(
            CommandBuilder::new("tp")
                .argument("player", StringParser::single())
                .flag(FlagSpec::presence("silent")),
        )
        .unwrap();
        assert_eq!(
            tree.insert(
                CommandBuilder::new("tp")
                    .argument("player", StringParser::single())
                    .optional("target", StringParser::single())
                    .flag(FlagSpec::presence("force")),
            ),
            Err(ConstructionError::ShadowedFlags {
                syntax: "tp <player> [target] [--force]".to_string(),
                owner: "player".to_string()
            })
        );
        tree.insert(
            CommandBuilder::new("tp")
                .argument("player", StringParser::single())
                .optional("target", StringParser::single()),
        )
        .unwrap();
        tree.insert(
            CommandBuilder::new("tp")
                .argument("player", StringParser::single())
                .literal("now")
                .flag(FlagSpec::presence("force")),
        )
        .unwrap();
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn flags_may_not_shadow_existing_optional_branches() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(
            CommandBuilder::new("tp")
                .argument("player", StringParser::single())
                .optional("target", StringParser::single())
                .flag(FlagSpec::presence("force")),
        )
        .unwrap();
        assert!(matches!(
            tree.insert(
                CommandBuilder::new("tp")
                    .argument("player", StringParser::single())
                    .flag(FlagSpec::presence("silent")),
            ),
            Err(ConstructionError::ShadowedFlags { ref owner, .. }) if owner == "target"
        ));
        tree.insert(CommandBuilder::new("tp").argument("player", StringParser::single()))
            .unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn duplicate_command_is_rejected() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(give()).unwrap();
        assert_eq!(
            tree.insert(give()),
            Err(ConstructionError::DuplicateCommand {
                syntax: "give <player> [amount]".to_string()
            })
        );
    }

    #[test]
    fn literal_alias_conflicts() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(CommandBuilder::new("teleport").alias("tp")).unwrap();
        assert_eq!(
            tree.insert(CommandBuilder::new("tp")),
            Err(ConstructionError::LiteralConflict {
                name: "tp".to_string(),
                existing: "teleport".to_string()
            })
        );
        assert!(matches!(
            tree.insert(CommandBuilder::new("transfer").alias("teleport")),
            Err(ConstructionError::LiteralConflict { .. })
        ));
    }

    #[test]
    fn case_insensitive_conflicts() {
        let mut tree: CommandTree<()> = CommandTree::with_settings(TreeSettings {
            case_insensitive: true,
            ..TreeSettings::default()
        });
        tree.insert(CommandBuilder::new("ping")).unwrap();
        assert!(matches!(
            tree.insert(CommandBuilder::new("PING").literal("x")),
            Ok(())
        ));
        assert_eq!(tree.root().children().len(), 1);
    }

    #[test]
    fn default_must_match_parser_kind() {
        let mut tree: CommandTree<()> = CommandTree::new();
        assert_eq!(
            tree.insert(CommandBuilder::new("x").optional_with_default(
                "flag",
                BooleanParser::strict(),
                Value::from("yes")
            )),
            Err(ConstructionError::DefaultTypeMismatch {
                argument: "flag".to_string(),
                expected: ValueKind::Bool,
                actual: ValueKind::String
            })
        );
    }

    #[test]
    fn flags_belong_to_one_command() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(CommandBuilder::new("a").flag(FlagSpec::presence("silent").alias("s")))
            .unwrap();
        tree.insert(CommandBuilder::new("a").literal("b")).unwrap();
        assert!(matches!(
            tree.insert(CommandBuilder::new("a").flag(FlagSpec::presence("quiet"))),
            Err(ConstructionError::DuplicateCommand { .. })
        ));
        let a = &tree.root().children()[0];
        assert_eq!(a.flags().count(), 1);
        assert_eq!(a.reachable().len(), 2);
    }

    #[test]
    fn flags_attach_to_terminal_node() {
        let mut tree: CommandTree<()> = CommandTree::new();
        tree.insert(
            CommandBuilder::new("tp")
                .argument("player", StringParser::single())
                .flag(FlagSpec::presence("silent").alias("s")),
        )
        .unwrap();
        let player = &tree.root().children()[0].children()[0];
        assert!(player.has_flags());
        assert!(player.command().is_some());
        assert!(!player.has_positional_children());
    }
}
