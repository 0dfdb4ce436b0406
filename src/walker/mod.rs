//! Resolution of token sequences against a frozen [`CommandTree`].
//!
//! The walker moves from the root towards a terminal node, one token at a
//! time. Literal children win over the argument child. Committed literal
//! choices are never revisited; the only retry is skipping an optional
//! argument whose parser rejected the current token.
//!
//! Every node the walker enters must lead to at least one command the sender
//! may run. Denials are reported without naming the blocked command.

mod suggest;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::context::CommandContext;
use crate::error::{ArgumentParseError, ParseError, ParseErrorKind};
use crate::execution::ResolvedCommand;
use crate::sender::{Access, PermissionChecker, Sender};
use crate::tokenizer::{FlagSyntax, FlagToken, TokenCursor, TokenSequence};
use crate::tree::{ArgumentSpec, Command, CommandNode, CommandTree, FlagSpec};
use crate::value::Value;

/// Maximum edit distance for "did you mean" hints.
const MAX_TYPO_DISTANCE: usize = 3;

/// Why input did not resolve to a runnable command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The first token names no accessible command.
    NoSuchCommand {
        /// Nearest accessible root literal, if any is close enough.
        closest: Option<String>,
    },
    /// More than one sibling literal matched the same token.
    Ambiguous {
        /// Names of the matching literals.
        candidates: Vec<String>,
    },
    /// A token could not be parsed.
    Argument(ParseError),
    /// The sender may not run any command on the chosen branch.
    PermissionDenied,
    /// The command does not accept this kind of sender.
    WrongSenderType,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchCommand {
                closest: Some(closest),
            } => write!(f, "unknown command, did you mean '{closest}'?"),
            Self::NoSuchCommand { closest: None } => f.write_str("unknown command"),
            Self::Ambiguous { candidates } => {
                write!(f, "ambiguous input, matches: {}", candidates.join(", "))
            }
            Self::Argument(err) => err.fmt(f),
            Self::PermissionDenied => f.write_str("you do not have permission to do that"),
            Self::WrongSenderType => f.write_str("this command cannot be run by this sender"),
        }
    }
}

/// Where a walk over fully typed tokens stopped.
enum Stop<'t, S> {
    /// Every token was consumed positionally.
    Positional(&'t CommandNode<S>),
    /// The walk entered the flag region of `node`.
    Flags {
        node: &'t CommandNode<S>,
        /// Valued flag whose value has not been typed yet.
        awaiting: Option<&'t FlagSpec<S>>,
    },
}

/// Outcome of matching one token at one node.
enum Step<'t, S> {
    /// Move to `next`; the next unread token is `position`.
    Descend {
        next: &'t CommandNode<S>,
        position: usize,
    },
    /// An optional argument was skipped without consuming input.
    Skip {
        next: &'t CommandNode<S>,
        error: ParseError,
    },
    /// The rest of the input was handled as flags.
    Flags(Stop<'t, S>),
}

/// Resolves input against a tree for one sender type.
pub struct Walker<'t, S> {
    tree: &'t CommandTree<S>,
    checker: &'t dyn PermissionChecker<S>,
}

impl<'t, S: Sender> Walker<'t, S> {
    /// Creates a walker over `tree`.
    pub const fn new(tree: &'t CommandTree<S>, checker: &'t dyn PermissionChecker<S>) -> Self {
        Self { tree, checker }
    }

    fn flag_syntax(&self) -> &'t FlagSyntax {
        &self.tree.settings().flags
    }

    /// Resolves `tokens` to a command with its arguments bound.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] explaining why no command can run.
    pub fn resolve(
        &self,
        sender: Arc<S>,
        tokens: TokenSequence,
    ) -> Result<ResolvedCommand<S>, Rejection> {
        let mut context = CommandContext::new(Arc::clone(&sender), tokens.clone());
        let node = match self.descend(&mut context, &tokens, false)? {
            Stop::Flags { node, .. } => node,
            Stop::Positional(node) => self.complete(&mut context, node, &tokens, &sender)?,
        };
        let command = node.command().ok_or_else(|| {
            Rejection::Argument(ParseError::new(
                tokens.len(),
                ParseErrorKind::InvalidSyntax {
                    expected: self.expected(&tokens, node, &sender),
                },
            ))
        })?;
        self.authorize(command, &sender)?;
        debug!(
            sender = sender.name(),
            command = command.syntax(),
            "resolved command"
        );
        Ok(ResolvedCommand::new(Arc::clone(command), context))
    }

    /// How `sender` may interact with the branch rooted at `node`.
    pub fn access(&self, node: &CommandNode<S>, sender: &S) -> Access {
        let mut sender_accepted = false;
        for command in node.reachable() {
            if command.requirement().accepts(sender) {
                sender_accepted = true;
                if command.permission().allows(sender, self.checker) {
                    return Access::Granted;
                }
            }
        }
        if sender_accepted {
            Access::Denied
        } else {
            Access::WrongSenderType
        }
    }

    fn enter(&self, node: &CommandNode<S>, sender: &S) -> Result<(), Rejection> {
        match self.access(node, sender) {
            Access::Granted => Ok(()),
            Access::Denied => Err(Rejection::PermissionDenied),
            Access::WrongSenderType => Err(Rejection::WrongSenderType),
        }
    }

    fn authorize(&self, command: &Command<S>, sender: &S) -> Result<(), Rejection> {
        if !command.requirement().accepts(sender) {
            return Err(Rejection::WrongSenderType);
        }
        if !command.permission().allows(sender, self.checker) {
            return Err(Rejection::PermissionDenied);
        }
        Ok(())
    }

    fn literal_matches(&self, node: &CommandNode<S>, token: &str) -> bool {
        node.as_literal()
            .is_some_and(|l| l.matches(token, self.tree.settings().case_insensitive))
    }

    /// Picks the literal child matching `token`.
    fn match_literal(
        &self,
        node: &'t CommandNode<S>,
        token: &str,
    ) -> Result<Option<&'t CommandNode<S>>, Rejection> {
        let matches: Vec<_> = node
            .literals()
            .filter(|child| self.literal_matches(child, token))
            .collect();
        match matches.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            many => Err(Rejection::Ambiguous {
                candidates: many.iter().map(|n| n.name().to_string()).collect(),
            }),
        }
    }

    fn closest_root(&self, token: &str, sender: &S) -> Option<String> {
        let case_insensitive = self.tree.settings().case_insensitive;
        let token = if case_insensitive {
            token.to_lowercase()
        } else {
            token.to_string()
        };
        self.tree
            .root()
            .literals()
            .filter(|node| self.access(node, sender) == Access::Granted)
            .map(|node| {
                let name = node.name();
                let distance = if case_insensitive {
                    strsim::damerau_levenshtein(&token, &name.to_lowercase())
                } else {
                    strsim::damerau_levenshtein(&token, name)
                };
                (name, distance)
            })
            .filter(|(_, distance)| *distance <= MAX_TYPO_DISTANCE)
            .min_by_key(|(_, distance)| *distance)
            .map(|(name, _)| name.to_string())
    }

    /// Consumes every token, stopping in positional or flag mode.
    ///
    /// With `partial` set, a valued flag at the very end is reported as
    /// awaiting its value instead of failing.
    fn descend(
        &self,
        context: &mut CommandContext<S>,
        tokens: &[String],
        partial: bool,
    ) -> Result<Stop<'t, S>, Rejection> {
        let sender = Arc::clone(context.sender_handle());
        let Some(first) = tokens.first() else {
            return Err(Rejection::NoSuchCommand { closest: None });
        };
        let Some(mut node) = self.match_literal(self.tree.root(), first)? else {
            return Err(Rejection::NoSuchCommand {
                closest: self.closest_root(first, &sender),
            });
        };
        self.enter(node, &sender)?;

        let mut position = 1;
        let mut skipped: Option<ParseError> = None;
        while position < tokens.len() {
            match self.step(context, node, tokens, position, &sender, partial) {
                Ok(Step::Descend { next, position: p }) => {
                    skipped = None;
                    node = next;
                    position = p;
                }
                Ok(Step::Skip { next, error }) => {
                    skipped.get_or_insert(error);
                    node = next;
                }
                Ok(Step::Flags(stop)) => return Ok(stop),
                Err(rejection) => {
                    return Err(match (skipped, rejection) {
                        (Some(first), Rejection::Argument(_)) => Rejection::Argument(first),
                        (_, rejection) => rejection,
                    });
                }
            }
        }
        Ok(Stop::Positional(node))
    }

    fn step(
        &self,
        context: &mut CommandContext<S>,
        node: &'t CommandNode<S>,
        tokens: &[String],
        position: usize,
        sender: &S,
        partial: bool,
    ) -> Result<Step<'t, S>, Rejection> {
        let token = tokens[position].as_str();

        if self.flag_syntax().is_flag(token) {
            if node.has_flags() {
                return self
                    .flag_region(context, node, tokens, position, partial)
                    .map(Step::Flags);
            }
            if let Some((child, arg)) = argument_child(node)
                && !arg.is_required()
            {
                self.enter(child, sender)?;
                bind_default(context, arg, position)?;
                return Ok(Step::Descend {
                    next: child,
                    position,
                });
            }
            if node.command().is_some() {
                return Err(argument_error(
                    position,
                    ParseErrorKind::UnknownFlag {
                        flag: token.to_string(),
                    },
                ));
            }
        }

        if let Some(child) = self.match_literal(node, token)? {
            self.enter(child, sender)?;
            return Ok(Step::Descend {
                next: child,
                position: position + 1,
            });
        }

        if let Some((child, arg)) = argument_child(node) {
            self.enter(child, sender)?;
            return match self.parse_argument(context, arg, tokens, position) {
                Ok((value, end)) => {
                    bind(context, arg.name(), value, position)?;
                    Ok(Step::Descend {
                        next: child,
                        position: end,
                    })
                }
                Err(error) if !arg.is_required() => {
                    bind_default(context, arg, position)?;
                    Ok(Step::Skip { next: child, error })
                }
                Err(error) => Err(Rejection::Argument(error)),
            };
        }

        let kind = if node.literals().next().is_some() {
            ParseErrorKind::InvalidSyntax {
                expected: self.expected(&tokens[..position], node, sender),
            }
        } else {
            ParseErrorKind::UnexpectedToken {
                token: token.to_string(),
            }
        };
        Err(argument_error(position, kind))
    }

    /// Fills trailing optional arguments once input is exhausted.
    fn complete(
        &self,
        context: &mut CommandContext<S>,
        mut node: &'t CommandNode<S>,
        tokens: &[String],
        sender: &S,
    ) -> Result<&'t CommandNode<S>, Rejection> {
        let index = tokens.len();
        loop {
            if node.command().is_some() {
                return Ok(node);
            }
            let Some((child, arg)) = argument_child(node) else {
                return Err(argument_error(
                    index,
                    ParseErrorKind::InvalidSyntax {
                        expected: self.expected(tokens, node, sender),
                    },
                ));
            };
            if arg.is_required() {
                return Err(argument_error(
                    index,
                    ParseErrorKind::MissingArgument {
                        argument: arg.name().to_string(),
                    },
                ));
            }
            self.enter(child, sender)?;
            bind_default(context, arg, index)?;
            node = child;
        }
    }

    fn parse_argument(
        &self,
        context: &CommandContext<S>,
        arg: &ArgumentSpec<S>,
        tokens: &[String],
        position: usize,
    ) -> Result<(Value, usize), ParseError> {
        self.run_parser(context, arg.name(), arg.parser().as_ref(), tokens, position)
    }

    fn run_parser(
        &self,
        context: &CommandContext<S>,
        name: &str,
        parser: &dyn crate::parser::ArgumentParser<S>,
        tokens: &[String],
        position: usize,
    ) -> Result<(Value, usize), ParseError> {
        let mut cursor = TokenCursor::new(tokens, position, self.flag_syntax());
        match parser.parse(context, &mut cursor) {
            Ok(_) if cursor.position() <= position => {
                warn!(argument = name, position, "parser reported success without consuming input");
                Err(ParseError::new(
                    position,
                    ParseErrorKind::NoProgress {
                        argument: name.to_string(),
                    },
                ))
            }
            Ok(value) => Ok((value, cursor.position())),
            Err(source) => Err(ParseError::new(
                position,
                ParseErrorKind::Argument {
                    argument: name.to_string(),
                    source,
                },
            )),
        }
    }

    /// Scans the flag region starting at `position`.
    fn flag_region(
        &self,
        context: &mut CommandContext<S>,
        node: &'t CommandNode<S>,
        tokens: &[String],
        mut position: usize,
        partial: bool,
    ) -> Result<Stop<'t, S>, Rejection> {
        while let Some(token) = tokens.get(position) {
            let unknown = || {
                argument_error(
                    position,
                    ParseErrorKind::UnknownFlag {
                        flag: token.clone(),
                    },
                )
            };
            let selected: Vec<&'t FlagSpec<S>> = match self.flag_syntax().classify(token) {
                None => {
                    return Err(argument_error(
                        position,
                        ParseErrorKind::UnexpectedToken {
                            token: token.clone(),
                        },
                    ));
                }
                Some(FlagToken::Long(name)) => {
                    vec![node.flags().find(|f| f.matches_long(name)).ok_or_else(unknown)?]
                }
                Some(FlagToken::Short(cluster)) => cluster
                    .chars()
                    .map(|c| node.flags().find(|f| f.matches_short(c)).ok_or_else(unknown))
                    .collect::<Result<_, _>>()?,
            };

            for flag in &selected {
                if context.flags().contains(flag.name()) {
                    return Err(duplicate_flag(position, flag.name()));
                }
            }

            match selected.as_slice() {
                [flag] if flag.is_valued() => {
                    let value_position = position + 1;
                    if partial && value_position == tokens.len() {
                        return Ok(Stop::Flags {
                            node,
                            awaiting: Some(*flag),
                        });
                    }
                    let missing = || {
                        argument_error(
                            position,
                            ParseErrorKind::MissingFlagValue {
                                flag: flag.name().to_string(),
                            },
                        )
                    };
                    let (Some(value_token), Some(parser)) = (tokens.get(value_position), flag.parser())
                    else {
                        return Err(missing());
                    };
                    if self.flag_syntax().is_flag(value_token) {
                        return Err(missing());
                    }
                    let (value, end) = self
                        .run_parser(context, flag.name(), parser.as_ref(), tokens, value_position)
                        .map_err(Rejection::Argument)?;
                    context
                        .flags_mut()
                        .set(flag.name(), Some(value))
                        .map_err(|_| duplicate_flag(position, flag.name()))?;
                    position = end;
                }
                flags => {
                    if let Some(valued) = flags.iter().find(|f| f.is_valued()) {
                        return Err(argument_error(
                            position,
                            ParseErrorKind::MissingFlagValue {
                                flag: valued.name().to_string(),
                            },
                        ));
                    }
                    for flag in flags {
                        context
                            .flags_mut()
                            .set(flag.name(), None)
                            .map_err(|_| duplicate_flag(position, flag.name()))?;
                    }
                    position += 1;
                }
            }
        }
        Ok(Stop::Flags {
            node,
            awaiting: None,
        })
    }

    /// Renders what could follow `consumed` at `node`, e.g. `time set|query`.
    fn expected(&self, consumed: &[String], node: &CommandNode<S>, sender: &S) -> String {
        let mut options: Vec<String> = node
            .literals()
            .filter(|child| self.access(child, sender) == Access::Granted)
            .map(|child| child.name().to_string())
            .collect();
        if let Some((_, arg)) = argument_child(node) {
            options.push(format!("<{}>", arg.name()));
        }
        let prefix = consumed.join(" ");
        match (prefix.is_empty(), options.is_empty()) {
            (_, true) => prefix,
            (true, false) => options.join("|"),
            (false, false) => format!("{prefix} {}", options.join("|")),
        }
    }
}

fn argument_child<S>(node: &CommandNode<S>) -> Option<(&CommandNode<S>, &ArgumentSpec<S>)> {
    node.argument()
        .and_then(|child| child.as_argument().map(|arg| (child, arg)))
}

const fn argument_error(index: usize, kind: ParseErrorKind) -> Rejection {
    Rejection::Argument(ParseError::new(index, kind))
}

fn duplicate_flag(index: usize, name: &str) -> Rejection {
    argument_error(
        index,
        ParseErrorKind::DuplicateFlag {
            flag: name.to_string(),
        },
    )
}

fn bind<S>(
    context: &mut CommandContext<S>,
    name: &str,
    value: Value,
    index: usize,
) -> Result<(), Rejection> {
    context.bind(name, value).map_err(|err| {
        argument_error(
            index,
            ParseErrorKind::Argument {
                argument: name.to_string(),
                source: ArgumentParseError::Custom(err.to_string()),
            },
        )
    })
}

fn bind_default<S>(
    context: &mut CommandContext<S>,
    arg: &ArgumentSpec<S>,
    index: usize,
) -> Result<(), Rejection> {
    match arg.default_value() {
        Some(default) => bind(context, arg.name(), default.clone(), index),
        None => Ok(()),
    }
}
