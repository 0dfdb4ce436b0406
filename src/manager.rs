//! The integrator-facing entry point.
//!
//! A [`CommandManager`] owns a frozen [`CommandTree`] together with the
//! strategies used around it: how handlers run, how permissions are checked
//! and how suggestions are post-processed. All dispatch-time problems come
//! back as values; nothing here panics on user input.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{CoordinatorKind, EngineConfig};
use crate::error::ConfigError;
use crate::execution::{
    ConcurrentCoordinator, ExecutionCoordinator, ExecutionId, ExecutionOutcome,
    InlineCoordinator, PendingExecution, ResolvedCommand,
};
use crate::observability::metrics;
use crate::sender::{PermissionChecker, Sender, SenderPermissions};
use crate::suggestion::{FilteringSuggestionProcessor, SuggestionProcessor};
use crate::tokenizer::Tokenizer;
use crate::tree::CommandTree;
use crate::walker::{Rejection, Walker};

/// One line of help output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpEntry {
    /// Rendered syntax.
    pub syntax: String,
    /// Description, if the command has one.
    pub description: Option<String>,
}

/// Parses, suggests and dispatches commands against one tree.
pub struct CommandManager<S> {
    tree: Arc<CommandTree<S>>,
    coordinator: Arc<dyn ExecutionCoordinator<S>>,
    checker: Arc<dyn PermissionChecker<S>>,
    processor: Arc<dyn SuggestionProcessor>,
    tokenizer: Tokenizer,
}

impl<S> std::fmt::Debug for CommandManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandManager")
            .field("commands", &self.tree.len())
            .field("coordinator", &self.coordinator.name())
            .field("tokenizer", &self.tokenizer)
            .finish_non_exhaustive()
    }
}

impl<S: Sender> CommandManager<S> {
    /// Freezes `tree` and dispatches through `coordinator`.
    ///
    /// Permissions are checked by asking the sender, and suggestions are
    /// prefix-filtered without a cap.
    pub fn new(tree: CommandTree<S>, coordinator: impl ExecutionCoordinator<S> + 'static) -> Self {
        metrics::record_registered_commands(tree.len());
        Self {
            tree: Arc::new(tree),
            coordinator: Arc::new(coordinator),
            checker: Arc::new(SenderPermissions),
            processor: Arc::new(FilteringSuggestionProcessor::new()),
            tokenizer: Tokenizer::default(),
        }
    }

    /// Builds a manager following `config`.
    ///
    /// The tree should have been created with
    /// [`EngineConfig::tree_settings`]; a mismatch is logged.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the timeout is malformed or
    /// the concurrent coordinator is requested outside a tokio runtime.
    pub fn from_config(tree: CommandTree<S>, config: &EngineConfig) -> Result<Self, ConfigError> {
        if tree.settings() != &config.tree_settings() {
            warn!("tree settings differ from the engine configuration");
        }
        let manager = match config.coordinator {
            CoordinatorKind::Inline => Self::new(tree, InlineCoordinator),
            CoordinatorKind::Concurrent => {
                let mut coordinator =
                    ConcurrentCoordinator::try_current().ok_or_else(|| ConfigError::InvalidValue {
                        field: "coordinator".to_string(),
                        value: "concurrent".to_string(),
                        expected: "a running tokio runtime".to_string(),
                    })?;
                if let Some(timeout) = config.timeout()? {
                    coordinator = coordinator.with_timeout(timeout);
                }
                Self::new(tree, coordinator)
            }
        };
        let processor = config
            .max_suggestions
            .map_or_else(FilteringSuggestionProcessor::new, |max| {
                FilteringSuggestionProcessor::new().with_max(max)
            });
        Ok(manager
            .with_suggestion_processor(processor)
            .with_command_prefix(config.command_prefix.clone()))
    }

    /// Replaces the permission checker.
    #[must_use]
    pub fn with_permission_checker(
        mut self,
        checker: impl PermissionChecker<S> + 'static,
    ) -> Self {
        self.checker = Arc::new(checker);
        self
    }

    /// Replaces the suggestion processor.
    #[must_use]
    pub fn with_suggestion_processor(
        mut self,
        processor: impl SuggestionProcessor + 'static,
    ) -> Self {
        self.processor = Arc::new(processor);
        self
    }

    /// Strips `prefix` (e.g. `/`) from input before tokenizing.
    #[must_use]
    pub fn with_command_prefix(mut self, prefix: Option<String>) -> Self {
        self.tokenizer = Tokenizer::new(prefix);
        self
    }

    /// The frozen tree.
    #[must_use]
    pub const fn tree(&self) -> &Arc<CommandTree<S>> {
        &self.tree
    }

    /// Name of the active coordinator.
    #[must_use]
    pub fn coordinator_name(&self) -> &'static str {
        self.coordinator.name()
    }

    fn walker(&self) -> Walker<'_, S> {
        Walker::new(&self.tree, self.checker.as_ref())
    }

    /// Resolves `input` without running anything.
    ///
    /// # Errors
    ///
    /// Returns the [`Rejection`] explaining why no command matched.
    pub fn resolve(&self, sender: Arc<S>, input: &str) -> Result<ResolvedCommand<S>, Rejection> {
        self.walker().resolve(sender, self.tokenizer.tokenize(input))
    }

    /// Resolves `input` and hands it to the coordinator.
    ///
    /// Rejections come back as an already finished handle.
    pub fn execute(&self, sender: Arc<S>, input: &str) -> PendingExecution {
        let tokens = self.tokenizer.tokenize(input);
        match self.walker().resolve(Arc::clone(&sender), tokens.clone()) {
            Ok(resolved) => self.coordinator.dispatch(resolved),
            Err(rejection) => {
                debug!(sender = sender.name(), %rejection, "input rejected");
                let outcome = ExecutionOutcome::from(rejection);
                metrics::record_dispatch(outcome.kind(), self.root_label(tokens.first()));
                PendingExecution::completed(ExecutionId::new(), outcome)
            }
        }
    }

    /// Parses and runs `input`, blocking until the outcome is known.
    ///
    /// Call [`execute_async`](Self::execute_async) instead from async code.
    pub fn parse_and_execute(&self, sender: Arc<S>, input: &str) -> ExecutionOutcome {
        self.execute(sender, input).wait_blocking()
    }

    /// Parses and runs `input`, awaiting the outcome.
    pub async fn execute_async(&self, sender: Arc<S>, input: &str) -> ExecutionOutcome {
        self.execute(sender, input).wait().await
    }

    /// Completions for the last token of `input`.
    ///
    /// A trailing space means a new, empty token is being completed.
    pub fn suggest(&self, sender: Arc<S>, input: &str) -> Vec<String> {
        let tokens = self.tokenizer.tokenize_partial(input);
        let partial = tokens.partial().to_string();
        let raw = self.walker().suggest(sender, tokens);
        let suggestions = self.processor.process(&partial, raw);
        debug!(partial = %partial, count = suggestions.len(), "computed suggestions");
        metrics::record_suggestions(suggestions.len());
        suggestions
    }

    /// Syntax and description of every command `sender` may run.
    pub fn help(&self, sender: &S) -> Vec<HelpEntry> {
        self.tree
            .commands()
            .iter()
            .filter(|command| {
                command.requirement().accepts(sender)
                    && command.permission().allows(sender, self.checker.as_ref())
            })
            .map(|command| HelpEntry {
                syntax: command.syntax().to_string(),
                description: command.description().map(str::to_string),
            })
            .collect()
    }

    /// Registered root name for a metrics label, if `token` names one.
    fn root_label(&self, token: Option<&String>) -> Option<&str> {
        let token = token?;
        let case_insensitive = self.tree.settings().case_insensitive;
        self.tree
            .root()
            .literals()
            .find_map(|node| node.as_literal().filter(|l| l.matches(token, case_insensitive)))
            .map(|literal| literal.name())
    }
}
