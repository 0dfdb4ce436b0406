//! Execution coordination.
//!
//! A coordinator decides where a resolved command's handler runs. Every
//! dispatch returns a [`PendingExecution`], already complete for the inline
//! strategy and completed later by a worker for the concurrent one. Both
//! strategies classify handler errors and panics the same way, and both run
//! the handler at most once: [`ResolvedCommand`] is consumed by `dispatch`.

mod concurrent;
mod inline;

pub use concurrent::ConcurrentCoordinator;
pub use inline::InlineCoordinator;

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::context::CommandContext;
use crate::error::{ExecutionError, ParseError};
use crate::tree::{AsyncCommandHandler, Command, HandlerResult, SyncHandler};
use crate::walker::Rejection;

/// Identifier of one dispatched invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
    /// A fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of an invocation: `Resolved → Dispatched → {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Arguments are bound; nothing has run yet.
    Resolved,
    /// Handed to a worker.
    Dispatched,
    /// Finished with a successful outcome.
    Completed,
    /// Finished with any other outcome.
    Failed,
}

impl ExecutionState {
    const fn to_u8(self) -> u8 {
        match self {
            Self::Resolved => 0,
            Self::Dispatched => 1,
            Self::Completed => 2,
            Self::Failed => 3,
        }
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Resolved,
            1 => Self::Dispatched,
            2 => Self::Completed,
            _ => Self::Failed,
        }
    }

    /// Whether the invocation has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug)]
struct StateCell(AtomicU8);

impl StateCell {
    const fn new(state: ExecutionState) -> Self {
        Self(AtomicU8::new(state.to_u8()))
    }

    fn load(&self) -> ExecutionState {
        ExecutionState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn store(&self, state: ExecutionState) {
        self.0.store(state.to_u8(), Ordering::Release);
    }
}

/// A command with its arguments bound, ready to dispatch.
#[derive(Debug)]
pub struct ResolvedCommand<S> {
    command: Arc<Command<S>>,
    context: CommandContext<S>,
}

impl<S> ResolvedCommand<S> {
    pub(crate) const fn new(command: Arc<Command<S>>, context: CommandContext<S>) -> Self {
        Self { command, context }
    }

    /// The matched command.
    #[must_use]
    pub const fn command(&self) -> &Arc<Command<S>> {
        &self.command
    }

    /// The bound context.
    #[must_use]
    pub const fn context(&self) -> &CommandContext<S> {
        &self.context
    }

    /// Splits into command and context.
    #[must_use]
    pub fn into_parts(self) -> (Arc<Command<S>>, CommandContext<S>) {
        (self.command, self.context)
    }
}

/// Comparable classification of an [`ExecutionOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// The handler succeeded.
    Success,
    /// No command matched.
    NoSuchCommand,
    /// Several literals matched.
    Ambiguous,
    /// A token failed to parse.
    ArgumentError,
    /// The sender lacks permission.
    PermissionDenied,
    /// The sender type is not accepted.
    WrongSenderType,
    /// The handler ran and failed.
    ExecutionFailure,
}

impl OutcomeKind {
    /// Stable label, used in metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NoSuchCommand => "no_such_command",
            Self::Ambiguous => "ambiguous",
            Self::ArgumentError => "argument_error",
            Self::PermissionDenied => "permission_denied",
            Self::WrongSenderType => "wrong_sender_type",
            Self::ExecutionFailure => "execution_failure",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a dispatch attempt.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The handler returned this value.
    Success(serde_json::Value),
    /// No command matched the first token.
    NoSuchCommand {
        /// Nearest accessible command name.
        closest: Option<String>,
    },
    /// Several sibling literals matched.
    Ambiguous {
        /// The matching names.
        candidates: Vec<String>,
    },
    /// Parsing failed at a token index.
    ArgumentError(ParseError),
    /// The sender may not run the command.
    PermissionDenied,
    /// The command does not accept this sender type.
    WrongSenderType,
    /// The handler failed, panicked, timed out or was cancelled.
    ExecutionFailure(ExecutionError),
}

impl ExecutionOutcome {
    /// Classification without payload.
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::NoSuchCommand { .. } => OutcomeKind::NoSuchCommand,
            Self::Ambiguous { .. } => OutcomeKind::Ambiguous,
            Self::ArgumentError(_) => OutcomeKind::ArgumentError,
            Self::PermissionDenied => OutcomeKind::PermissionDenied,
            Self::WrongSenderType => OutcomeKind::WrongSenderType,
            Self::ExecutionFailure(_) => OutcomeKind::ExecutionFailure,
        }
    }

    /// Whether the handler ran and succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(value) => value.fmt(f),
            Self::NoSuchCommand { closest } => Rejection::NoSuchCommand {
                closest: closest.clone(),
            }
            .fmt(f),
            Self::Ambiguous { candidates } => {
                write!(f, "ambiguous input, matches: {}", candidates.join(", "))
            }
            Self::ArgumentError(err) => err.fmt(f),
            Self::PermissionDenied => Rejection::PermissionDenied.fmt(f),
            Self::WrongSenderType => Rejection::WrongSenderType.fmt(f),
            Self::ExecutionFailure(err) => err.fmt(f),
        }
    }
}

impl From<Rejection> for ExecutionOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::NoSuchCommand { closest } => Self::NoSuchCommand { closest },
            Rejection::Ambiguous { candidates } => Self::Ambiguous { candidates },
            Rejection::Argument(err) => Self::ArgumentError(err),
            Rejection::PermissionDenied => Self::PermissionDenied,
            Rejection::WrongSenderType => Self::WrongSenderType,
        }
    }
}

/// Strategy that runs resolved commands.
pub trait ExecutionCoordinator<S>: Send + Sync {
    /// Starts the handler of `resolved`.
    ///
    /// The handler runs at most once. Failures are reported through the
    /// returned handle, never by panicking.
    fn dispatch(&self, resolved: ResolvedCommand<S>) -> PendingExecution;

    /// Strategy name, for logs.
    fn name(&self) -> &'static str;
}

/// Handle to an invocation that may still be running.
#[derive(Debug)]
pub struct PendingExecution {
    id: ExecutionId,
    state: Arc<StateCell>,
    receiver: Option<oneshot::Receiver<ExecutionOutcome>>,
    result: Option<ExecutionOutcome>,
    cancel: CancellationToken,
}

impl PendingExecution {
    /// A handle that is already finished with `outcome`.
    pub(crate) fn completed(id: ExecutionId, outcome: ExecutionOutcome) -> Self {
        Self {
            id,
            state: Arc::new(StateCell::new(terminal_state(&outcome))),
            receiver: None,
            result: Some(outcome),
            cancel: CancellationToken::new(),
        }
    }

    /// A handle completed later through the returned [`Reporter`].
    pub(crate) fn channel(id: ExecutionId) -> (Self, Reporter) {
        let (sender, receiver) = oneshot::channel();
        let state = Arc::new(StateCell::new(ExecutionState::Resolved));
        let pending = Self {
            id,
            state: Arc::clone(&state),
            receiver: Some(receiver),
            result: None,
            cancel: CancellationToken::new(),
        };
        let reporter = Reporter { id, state, sender };
        (pending, reporter)
    }

    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Identifier shared with the handler's context.
    #[must_use]
    pub const fn id(&self) -> ExecutionId {
        self.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ExecutionState {
        self.state.load()
    }

    /// Whether the outcome is available.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Takes the outcome if it is ready, without waiting.
    ///
    /// Returns `None` while the handler is running and after the outcome has
    /// been taken.
    pub fn try_take(&mut self) -> Option<ExecutionOutcome> {
        if let Some(outcome) = self.result.take() {
            return Some(outcome);
        }
        let receiver = self.receiver.as_mut()?;
        match receiver.try_recv() {
            Ok(outcome) => {
                self.receiver = None;
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.receiver = None;
                Some(worker_lost())
            }
        }
    }

    /// Waits for the outcome.
    pub async fn wait(mut self) -> ExecutionOutcome {
        if let Some(outcome) = self.result.take() {
            return outcome;
        }
        match self.receiver.take() {
            Some(receiver) => receiver.await.unwrap_or_else(|_| worker_lost()),
            None => worker_lost(),
        }
    }

    /// Blocks the calling thread until the outcome is available.
    ///
    /// Must not be called from inside an async task; use [`wait`](Self::wait).
    #[must_use]
    pub fn wait_blocking(self) -> ExecutionOutcome {
        futures::executor::block_on(self.wait())
    }

    /// Waits at most `limit` for the outcome.
    ///
    /// Returns `None` if the handler is still running when `limit` elapses;
    /// the handle stays usable.
    pub async fn wait_timeout(&mut self, limit: Duration) -> Option<ExecutionOutcome> {
        if let Some(outcome) = self.result.take() {
            return Some(outcome);
        }
        let receiver = self.receiver.as_mut()?;
        let outcome = match tokio::time::timeout(limit, receiver).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => worker_lost(),
            Err(_) => return None,
        };
        self.receiver = None;
        Some(outcome)
    }

    /// Requests cancellation.
    ///
    /// A handler that has not started yet never starts. One already running
    /// finishes, but its result is discarded and the handle reports
    /// [`ExecutionError::Cancelled`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Completes a [`PendingExecution`] from a worker.
#[derive(Debug)]
pub(crate) struct Reporter {
    id: ExecutionId,
    state: Arc<StateCell>,
    sender: oneshot::Sender<ExecutionOutcome>,
}

impl Reporter {
    pub(crate) fn dispatched(&self) {
        self.state.store(ExecutionState::Dispatched);
    }

    pub(crate) fn finish(self, outcome: ExecutionOutcome) {
        self.state.store(terminal_state(&outcome));
        if self.sender.send(outcome).is_err() {
            debug!(id = %self.id, "pending execution dropped before completion");
        }
    }
}

const fn terminal_state(outcome: &ExecutionOutcome) -> ExecutionState {
    if outcome.is_success() {
        ExecutionState::Completed
    } else {
        ExecutionState::Failed
    }
}

const fn worker_lost() -> ExecutionOutcome {
    ExecutionOutcome::ExecutionFailure(ExecutionError::WorkerLost)
}

/// Runs a synchronous handler, turning errors and panics into outcomes.
pub(crate) fn run_sync<S>(
    command: &Command<S>,
    handler: &SyncHandler<S>,
    context: &CommandContext<S>,
) -> ExecutionOutcome {
    match catch_unwind(AssertUnwindSafe(|| handler(context))) {
        Ok(result) => settle(command, result),
        Err(payload) => panicked(command, payload.as_ref()),
    }
}

/// Runs an async handler, turning errors and panics into outcomes.
pub(crate) async fn run_async<S>(
    command: &Command<S>,
    handler: Arc<dyn AsyncCommandHandler<S>>,
    context: Arc<CommandContext<S>>,
) -> ExecutionOutcome {
    match AssertUnwindSafe(handler.handle(context)).catch_unwind().await {
        Ok(result) => settle(command, result),
        Err(payload) => panicked(command, payload.as_ref()),
    }
}

fn settle<S>(command: &Command<S>, result: HandlerResult) -> ExecutionOutcome {
    match result {
        Ok(value) => ExecutionOutcome::Success(value),
        Err(cause) => {
            warn!(command = command.syntax(), error = %cause, "command handler failed");
            ExecutionOutcome::ExecutionFailure(ExecutionError::Handler(cause))
        }
    }
}

pub(crate) fn panicked<S>(command: &Command<S>, payload: &(dyn Any + Send)) -> ExecutionOutcome {
    let message = panic_message(payload);
    warn!(command = command.syntax(), panic = %message, "command handler panicked");
    ExecutionOutcome::ExecutionFailure(ExecutionError::Panicked(message))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
