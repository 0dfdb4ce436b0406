//! Concurrent strategy: handlers run on a tokio runtime.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::context::CommandContext;
use crate::error::ExecutionError;
use crate::observability::metrics;
use crate::sender::Sender;
use crate::tree::{Command, Handler};

use super::{
    ExecutionCoordinator, ExecutionId, ExecutionOutcome, PendingExecution, ResolvedCommand,
    panicked, run_async, run_sync,
};

/// Submits handlers to a tokio runtime and returns immediately.
///
/// Synchronous handlers run on the blocking pool, async handlers as tasks.
/// An optional timeout bounds how long the caller waits; when it elapses the
/// handle reports [`ExecutionError::TimedOut`].
#[derive(Debug, Clone)]
pub struct ConcurrentCoordinator {
    handle: Handle,
    timeout: Option<Duration>,
}

impl ConcurrentCoordinator {
    /// Submits to the runtime behind `handle`.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self {
            handle,
            timeout: None,
        }
    }

    /// Submits to the runtime the caller is running on, if any.
    #[must_use]
    pub fn try_current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Sets an execution timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl<S: Sender> ExecutionCoordinator<S> for ConcurrentCoordinator {
    fn dispatch(&self, resolved: ResolvedCommand<S>) -> PendingExecution {
        let id = ExecutionId::new();
        let (command, mut context) = resolved.into_parts();
        context.assign_execution(id);

        let (pending, reporter) = PendingExecution::channel(id);
        let token = pending.cancellation_token();
        let timeout = self.timeout;
        reporter.dispatched();
        debug!(%id, command = command.syntax(), "submitting command");

        self.handle.spawn(async move {
            let started = Instant::now();
            let work = run_on_worker(Arc::clone(&command), context, token.clone());
            let outcome = tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(%id, "command execution cancelled");
                    ExecutionOutcome::ExecutionFailure(ExecutionError::Cancelled)
                }
                outcome = limited(work, timeout) => outcome,
            };
            metrics::record_execution(command.root(), started.elapsed());
            metrics::record_dispatch(outcome.kind(), Some(command.root()));
            reporter.finish(outcome);
        });
        pending
    }

    fn name(&self) -> &'static str {
        "concurrent"
    }
}

async fn limited(
    work: impl Future<Output = ExecutionOutcome>,
    limit: Option<Duration>,
) -> ExecutionOutcome {
    let Some(limit) = limit else {
        return work.await;
    };
    tokio::time::timeout(limit, work).await.unwrap_or_else(|_| {
        warn!(?limit, "command execution timed out");
        ExecutionOutcome::ExecutionFailure(ExecutionError::TimedOut(limit))
    })
}

async fn run_on_worker<S: Sender>(
    command: Arc<Command<S>>,
    context: CommandContext<S>,
    token: CancellationToken,
) -> ExecutionOutcome {
    match command.handler().clone() {
        Handler::Sync(handler) => {
            let job_command = Arc::clone(&command);
            let job = tokio::task::spawn_blocking(move || {
                if token.is_cancelled() {
                    return ExecutionOutcome::ExecutionFailure(ExecutionError::Cancelled);
                }
                run_sync(&job_command, &handler, &context)
            });
            match job.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_panic() => panicked(&command, err.into_panic().as_ref()),
                Err(_) => ExecutionOutcome::ExecutionFailure(ExecutionError::WorkerLost),
            }
        }
        Handler::Async(handler) => run_async(&command, handler, Arc::new(context)).await,
    }
}
