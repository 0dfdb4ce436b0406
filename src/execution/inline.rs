//! Inline strategy: the handler runs on the dispatching thread.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::observability::metrics;
use crate::sender::Sender;
use crate::tree::Handler;

use super::{
    ExecutionCoordinator, ExecutionId, PendingExecution, ResolvedCommand, run_async, run_sync,
};

/// Runs handlers on the calling thread and returns a finished handle.
///
/// Async handlers are driven with a local executor. They may await tokio
/// timers or I/O only when dispatched from a thread of a multi-threaded
/// runtime; otherwise use [`ConcurrentCoordinator`](super::ConcurrentCoordinator).
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineCoordinator;

impl InlineCoordinator {
    /// Creates the coordinator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<S: Sender> ExecutionCoordinator<S> for InlineCoordinator {
    fn dispatch(&self, resolved: ResolvedCommand<S>) -> PendingExecution {
        let id = ExecutionId::new();
        let (command, mut context) = resolved.into_parts();
        context.assign_execution(id);
        debug!(%id, command = command.syntax(), "running command inline");

        let started = Instant::now();
        let outcome = match command.handler() {
            Handler::Sync(handler) => run_sync(&command, handler, &context),
            Handler::Async(handler) => futures::executor::block_on(run_async(
                &command,
                Arc::clone(handler),
                Arc::new(context),
            )),
        };
        metrics::record_execution(command.root(), started.elapsed());
        metrics::record_dispatch(outcome.kind(), Some(command.root()));
        PendingExecution::completed(id, outcome)
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}
