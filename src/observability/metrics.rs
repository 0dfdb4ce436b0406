//! Metrics for `cmdtree`.
//!
//! Prometheus-compatible counters and histograms. Command labels only ever
//! carry the root literal of a registered command; anything else is bucketed
//! as `"__unknown__"` so user input cannot grow label cardinality.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::error::CmdTreeError;
use crate::execution::OutcomeKind;

/// Guard to prevent double-initialization of the metrics recorder.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Label used for input that did not reach a registered command.
pub const UNKNOWN_LABEL: &str = "__unknown__";

/// Label value for a command root, or [`UNKNOWN_LABEL`].
#[must_use]
pub fn command_label(root: Option<&str>) -> String {
    root.map_or_else(|| UNKNOWN_LABEL.to_owned(), str::to_owned)
}

/// Initializes the global metrics recorder.
///
/// When `port` is `Some`, a Prometheus HTTP listener is started on
/// `127.0.0.1:<port>`. When `None`, the recorder is installed without an
/// HTTP endpoint.
///
/// # Errors
///
/// Returns `CmdTreeError::Io` if the recorder or HTTP listener cannot be
/// installed (e.g. port already in use).
pub fn init_metrics(port: Option<u16>) -> Result<(), CmdTreeError> {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        tracing::debug!("metrics already initialized, skipping");
        return Ok(());
    }
    port.map_or_else(
        || PrometheusBuilder::new().install_recorder().map(|_| ()),
        |p| {
            PrometheusBuilder::new()
                .with_http_listener(([127, 0, 0, 1], p))
                .install()
        },
    )
    .map_err(|e| CmdTreeError::Io(std::io::Error::other(e.to_string())))?;

    describe_metrics();
    Ok(())
}

fn describe_metrics() {
    describe_counter!(
        "cmdtree_dispatch_total",
        "Dispatch attempts by outcome and command"
    );
    describe_counter!(
        "cmdtree_suggestions_total",
        "Suggestion requests served"
    );
    describe_histogram!(
        "cmdtree_execution_duration_ms",
        "Handler execution duration in milliseconds"
    );
    describe_gauge!(
        "cmdtree_registered_commands",
        "Commands registered in the active tree"
    );
}

/// Records a dispatch attempt.
pub fn record_dispatch(outcome: OutcomeKind, root: Option<&str>) {
    counter!(
        "cmdtree_dispatch_total",
        "outcome" => outcome.as_str(),
        "command" => command_label(root),
    )
    .increment(1);
}

/// Records a served suggestion request.
pub fn record_suggestions(count: usize) {
    counter!("cmdtree_suggestions_total", "empty" => if count == 0 { "true" } else { "false" })
        .increment(1);
}

/// Records how long a handler ran.
pub fn record_execution(root: &str, duration: Duration) {
    histogram!("cmdtree_execution_duration_ms", "command" => root.to_owned())
        .record(duration.as_secs_f64() * 1000.0);
}

/// Sets the registered-command gauge.
#[allow(clippy::cast_precision_loss)]
pub fn record_registered_commands(count: usize) {
    gauge!("cmdtree_registered_commands").set(count as f64);
}
