//! Listeners observing tree execution.
//!
//! The executor reports progress through an [`ExecutionListener`].
//! Notifications for one node always arrive in a fixed shape: either
//! `execution_skipped` once, or `execution_started` followed by exactly
//! one `execution_finished`. A container's notifications enclose those
//! of its children.
//!
//! Listener methods take `&self` and must be callable from worker
//! threads; implementations that accumulate state use interior
//! mutability, as [`EventLog`] and [`SummaryListener`] do.

use core::fmt;
use std::sync::Arc;

use gauntlet_node::outcome::Outcome;
use parking_lot::Mutex;

use crate::descriptor::{Descriptor, NodeId};
use crate::events::ExecutionEvent;

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionListener
// ─────────────────────────────────────────────────────────────────────────────

/// Receives execution notifications. All methods default to doing
/// nothing, so implementors only override what they observe.
pub trait ExecutionListener: Send + Sync {
    /// The node began executing.
    fn execution_started(&self, _descriptor: &Descriptor) {}

    /// The node and its whole subtree were bypassed. A skipped node
    /// never starts and never finishes.
    fn execution_skipped(&self, _descriptor: &Descriptor, _reason: &str) {}

    /// The node finished with its terminal outcome. Reported exactly
    /// once per started node.
    fn execution_finished(&self, _descriptor: &Descriptor, _outcome: &Outcome) {}
}

/// A listener that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl ExecutionListener for NoopListener {}

// ─────────────────────────────────────────────────────────────────────────────
// EventLog
// ─────────────────────────────────────────────────────────────────────────────

/// Records every notification as an [`ExecutionEvent`], in arrival
/// order.
///
/// # Example
///
/// ```
/// use gauntlet_engine::listener::EventLog;
///
/// let log = EventLog::new();
/// // ... run a tree with `&log` as the listener ...
/// for event in log.snapshot() {
///     println!("{event}");
/// }
/// ```
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<ExecutionEvent>>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ExecutionEvent> {
        self.events.lock().clone()
    }

    /// How many events have been recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ExecutionListener for EventLog {
    fn execution_started(&self, descriptor: &Descriptor) {
        self.events.lock().push(ExecutionEvent::Started { id: descriptor.id().clone() });
    }

    fn execution_skipped(&self, descriptor: &Descriptor, reason: &str) {
        self.events.lock().push(ExecutionEvent::Skipped {
            id: descriptor.id().clone(),
            reason: reason.to_owned(),
        });
    }

    fn execution_finished(&self, descriptor: &Descriptor, outcome: &Outcome) {
        self.events.lock().push(ExecutionEvent::Finished {
            id: descriptor.id().clone(),
            outcome: outcome.clone(),
        });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CompositeListener
// ─────────────────────────────────────────────────────────────────────────────

/// Fans every notification out to a list of listeners.
///
/// Listeners are invoked in registration order for every notification.
#[derive(Default)]
pub struct CompositeListener {
    listeners: Vec<Arc<dyn ExecutionListener>>,
}

impl CompositeListener {
    /// Creates an empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener, builder style.
    #[must_use]
    pub fn with(mut self, listener: Arc<dyn ExecutionListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Adds a listener.
    pub fn push(&mut self, listener: Arc<dyn ExecutionListener>) {
        self.listeners.push(listener);
    }

    /// How many listeners are registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns `true` if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl ExecutionListener for CompositeListener {
    fn execution_started(&self, descriptor: &Descriptor) {
        for listener in &self.listeners {
            listener.execution_started(descriptor);
        }
    }

    fn execution_skipped(&self, descriptor: &Descriptor, reason: &str) {
        for listener in &self.listeners {
            listener.execution_skipped(descriptor, reason);
        }
    }

    fn execution_finished(&self, descriptor: &Descriptor, outcome: &Outcome) {
        for listener in &self.listeners {
            listener.execution_finished(descriptor, outcome);
        }
    }
}

impl fmt::Debug for CompositeListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeListener")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SummaryListener
// ─────────────────────────────────────────────────────────────────────────────

/// One failed or aborted node, as recorded by [`SummaryListener`].
#[derive(Debug, Clone)]
pub struct FailureDetail {
    /// The node that finished abnormally.
    pub id: NodeId,
    /// The rendered cause.
    pub message: String,
}

/// Tallies of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Nodes that finished successfully.
    pub successful: usize,
    /// Nodes that declined to complete.
    pub aborted: usize,
    /// Nodes that failed.
    pub failed: usize,
    /// Nodes bypassed by a skip decision.
    pub skipped: usize,
    /// Details for every aborted or failed node, in finish order.
    pub failures: Vec<FailureDetail>,
    /// The run's aggregate verdict: every finished outcome folded by
    /// severity, where failed dominates aborted dominates successful.
    pub worst: Outcome,
}

impl RunSummary {
    /// Every node the run touched, finished or skipped.
    #[must_use]
    pub fn total(&self) -> usize {
        self.successful + self.aborted + self.failed + self.skipped
    }

    /// Returns `true` if no node failed. Aborts and skips do not count
    /// as failures.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self {
            successful: 0,
            aborted: 0,
            failed: 0,
            skipped: 0,
            failures: Vec::new(),
            worst: Outcome::Successful,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} successful, {} failed, {} aborted, {} skipped",
            self.successful, self.failed, self.aborted, self.skipped
        )
    }
}

/// Accumulates a [`RunSummary`] as notifications arrive.
#[derive(Debug, Default)]
pub struct SummaryListener {
    inner: Mutex<RunSummary>,
}

impl SummaryListener {
    /// Creates a listener with empty tallies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies out the tallies accumulated so far.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.inner.lock().clone()
    }
}

impl ExecutionListener for SummaryListener {
    fn execution_skipped(&self, _descriptor: &Descriptor, _reason: &str) {
        self.inner.lock().skipped += 1;
    }

    fn execution_finished(&self, descriptor: &Descriptor, outcome: &Outcome) {
        let mut summary = self.inner.lock();
        match outcome {
            Outcome::Successful => summary.successful += 1,
            Outcome::Aborted(cause) => {
                summary.aborted += 1;
                summary.failures.push(FailureDetail {
                    id: descriptor.id().clone(),
                    message: cause.to_string(),
                });
            }
            Outcome::Failed(cause) => {
                summary.failed += 1;
                summary.failures.push(FailureDetail {
                    id: descriptor.id().clone(),
                    message: cause.to_string(),
                });
            }
        }
        summary.worst = summary.worst.clone().worse(outcome.clone());
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingListener
// ─────────────────────────────────────────────────────────────────────────────

/// Forwards notifications to [`tracing`].
///
/// Successful progress is logged at `DEBUG`, skips and aborts at
/// `INFO`, failures at `WARN`. Pair with
/// [`TraceConfig`](crate::trace::TraceConfig) to get output on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl ExecutionListener for TracingListener {
    fn execution_started(&self, descriptor: &Descriptor) {
        tracing::debug!(id = %descriptor.id(), kind = %descriptor.kind(), "node started");
    }

    fn execution_skipped(&self, descriptor: &Descriptor, reason: &str) {
        tracing::info!(id = %descriptor.id(), reason, "node skipped");
    }

    fn execution_finished(&self, descriptor: &Descriptor, outcome: &Outcome) {
        match outcome {
            Outcome::Successful => {
                tracing::debug!(id = %descriptor.id(), "node finished");
            }
            Outcome::Aborted(cause) => {
                tracing::info!(id = %descriptor.id(), %cause, "node aborted");
            }
            Outcome::Failed(cause) => {
                tracing::warn!(id = %descriptor.id(), %cause, "node failed");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
