//! The recursive tree executor.
//!
//! [`TreeExecutor::execute`] walks a [`NodeTree`] from the root, giving
//! every node the same treatment: derive a context, consult the skip
//! check, then run the leaf body or the container's hooks and children.
//! Each node's result is classified through the closed
//! [`HookError`] vocabulary, so recoverable problems always become node
//! outcomes while fatal errors halt the run and surface as
//! [`FatalError`].
//!
//! Containers hand their children to the configured
//! [`Scheduler`](crate::scheduler::Scheduler) as one batch. With the
//! default configuration that is the inline scheduler, which makes
//! execution fully sequential and deterministic; turning on
//! [`ExecutionConfig::with_parallel`] swaps in a worker pool without
//! changing any of the notification guarantees.

use core::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use gauntlet_node::context::ExecutionContext;
use gauntlet_node::error::{Cause, HookError};
use gauntlet_node::node::{Container, Leaf, Node, NodeKind};
use gauntlet_node::outcome::Outcome;
use gauntlet_node::skip::SkipDecision;
use parking_lot::Mutex;

use crate::descriptor::{Descriptor, NodeId};
use crate::listener::ExecutionListener;
use crate::scheduler::{
    ExecutionMode, SameThreadScheduler, Scheduler, ThreadPoolScheduler, UnitOfWork,
};
use crate::tree::{NodeIndex, NodeTree};

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Tuning knobs for [`TreeExecutor`].
///
/// The default configuration runs everything sequentially on the
/// calling thread. Parallelism is opt-in: enable it with
/// [`with_parallel`](Self::with_parallel) and give the pool a size. A
/// parallel configuration without a pool size falls back to sequential
/// execution with a diagnostic rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    parallel: bool,
    pool_size: usize,
    parallel_containers: bool,
    parallel_leaves: bool,
}

impl ExecutionConfig {
    /// The sequential default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables parallel execution.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the worker pool size used when parallelism is enabled.
    #[must_use]
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Controls whether container nodes may run on worker threads.
    #[must_use]
    pub fn with_parallel_containers(mut self, parallel_containers: bool) -> Self {
        self.parallel_containers = parallel_containers;
        self
    }

    /// Controls whether leaf nodes may run on worker threads.
    #[must_use]
    pub fn with_parallel_leaves(mut self, parallel_leaves: bool) -> Self {
        self.parallel_leaves = parallel_leaves;
        self
    }

    /// Whether parallel execution is enabled.
    #[must_use]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// The configured worker pool size.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Whether container nodes may run on worker threads.
    #[must_use]
    pub fn parallel_containers(&self) -> bool {
        self.parallel_containers
    }

    /// Whether leaf nodes may run on worker threads.
    #[must_use]
    pub fn parallel_leaves(&self) -> bool {
        self.parallel_leaves
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { parallel: false, pool_size: 0, parallel_containers: true, parallel_leaves: true }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ExecutionStats
// ─────────────────────────────────────────────────────────────────────────────

/// Counters for one run, derived from the notifications it emitted.
///
/// Nodes that never ran because the run halted appear in neither
/// counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionStats {
    /// Nodes that started executing.
    pub nodes_started: usize,
    /// Nodes bypassed by a skip decision. A skipped container counts
    /// once; its children are not visited at all.
    pub nodes_skipped: usize,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

// ─────────────────────────────────────────────────────────────────────────────
// FatalError
// ─────────────────────────────────────────────────────────────────────────────

/// An unrecoverable error that terminated the run.
///
/// The wrapped [`Cause`] is the exact error object the failing hook
/// produced; it is never rewrapped on its way out, so callers can
/// identify it with [`Cause::ptr_eq`].
#[derive(Debug, Clone)]
pub struct FatalError {
    id: NodeId,
    cause: Cause,
}

impl FatalError {
    fn new(id: NodeId, cause: Cause) -> Self {
        Self { id, cause }
    }

    /// The node whose hook raised the fatal error.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The underlying error.
    #[must_use]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// Unwraps the underlying error.
    #[must_use]
    pub fn into_cause(self) -> Cause {
        self.cause
    }
}

impl fmt::Display for FatalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fatal error at {}: {}", self.id, self.cause)
    }
}

impl core::error::Error for FatalError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(self.cause.inner())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TreeExecutor
// ─────────────────────────────────────────────────────────────────────────────

/// Executes node trees.
///
/// An executor is configured once and can run any number of trees; it
/// holds no per-run state. The same recursive walk drives sequential
/// and parallel runs, so behavior differs only in where child batches
/// execute.
///
/// # Example
///
/// ```
/// use gauntlet_engine::executor::TreeExecutor;
/// use gauntlet_engine::listener::EventLog;
/// use gauntlet_engine::tree::NodeTree;
/// use gauntlet_node::node::{ContainerHooks, FunctionLeaf};
///
/// let mut tree = NodeTree::new("suite", ContainerHooks::new());
/// tree.add_leaf(tree.root(), "works", FunctionLeaf::new(|_context: ()| Ok(())))?;
///
/// let log = EventLog::new();
/// let stats = TreeExecutor::new().execute(&tree, (), &log)?;
/// assert_eq!(stats.nodes_started, 2);
/// # Ok::<(), Box<dyn core::error::Error>>(())
/// ```
pub struct TreeExecutor {
    config: ExecutionConfig,
    scheduler: Box<dyn Scheduler>,
}

impl TreeExecutor {
    /// An executor with the sequential default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ExecutionConfig::default())
    }

    /// An executor with the given configuration.
    ///
    /// The scheduler is chosen from the configuration: sequential
    /// configurations run inline, parallel ones get a worker pool. A
    /// parallel configuration whose pool cannot be built (size zero, or
    /// thread spawning failed) falls back to inline execution and logs
    /// a warning.
    #[must_use]
    pub fn with_config(config: ExecutionConfig) -> Self {
        let scheduler = build_scheduler(&config);
        Self { config, scheduler }
    }

    /// Replaces the scheduler, keeping the configuration's parallelism
    /// flags for per-kind placement decisions.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// The configuration this executor was built with.
    #[must_use]
    pub fn config(&self) -> ExecutionConfig {
        self.config
    }

    /// Runs `tree` against `context`, reporting to `listener`.
    ///
    /// The context is handed to the root; every node derives its own
    /// from its parent's. The call returns once the whole tree has been
    /// visited, whether sequentially or on worker threads.
    ///
    /// # Errors
    ///
    /// Returns the first [`FatalError`] raised by any hook. Failures
    /// and aborts are not errors here; they are node outcomes, reported
    /// through the listener.
    pub fn execute<C: ExecutionContext>(
        &self,
        tree: &NodeTree<C>,
        context: C,
        listener: &dyn ExecutionListener,
    ) -> Result<ExecutionStats, FatalError> {
        let walk = Walk {
            tree,
            listener,
            scheduler: self.scheduler.as_ref(),
            concurrent_containers: self.config.parallel && self.config.parallel_containers,
            concurrent_leaves: self.config.parallel && self.config.parallel_leaves,
            halted: AtomicBool::new(false),
            fatal: Mutex::new(None),
            started: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
        };

        tracing::debug!(nodes = tree.node_count(), "tree execution starting");
        let clock = Instant::now();

        if let Err(fatal) = walk.run_node(tree.root(), context) {
            // The first recorded fatal wins over whatever unwound the
            // root; both exist whenever the run halts.
            let fatal = walk.current_fatal().unwrap_or(fatal);
            tracing::warn!(node = %fatal.id(), cause = %fatal.cause(), "tree execution halted");
            return Err(fatal);
        }

        let stats = ExecutionStats {
            nodes_started: walk.started.load(Ordering::Relaxed),
            nodes_skipped: walk.skipped.load(Ordering::Relaxed),
            duration: clock.elapsed(),
        };
        tracing::debug!(
            started = stats.nodes_started,
            skipped = stats.nodes_skipped,
            duration = ?stats.duration,
            "tree execution finished"
        );
        Ok(stats)
    }
}

impl Default for TreeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TreeExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeExecutor").field("config", &self.config).finish_non_exhaustive()
    }
}

fn build_scheduler(config: &ExecutionConfig) -> Box<dyn Scheduler> {
    if !config.parallel {
        return Box::new(SameThreadScheduler::new());
    }
    if config.pool_size == 0 {
        tracing::warn!("parallel execution requested without a pool size, running sequentially");
        return Box::new(SameThreadScheduler::new());
    }
    match ThreadPoolScheduler::new(config.pool_size) {
        Ok(pool) => Box::new(pool),
        Err(error) => {
            tracing::warn!("failed to create thread pool ({error}), running sequentially");
            Box::new(SameThreadScheduler::new())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Walk
// ─────────────────────────────────────────────────────────────────────────────

/// Per-run state shared by every node visit, across threads.
struct Walk<'run, C> {
    tree: &'run NodeTree<C>,
    listener: &'run dyn ExecutionListener,
    scheduler: &'run dyn Scheduler,
    concurrent_containers: bool,
    concurrent_leaves: bool,
    /// Set once a fatal error is recorded; nodes that have not started
    /// yet check this and back out silently.
    halted: AtomicBool,
    /// The first fatal error of the run.
    fatal: Mutex<Option<FatalError>>,
    started: AtomicUsize,
    skipped: AtomicUsize,
}

impl<C: ExecutionContext> Walk<'_, C> {
    /// Runs one node and its subtree against the context it inherits.
    fn run_node(&self, index: NodeIndex, inherited: C) -> Result<(), FatalError> {
        if self.halted.load(Ordering::SeqCst) {
            return Ok(());
        }
        let node = self.tree.node_at(index);
        let descriptor = self.tree.descriptor_at(index);

        let context = match node.prepare(inherited) {
            Ok(context) => context,
            Err(error) => return self.finish_without_running(descriptor, error),
        };

        match node.should_be_skipped(&context) {
            Ok(SkipDecision::DoNotSkip) => {}
            Ok(SkipDecision::Skip(reason)) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
                self.listener.execution_skipped(descriptor, &reason);
                return Ok(());
            }
            Err(error) => return self.finish_without_running(descriptor, error),
        }

        self.report_started(descriptor);
        let outcome = match node {
            Node::Leaf(leaf) => self.run_leaf(descriptor, &**leaf, context)?,
            Node::Container(container) => {
                self.run_container(index, descriptor, &**container, context)?
            }
        };
        self.listener.execution_finished(descriptor, &outcome);
        Ok(())
    }

    fn run_leaf(
        &self,
        descriptor: &Descriptor,
        leaf: &dyn Leaf<C>,
        context: C,
    ) -> Result<Outcome, FatalError> {
        match leaf.execute(context) {
            Ok(()) => Ok(Outcome::Successful),
            Err(error) => self.classify(descriptor, error),
        }
    }

    fn run_container(
        &self,
        index: NodeIndex,
        descriptor: &Descriptor,
        container: &dyn Container<C>,
        context: C,
    ) -> Result<Outcome, FatalError> {
        // A failed before hook takes the children and the after hook
        // down with it; the container still finishes with an outcome.
        let context = match container.before(context) {
            Ok(context) => context,
            Err(error) => return self.classify(descriptor, error),
        };

        let children = self.tree.children(index);
        if !children.is_empty() {
            let mut batch = Vec::with_capacity(children.len());
            for &child in children {
                let child_context = context.clone();
                batch.push(UnitOfWork::new(self.mode_for(child), move || {
                    if let Err(fatal) = self.run_node(child, child_context) {
                        self.record_halt(fatal);
                    }
                }));
            }
            self.scheduler.schedule(batch);
        }

        // A fatal anywhere below unwinds through this container: no
        // after hook, no finished notification.
        if let Some(fatal) = self.current_fatal() {
            return Err(fatal);
        }

        // The after hook runs whenever before succeeded, even if
        // children failed; child outcomes never taint the container's.
        match container.after(&context) {
            Ok(()) => Ok(Outcome::Successful),
            Err(error) => self.classify(descriptor, error),
        }
    }

    /// Reports a node whose preparation or skip check errored out
    /// recoverably: it starts and immediately finishes with the
    /// classified outcome, and its subtree never runs.
    fn finish_without_running(
        &self,
        descriptor: &Descriptor,
        error: HookError,
    ) -> Result<(), FatalError> {
        let outcome = self.classify(descriptor, error)?;
        self.report_started(descriptor);
        self.listener.execution_finished(descriptor, &outcome);
        Ok(())
    }

    /// Routes a hook error into the outcome vocabulary; fatal errors
    /// halt the run instead.
    fn classify(&self, descriptor: &Descriptor, error: HookError) -> Result<Outcome, FatalError> {
        match error.into_outcome() {
            Ok(outcome) => Ok(outcome),
            Err(cause) => {
                let fatal = FatalError::new(descriptor.id().clone(), cause);
                self.record_halt(fatal.clone());
                Err(fatal)
            }
        }
    }

    fn report_started(&self, descriptor: &Descriptor) {
        self.started.fetch_add(1, Ordering::Relaxed);
        self.listener.execution_started(descriptor);
    }

    /// Stops new nodes from starting. The first recorded fatal is kept;
    /// later ones from racing siblings are dropped.
    fn record_halt(&self, fatal: FatalError) {
        self.halted.store(true, Ordering::SeqCst);
        let mut slot = self.fatal.lock();
        if slot.is_none() {
            *slot = Some(fatal);
        }
    }

    fn current_fatal(&self) -> Option<FatalError> {
        self.fatal.lock().clone()
    }

    fn mode_for(&self, child: NodeIndex) -> ExecutionMode {
        let concurrent = match self.tree.descriptor_at(child).kind() {
            NodeKind::Container => self.concurrent_containers,
            NodeKind::Leaf => self.concurrent_leaves,
        };
        if concurrent { ExecutionMode::Concurrent } else { ExecutionMode::SameThread }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
