//! Pluggable dispatch of child batches.
//!
//! The executor never spawns threads itself. Whenever a container has
//! children to run, it packs them into [`UnitOfWork`] values and hands
//! the whole batch to a [`Scheduler`]. Schedulers decide where the
//! closures run; the contract is only that [`Scheduler::schedule`]
//! returns after every unit in the batch has completed.
//!
//! Two schedulers ship with the engine: [`SameThreadScheduler`] runs
//! everything inline in submission order, and [`ThreadPoolScheduler`]
//! fans concurrent units out over a fixed-size worker pool.

use core::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// UnitOfWork
// ─────────────────────────────────────────────────────────────────────────────

/// Where one unit of work may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionMode {
    /// Must run on the thread that called [`Scheduler::schedule`].
    SameThread,
    /// May run on any worker thread, concurrently with its siblings.
    Concurrent,
}

/// One schedulable closure plus its placement constraint.
///
/// The lifetime ties the closure to borrows of the tree being executed;
/// schedulers must not let units escape the `schedule` call.
pub struct UnitOfWork<'scope> {
    mode: ExecutionMode,
    work: Box<dyn FnOnce() + Send + 'scope>,
}

impl<'scope> UnitOfWork<'scope> {
    /// Packs a closure with its placement constraint.
    #[must_use]
    pub fn new(mode: ExecutionMode, work: impl FnOnce() + Send + 'scope) -> Self {
        Self { mode, work: Box::new(work) }
    }

    /// The placement constraint for this unit.
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Runs the unit, consuming it.
    pub fn run(self) {
        (self.work)();
    }
}

impl fmt::Debug for UnitOfWork<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitOfWork").field("mode", &self.mode).finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scheduler
// ─────────────────────────────────────────────────────────────────────────────

/// Runs batches of sibling work units.
///
/// Implementations choose placement but must honor two rules: the call
/// returns only after every unit in the batch has completed, and units
/// marked [`ExecutionMode::SameThread`] run on the calling thread in
/// submission order.
pub trait Scheduler: Send + Sync {
    /// Runs the batch to completion.
    fn schedule(&self, batch: Vec<UnitOfWork<'_>>);
}

/// Runs every unit inline on the calling thread, in submission order.
///
/// This is the scheduler behind sequential execution; it ignores
/// [`ExecutionMode::Concurrent`] and never spawns.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameThreadScheduler;

impl SameThreadScheduler {
    /// Creates the inline scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for SameThreadScheduler {
    fn schedule(&self, batch: Vec<UnitOfWork<'_>>) {
        for unit in batch {
            unit.run();
        }
    }
}

/// Fans concurrent units out over a dedicated worker pool.
///
/// Same-thread units still run inline on the calling thread, in
/// submission order relative to each other. Nested batches submitted
/// from worker threads join the same pool cooperatively, so deep trees
/// cannot deadlock the pool.
pub struct ThreadPoolScheduler {
    pool: rayon::ThreadPool,
}

impl ThreadPoolScheduler {
    /// Builds a scheduler over a pool of `pool_size` workers.
    ///
    /// A size of zero lets the pool pick its own default; callers that
    /// want sequential execution should use [`SameThreadScheduler`]
    /// instead.
    ///
    /// # Errors
    ///
    /// Fails if the worker threads cannot be spawned.
    pub fn new(pool_size: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(pool_size)
            .thread_name(|worker| format!("gauntlet-worker-{worker}"))
            .build()?;
        Ok(Self { pool })
    }

    /// How many worker threads the pool holds.
    #[must_use]
    pub fn pool_size(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Scheduler for ThreadPoolScheduler {
    fn schedule(&self, batch: Vec<UnitOfWork<'_>>) {
        self.pool.scope(|scope| {
            for unit in batch {
                match unit.mode() {
                    ExecutionMode::Concurrent => scope.spawn(move |_| unit.run()),
                    ExecutionMode::SameThread => unit.run(),
                }
            }
        });
    }
}

impl fmt::Debug for ThreadPoolScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadPoolScheduler")
            .field("pool_size", &self.pool_size())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
