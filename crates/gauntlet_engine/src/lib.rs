//! Tree execution primitives for Gauntlet (Layer 2).
//!
//! `gauntlet_engine` turns the node vocabulary of `gauntlet_node` into
//! runnable trees: arena-backed storage, a recursive executor with
//! uniform lifecycle treatment for every node, ordered listener
//! notifications, and opt-in worker-pool parallelism.
//!
//! # Core Concepts
//!
//! - [`NodeTree`] - Arena-backed tree structure with builder API
//! - [`TreeExecutor`] - Recursive engine walking a tree against a context
//! - [`ExecutionListener`](listener::ExecutionListener) - Observer for
//!   started/skipped/finished notifications
//! - [`Scheduler`](scheduler::Scheduler) - Placement of child batches,
//!   inline or on a worker pool
//! - [`NodeId`] - Stable path-shaped node identities
//!
//! # Example
//!
//! ```
//! use gauntlet_engine::executor::TreeExecutor;
//! use gauntlet_engine::listener::SummaryListener;
//! use gauntlet_engine::tree::NodeTree;
//! use gauntlet_node::node::{ContainerHooks, FunctionLeaf};
//!
//! let mut tree = NodeTree::new("suite", ContainerHooks::new());
//! let parser = tree.add_container(tree.root(), "parser", ContainerHooks::new())?;
//! tree.add_leaf(parser, "empty_input", FunctionLeaf::new(|_context: ()| Ok(())))?;
//!
//! let summary = SummaryListener::new();
//! let stats = TreeExecutor::new().execute(&tree, (), &summary)?;
//!
//! assert_eq!(stats.nodes_started, 3);
//! assert!(summary.summary().is_clean());
//! # Ok::<(), Box<dyn core::error::Error>>(())
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 2 of the Gauntlet architecture:
//!
//! - **Layer 1** (`gauntlet_node`): node capabilities and result
//!   vocabulary
//! - **Layer 2** (`gauntlet_engine`): tree storage, execution, listeners,
//!   and scheduling (this crate)

/// Stable node identities and per-node metadata.
pub mod descriptor;

/// Execution notifications as plain data.
pub mod events;

/// The recursive tree executor.
pub mod executor;

/// Listeners observing tree execution.
pub mod listener;

/// Work placement for child batches.
pub mod scheduler;

/// Trace output configuration.
pub mod trace;

/// Arena-backed storage for executable node trees.
pub mod tree;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::descriptor::{Descriptor, NodeId};
    pub use crate::events::ExecutionEvent;
    pub use crate::executor::{ExecutionConfig, ExecutionStats, FatalError, TreeExecutor};
    pub use crate::listener::{
        CompositeListener, EventLog, ExecutionListener, FailureDetail, NoopListener, RunSummary,
        SummaryListener, TracingListener,
    };
    pub use crate::scheduler::{
        ExecutionMode, SameThreadScheduler, Scheduler, ThreadPoolScheduler, UnitOfWork,
    };
    pub use crate::trace::{TraceConfig, TraceFormat};
    pub use crate::tree::{NodeIndex, NodeTree, TreeError};
}

// Re-export key types at crate root for convenience
pub use descriptor::NodeId;
pub use executor::{ExecutionConfig, ExecutionStats, FatalError, TreeExecutor};
pub use listener::ExecutionListener;
pub use tree::{NodeIndex, NodeTree, TreeError};
