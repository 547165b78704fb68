//! Recorded execution notifications.
//!
//! Listeners receive notifications as method calls; [`ExecutionEvent`]
//! is the same information reified as a value, so event streams can be
//! captured, asserted on, and replayed. The engine guarantees the
//! stream is well formed: every started node finishes exactly once,
//! skipped nodes never start, and a container's events enclose those of
//! its children.

use core::fmt;

use gauntlet_node::outcome::Outcome;

use crate::descriptor::NodeId;

/// One notification, as a value.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    /// A node began executing.
    Started {
        /// The node's stable identity.
        id: NodeId,
    },
    /// A node and its whole subtree were bypassed.
    Skipped {
        /// The node's stable identity.
        id: NodeId,
        /// The reason given by the skip check.
        reason: String,
    },
    /// A started node finished with its terminal outcome.
    Finished {
        /// The node's stable identity.
        id: NodeId,
        /// The outcome reported for the node.
        outcome: Outcome,
    },
}

impl ExecutionEvent {
    /// The identity of the node this event is about.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Started { id } | Self::Skipped { id, .. } | Self::Finished { id, .. } => id,
        }
    }

    /// A short name for the event kind.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::Skipped { .. } => "skipped",
            Self::Finished { .. } => "finished",
        }
    }
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { id } => write!(f, "started {id}"),
            Self::Skipped { id, reason } => write!(f, "skipped {id} ({reason})"),
            Self::Finished { id, outcome } => write!(f, "finished {id}: {outcome}"),
        }
    }
}
