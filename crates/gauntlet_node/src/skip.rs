//! Skip decisions returned by a node's skip check.
//!
//! The skip check runs against the node's derived context, before any
//! other hook of that node. Skipping always covers the whole subtree: a
//! skipped container never prepares, runs hooks for, or visits its
//! children.

/// The answer a node gives when asked whether it should run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipDecision {
    /// Execute the node normally.
    DoNotSkip,
    /// Bypass the node and its entire subtree. The reason is reported
    /// through the `execution_skipped` notification.
    Skip(String),
}

impl SkipDecision {
    /// Builds a [`SkipDecision::Skip`] with the given reason.
    pub fn skip(reason: impl Into<String>) -> Self {
        Self::Skip(reason.into())
    }

    /// Returns `true` if the node should be bypassed.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    /// The reason attached to a skip, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::DoNotSkip => None,
            Self::Skip(reason) => Some(reason),
        }
    }
}
