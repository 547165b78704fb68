//! Terminal result of executing a single node.
//!
//! Every node that actually starts finishes with exactly one [`Outcome`].
//! Outcomes form a closed three-way vocabulary: a node either completed
//! normally, declined to complete ([`Outcome::Aborted`]), or failed
//! ([`Outcome::Failed`]). Anything outside this vocabulary is not an
//! outcome at all; unrecoverable conditions travel as fatal errors and
//! terminate the run instead of finishing a node.

use core::fmt;

use crate::error::Cause;

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// The terminal result of one node's execution.
///
/// An outcome is reported exactly once per started node, through
/// the `execution_finished` notification. Skipped nodes never produce
/// an outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The node completed normally.
    Successful,
    /// The node declined to complete because a precondition it relies on
    /// did not hold. Aborts are not failures; they carry their cause for
    /// reporting but do not indicate broken behavior.
    Aborted(Cause),
    /// The node failed.
    Failed(Cause),
}

impl Outcome {
    /// Builds an [`Outcome::Aborted`] from anything convertible to a cause.
    pub fn aborted(cause: impl Into<Cause>) -> Self {
        Self::Aborted(cause.into())
    }

    /// Builds an [`Outcome::Failed`] from anything convertible to a cause.
    pub fn failed(cause: impl Into<Cause>) -> Self {
        Self::Failed(cause.into())
    }

    /// Returns `true` if the node completed normally.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Successful)
    }

    /// Returns `true` if the node declined to complete.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted(_))
    }

    /// Returns `true` if the node failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The cause attached to an aborted or failed outcome.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Self::Successful => None,
            Self::Aborted(cause) | Self::Failed(cause) => Some(cause),
        }
    }

    /// Folds two outcomes into the more severe one.
    ///
    /// Severity is ordered `Failed > Aborted > Successful`. On equal
    /// severity the receiver wins, so folding a sequence keeps the first
    /// outcome of the highest severity seen.
    #[must_use]
    pub fn worse(self, other: Outcome) -> Outcome {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }

    fn severity(&self) -> u8 {
        match self {
            Self::Successful => 0,
            Self::Aborted(_) => 1,
            Self::Failed(_) => 2,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Successful => f.write_str("successful"),
            Self::Aborted(cause) => write!(f, "aborted: {cause}"),
            Self::Failed(cause) => write!(f, "failed: {cause}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
