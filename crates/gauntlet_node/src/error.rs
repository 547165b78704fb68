//! Hook errors and their closed classification.
//!
//! Every fallible node operation returns [`HookError`], which carries its
//! own severity: [`HookError::Abort`] and [`HookError::Failure`] become
//! node outcomes, while [`HookError::Fatal`] escapes outcome handling
//! entirely and terminates the run. The classification is closed; there
//! is no way to construct an error the engine does not know how to route.
//!
//! Underlying errors travel as a [`Cause`], a cheaply cloneable handle
//! with stable identity: cloning a cause (for instance to report it at
//! several tree levels) preserves [`Cause::ptr_eq`] with the original.

use core::fmt;
use std::sync::Arc;

use crate::context::ValueError;
use crate::outcome::Outcome;

// ─────────────────────────────────────────────────────────────────────────────
// Cause
// ─────────────────────────────────────────────────────────────────────────────

/// A shared handle to the error underlying an abort, failure, or fatal
/// condition.
///
/// Causes are reference counted so they can be cloned into outcomes and
/// notifications without copying the error itself. Identity survives
/// cloning, which lets callers check that a reported cause is *the same
/// error object* that a hook produced, not merely an equal-looking one.
#[derive(Debug, Clone)]
pub struct Cause(Arc<dyn core::error::Error + Send + Sync>);

impl Cause {
    /// Wraps a concrete error.
    pub fn new<E>(error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Builds a cause from a bare message.
    pub fn message(text: impl Into<String>) -> Self {
        Self(Arc::new(MessageError(text.into())))
    }

    /// Returns `true` if both handles point at the same underlying error
    /// object, not merely errors with equal text.
    #[must_use]
    pub fn ptr_eq(&self, other: &Cause) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Borrows the underlying error.
    #[must_use]
    pub fn inner(&self) -> &(dyn core::error::Error + 'static) {
        &*self.0
    }

    /// Attempts to view the underlying error as a concrete type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: core::error::Error + 'static,
    {
        self.inner().downcast_ref::<E>()
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for Cause {
    fn from(text: String) -> Self {
        Self::message(text)
    }
}

impl From<&str> for Cause {
    fn from(text: &str) -> Self {
        Self::message(text)
    }
}

/// Error type backing [`Cause::message`].
#[derive(Debug)]
struct MessageError(String);

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::error::Error for MessageError {}

// ─────────────────────────────────────────────────────────────────────────────
// HookError
// ─────────────────────────────────────────────────────────────────────────────

/// An error raised by a node hook, carrying its severity.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HookError {
    /// The hook declined to proceed because a precondition did not hold.
    /// The node finishes as [`Outcome::Aborted`].
    #[error("aborted: {0}")]
    Abort(Cause),
    /// The hook failed. The node finishes as [`Outcome::Failed`].
    #[error("{0}")]
    Failure(Cause),
    /// Unrecoverable. Fatal errors never become an outcome; they unwind
    /// through every enclosing container and terminate the run.
    #[error("fatal: {0}")]
    Fatal(Cause),
}

impl HookError {
    /// Builds an [`HookError::Abort`] from anything convertible to a cause.
    pub fn abort(cause: impl Into<Cause>) -> Self {
        Self::Abort(cause.into())
    }

    /// Builds a [`HookError::Failure`] from anything convertible to a cause.
    pub fn failure(cause: impl Into<Cause>) -> Self {
        Self::Failure(cause.into())
    }

    /// Builds a [`HookError::Fatal`] from anything convertible to a cause.
    pub fn fatal(cause: impl Into<Cause>) -> Self {
        Self::Fatal(cause.into())
    }

    /// The severity class of this error.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Abort(_) => ErrorClass::Abort,
            Self::Failure(_) => ErrorClass::Failure,
            Self::Fatal(_) => ErrorClass::Fatal,
        }
    }

    /// Borrows the underlying cause regardless of severity.
    #[must_use]
    pub fn cause(&self) -> &Cause {
        match self {
            Self::Abort(cause) | Self::Failure(cause) | Self::Fatal(cause) => cause,
        }
    }

    /// Routes this error into the outcome vocabulary.
    ///
    /// Aborts and failures become the corresponding [`Outcome`]; a fatal
    /// error is returned as `Err` so it structurally cannot be recorded
    /// as a node outcome.
    pub fn into_outcome(self) -> Result<Outcome, Cause> {
        match self {
            Self::Abort(cause) => Ok(Outcome::Aborted(cause)),
            Self::Failure(cause) => Ok(Outcome::Failed(cause)),
            Self::Fatal(cause) => Err(cause),
        }
    }
}

impl From<ValueError> for HookError {
    fn from(error: ValueError) -> Self {
        Self::Failure(Cause::new(error))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ErrorClass
// ─────────────────────────────────────────────────────────────────────────────

/// The closed set of hook error severities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Terminates the entire run.
    Fatal,
    /// Finishes the node as aborted.
    Abort,
    /// Finishes the node as failed.
    Failure,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fatal => f.write_str("fatal"),
            Self::Abort => f.write_str("abort"),
            Self::Failure => f.write_str("failure"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("port {0} already bound")]
    struct PortError(u16);

    /// Abort and failure errors classify into outcomes; fatal does not.
    #[test]
    fn into_outcome_routes_by_class() {
        let outcome = HookError::abort("not supported here").into_outcome();
        assert!(outcome.is_ok_and(|o| o.is_aborted()));

        let outcome = HookError::failure("boom").into_outcome();
        assert!(outcome.is_ok_and(|o| o.is_failed()));

        assert!(HookError::fatal("out of memory").into_outcome().is_err());
    }

    /// The cause object survives classification with its identity intact.
    #[test]
    fn fatal_classification_preserves_identity() {
        let cause = Cause::new(PortError(8080));
        let escaped = HookError::Fatal(cause.clone())
            .into_outcome()
            .expect_err("fatal must not become an outcome");
        assert!(escaped.ptr_eq(&cause));
    }

    /// Cloned causes share identity; independently built ones do not.
    #[test]
    fn ptr_eq_tracks_identity_not_equality() {
        let original = Cause::message("boom");
        assert!(original.clone().ptr_eq(&original));

        let lookalike = Cause::message("boom");
        assert!(!lookalike.ptr_eq(&original));
        assert_eq!(lookalike.to_string(), original.to_string());
    }

    /// Wrapped concrete errors can be recovered by downcast.
    #[test]
    fn downcast_recovers_concrete_error() {
        let cause = Cause::new(PortError(4242));
        let port = cause.downcast_ref::<PortError>();
        assert!(matches!(port, Some(PortError(4242))));
        assert!(cause.downcast_ref::<ValueError>().is_none());
    }

    /// Severity classes and display strings line up per variant.
    #[test]
    fn class_and_display_per_variant() {
        let abort = HookError::abort("skip this");
        assert_eq!(abort.class(), ErrorClass::Abort);
        assert_eq!(abort.to_string(), "aborted: skip this");

        let failure = HookError::failure("boom");
        assert_eq!(failure.class(), ErrorClass::Failure);
        assert_eq!(failure.to_string(), "boom");

        let fatal = HookError::fatal("disk gone");
        assert_eq!(fatal.class(), ErrorClass::Fatal);
        assert_eq!(fatal.to_string(), "fatal: disk gone");
    }

    /// Context lookup errors convert into failures, not aborts.
    #[test]
    fn value_error_converts_to_failure() {
        let error = HookError::from(ValueError::NotFound("demo::Endpoint"));
        assert_eq!(error.class(), ErrorClass::Failure);
        assert!(error.cause().downcast_ref::<ValueError>().is_some());
    }
}
