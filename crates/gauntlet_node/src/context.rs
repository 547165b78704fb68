//! Execution context storage.
//!
//! This module provides the [`ExecutionContext`] marker bound used by the
//! execution engine, the [`ContextValue`] trait, and [`ValueSet`], a
//! type-keyed container for state accumulated while descending a node tree.
//!
//! # Snapshot Semantics
//!
//! Contexts are never shared mutable state. A hook that wants to expose a
//! value to the nodes below it derives a *new* context with [`ValueSet::with`]
//! and returns that; the instance held by ancestors and siblings is left
//! untouched. Cloning a `ValueSet` is cheap because entries are shared
//! (`Arc`) rather than copied.

use core::any::{Any, TypeId};
use std::sync::Arc;

use hashbrown::HashMap;

/// Bound required of any context type threaded through tree execution.
///
/// The engine treats contexts as opaque: it clones one per child subtree and
/// moves them through the lifecycle hooks. Any `Clone + Send + 'static` type
/// qualifies, from a unit struct to a full [`ValueSet`].
pub trait ExecutionContext: Clone + Send + 'static {}

// Blanket implementation for all compatible types
impl<T: Clone + Send + 'static> ExecutionContext for T {}

/// A value that can be stored in a [`ValueSet`].
///
/// Any type that is `Send + Sync + 'static` automatically implements
/// `ContextValue`.
pub trait ContextValue: Send + Sync + 'static {
    /// Returns the type name for diagnostics.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// Blanket implementation for all compatible types
impl<T: Send + Sync + 'static> ContextValue for T {}

/// Unique identifier for a context value type.
///
/// Used internally to key values in the storage map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(TypeId);

impl ValueId {
    /// Creates a `ValueId` for the given type.
    #[must_use]
    pub fn of<T: ContextValue>() -> Self {
        Self(TypeId::of::<T>())
    }

    /// Returns the underlying `TypeId`.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.0
    }
}

/// Errors that can occur during context value lookups.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// The requested value type was not found in the context.
    #[error("context value not found: {0}")]
    NotFound(&'static str),
}

/// Immutable, type-keyed bundle of state accumulated while descending a tree.
///
/// `ValueSet` is the concrete context shipped with the engine. Values are
/// looked up by type; storing a second value of the same type supersedes the
/// first for the derived context and everything below it.
///
/// # Example
///
/// ```
/// use gauntlet_node::context::ValueSet;
///
/// struct Endpoint(&'static str);
///
/// let root = ValueSet::new();
/// let derived = root.clone().with(Endpoint("localhost:9000"));
///
/// assert!(root.get::<Endpoint>().is_none());
/// assert_eq!(derived.get::<Endpoint>().map(|e| e.0), Some("localhost:9000"));
/// ```
#[derive(Clone, Default)]
pub struct ValueSet {
    entries: HashMap<ValueId, Arc<dyn Any + Send + Sync>>,
}

impl ValueSet {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a context containing `value` in addition to everything already
    /// present.
    ///
    /// A value of the same type that was visible before is superseded in the
    /// derived context only; contexts this one was cloned from keep theirs.
    #[must_use]
    pub fn with<T: ContextValue>(mut self, value: T) -> Self {
        self.entries.insert(ValueId::of::<T>(), Arc::new(value));
        self
    }

    /// Gets a reference to the stored value of type `T`, if present.
    #[must_use]
    pub fn get<T: ContextValue>(&self) -> Option<&T> {
        self.entries
            .get(&ValueId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<T>())
    }

    /// Gets a reference to the stored value of type `T`.
    ///
    /// # Errors
    ///
    /// [`ValueError::NotFound`] if no value of type `T` is stored.
    pub fn try_get<T: ContextValue>(&self) -> Result<&T, ValueError> {
        self.get::<T>()
            .ok_or_else(|| ValueError::NotFound(core::any::type_name::<T>()))
    }

    /// Returns `true` if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: ContextValue>(&self) -> bool {
        self.entries.contains_key(&ValueId::of::<T>())
    }

    /// Returns the number of values stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl core::fmt::Debug for ValueSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValueSet")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}
