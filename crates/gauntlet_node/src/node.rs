//! Node capabilities and the closed container/leaf union.
//!
//! A tree is made of exactly two kinds of nodes. *Containers* group
//! children and may wrap them with [`Container::before`] and
//! [`Container::after`] hooks; *leaves* carry the actual work in
//! [`Leaf::execute`]. Both kinds share the [`Skippable`] and
//! [`Preparable`] capabilities, and every capability has a neutral
//! default so implementors only write the hooks they need.
//!
//! [`Node`] is the union the execution engine stores and dispatches on.
//! It is a closed enum rather than an open trait-object hierarchy, so
//! matching on it is exhaustive and a third node kind cannot appear
//! behind the engine's back.

use core::fmt;

use crate::error::HookError;
use crate::skip::SkipDecision;

// ─────────────────────────────────────────────────────────────────────────────
// Capabilities
// ─────────────────────────────────────────────────────────────────────────────

/// Capability: decide whether this node (and its whole subtree) should
/// be bypassed.
///
/// The check runs against the node's derived context, after
/// [`Preparable::prepare`] and before any other hook.
pub trait Skippable<C> {
    /// Returns the skip decision for this node. Defaults to never
    /// skipping.
    fn should_be_skipped(&self, _context: &C) -> Result<SkipDecision, HookError> {
        Ok(SkipDecision::DoNotSkip)
    }
}

/// Capability: derive the context this node and its subtree will see.
///
/// Preparation consumes the inherited context and returns the derived
/// one. Ancestor contexts are never mutated; returning a modified copy
/// is the only way to extend what descendants observe.
pub trait Preparable<C> {
    /// Derives this node's context from the inherited one. Defaults to
    /// passing the inherited context through unchanged.
    fn prepare(&self, context: C) -> Result<C, HookError> {
        Ok(context)
    }
}

/// An interior node: groups children and brackets them with hooks.
///
/// A container's own outcome reflects only its own hooks. Child
/// failures are reported on the children; they never change what the
/// container reports for itself.
pub trait Container<C>: Skippable<C> + Preparable<C> + Send + Sync {
    /// Runs before any child, deriving the context the children
    /// inherit. If this fails, no child runs and [`Container::after`]
    /// is not invoked. Defaults to passing the context through.
    fn before(&self, context: C) -> Result<C, HookError> {
        Ok(context)
    }

    /// Runs after all children whenever [`Container::before`]
    /// succeeded, even if children failed. Defaults to doing nothing.
    fn after(&self, _context: &C) -> Result<(), HookError> {
        Ok(())
    }
}

/// A terminal node: a single executable action.
pub trait Leaf<C>: Skippable<C> + Preparable<C> + Send + Sync {
    /// Runs the node's work against its derived context.
    fn execute(&self, context: C) -> Result<(), HookError>;
}

/// A heap-allocated container behind the [`Container`] trait.
pub type BoxedContainer<C> = Box<dyn Container<C>>;

/// A heap-allocated leaf behind the [`Leaf`] trait.
pub type BoxedLeaf<C> = Box<dyn Leaf<C>>;

// ─────────────────────────────────────────────────────────────────────────────
// Node
// ─────────────────────────────────────────────────────────────────────────────

/// The closed union of node kinds the engine executes.
pub enum Node<C> {
    /// An interior node with children and bracketing hooks.
    Container(BoxedContainer<C>),
    /// A terminal node carrying executable work.
    Leaf(BoxedLeaf<C>),
}

impl<C> Node<C> {
    /// Wraps a container implementation.
    pub fn container(container: impl Container<C> + 'static) -> Self {
        Self::Container(Box::new(container))
    }

    /// Wraps a leaf implementation.
    pub fn leaf(leaf: impl Leaf<C> + 'static) -> Self {
        Self::Leaf(Box::new(leaf))
    }

    /// The kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Container(_) => NodeKind::Container,
            Self::Leaf(_) => NodeKind::Leaf,
        }
    }

    /// Returns `true` for container nodes.
    #[must_use]
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container(_))
    }

    /// Returns `true` for leaf nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Dispatches [`Preparable::prepare`] to whichever kind this is.
    pub fn prepare(&self, context: C) -> Result<C, HookError> {
        match self {
            Self::Container(container) => container.prepare(context),
            Self::Leaf(leaf) => leaf.prepare(context),
        }
    }

    /// Dispatches [`Skippable::should_be_skipped`] to whichever kind
    /// this is.
    pub fn should_be_skipped(&self, context: &C) -> Result<SkipDecision, HookError> {
        match self {
            Self::Container(container) => container.should_be_skipped(context),
            Self::Leaf(leaf) => leaf.should_be_skipped(context),
        }
    }

    /// Borrows the container implementation, if this is a container.
    #[must_use]
    pub fn as_container(&self) -> Option<&dyn Container<C>> {
        match self {
            Self::Container(container) => Some(&**container),
            Self::Leaf(_) => None,
        }
    }

    /// Borrows the leaf implementation, if this is a leaf.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&dyn Leaf<C>> {
        match self {
            Self::Container(_) => None,
            Self::Leaf(leaf) => Some(&**leaf),
        }
    }
}

impl<C> fmt::Debug for Node<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container(_) => f.write_str("Node::Container(..)"),
            Self::Leaf(_) => f.write_str("Node::Leaf(..)"),
        }
    }
}

/// The kind of a node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// An interior, child-bearing node.
    Container,
    /// A terminal, work-bearing node.
    Leaf,
}

impl NodeKind {
    /// Returns `true` for [`NodeKind::Container`].
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Container)
    }

    /// Returns `true` for [`NodeKind::Leaf`].
    #[must_use]
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::Leaf)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => f.write_str("container"),
            Self::Leaf => f.write_str("leaf"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FunctionLeaf
// ─────────────────────────────────────────────────────────────────────────────

/// Adapts a plain function or closure into a [`Leaf`].
///
/// The function receives the leaf's derived context and reports through
/// the usual [`HookError`] vocabulary. Skip check and preparation keep
/// their neutral defaults.
///
/// # Example
///
/// ```
/// use gauntlet_node::node::{FunctionLeaf, Leaf};
/// use gauntlet_node::error::HookError;
///
/// let leaf = FunctionLeaf::new(|count: u32| {
///     if count > 0 { Ok(()) } else { Err(HookError::failure("count must be positive")) }
/// });
/// assert!(leaf.execute(3).is_ok());
/// ```
pub struct FunctionLeaf<F> {
    body: F,
}

impl<F> FunctionLeaf<F> {
    /// Wraps the given function.
    #[must_use]
    pub fn new(body: F) -> Self {
        Self { body }
    }
}

impl<C, F> Skippable<C> for FunctionLeaf<F> where F: Fn(C) -> Result<(), HookError> + Send + Sync {}

impl<C, F> Preparable<C> for FunctionLeaf<F> where F: Fn(C) -> Result<(), HookError> + Send + Sync {}

impl<C, F> Leaf<C> for FunctionLeaf<F>
where
    F: Fn(C) -> Result<(), HookError> + Send + Sync,
{
    fn execute(&self, context: C) -> Result<(), HookError> {
        (self.body)(context)
    }
}

impl<F> fmt::Debug for FunctionLeaf<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FunctionLeaf(..)")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ContainerHooks
// ─────────────────────────────────────────────────────────────────────────────

/// Boxed preparation hook stored by [`ContainerHooks`].
pub type PrepareFn<C> = Box<dyn Fn(C) -> Result<C, HookError> + Send + Sync>;

/// Boxed skip check stored by [`ContainerHooks`].
pub type SkipFn<C> = Box<dyn Fn(&C) -> Result<SkipDecision, HookError> + Send + Sync>;

/// Boxed before-children hook stored by [`ContainerHooks`].
pub type BeforeFn<C> = Box<dyn Fn(C) -> Result<C, HookError> + Send + Sync>;

/// Boxed after-children hook stored by [`ContainerHooks`].
pub type AfterFn<C> = Box<dyn Fn(&C) -> Result<(), HookError> + Send + Sync>;

/// A [`Container`] assembled from optional closures.
///
/// With no hooks installed this is a plain grouping node: every
/// capability keeps its neutral default. Install only the hooks a
/// grouping actually needs.
///
/// # Example
///
/// ```
/// use gauntlet_node::node::ContainerHooks;
///
/// let suite = ContainerHooks::new()
///     .with_before(|count: u32| Ok(count + 1))
///     .with_after(|_count| Ok(()));
/// ```
pub struct ContainerHooks<C> {
    prepare: Option<PrepareFn<C>>,
    skip: Option<SkipFn<C>>,
    before: Option<BeforeFn<C>>,
    after: Option<AfterFn<C>>,
}

impl<C> ContainerHooks<C> {
    /// A container with no hooks installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a preparation hook.
    #[must_use]
    pub fn with_prepare<F>(mut self, hook: F) -> Self
    where
        F: Fn(C) -> Result<C, HookError> + Send + Sync + 'static,
    {
        self.prepare = Some(Box::new(hook));
        self
    }

    /// Installs a skip check.
    #[must_use]
    pub fn with_skip<F>(mut self, hook: F) -> Self
    where
        F: Fn(&C) -> Result<SkipDecision, HookError> + Send + Sync + 'static,
    {
        self.skip = Some(Box::new(hook));
        self
    }

    /// Installs a before-children hook.
    #[must_use]
    pub fn with_before<F>(mut self, hook: F) -> Self
    where
        F: Fn(C) -> Result<C, HookError> + Send + Sync + 'static,
    {
        self.before = Some(Box::new(hook));
        self
    }

    /// Installs an after-children hook.
    #[must_use]
    pub fn with_after<F>(mut self, hook: F) -> Self
    where
        F: Fn(&C) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after = Some(Box::new(hook));
        self
    }
}

impl<C> Default for ContainerHooks<C> {
    fn default() -> Self {
        Self { prepare: None, skip: None, before: None, after: None }
    }
}

impl<C> Skippable<C> for ContainerHooks<C> {
    fn should_be_skipped(&self, context: &C) -> Result<SkipDecision, HookError> {
        match &self.skip {
            Some(hook) => hook(context),
            None => Ok(SkipDecision::DoNotSkip),
        }
    }
}

impl<C> Preparable<C> for ContainerHooks<C> {
    fn prepare(&self, context: C) -> Result<C, HookError> {
        match &self.prepare {
            Some(hook) => hook(context),
            None => Ok(context),
        }
    }
}

impl<C> Container<C> for ContainerHooks<C> {
    fn before(&self, context: C) -> Result<C, HookError> {
        match &self.before {
            Some(hook) => hook(context),
            None => Ok(context),
        }
    }

    fn after(&self, context: &C) -> Result<(), HookError> {
        match &self.after {
            Some(hook) => hook(context),
            None => Ok(()),
        }
    }
}

impl<C> fmt::Debug for ContainerHooks<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerHooks")
            .field("prepare", &self.prepare.is_some())
            .field("skip", &self.skip.is_some())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
