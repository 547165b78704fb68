//! Arena-backed storage for executable node trees.
//!
//! A [`NodeTree`] owns every node in one run, flattened into an arena
//! and addressed by [`NodeIndex`]. Structure lives next to the nodes:
//! each entry records its parent and its children in insertion order,
//! which is the order the executor visits them. Node payloads stay
//! private; everything public about a node is exposed through its
//! [`Descriptor`].

use core::fmt;

use gauntlet_node::node::{Container, Leaf, Node};
use hashbrown::HashMap;

use crate::descriptor::{Descriptor, NodeId};

// ─────────────────────────────────────────────────────────────────────────────
// NodeIndex
// ─────────────────────────────────────────────────────────────────────────────

/// Position of a node within its tree's arena.
///
/// Indices are minted by the tree and stay valid for its lifetime,
/// including across [`NodeTree::prune`]; a pruned index simply stops
/// resolving. Indices from one tree are meaningless in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw arena position.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// NodeTree
// ─────────────────────────────────────────────────────────────────────────────

/// One arena entry: a node plus its place in the hierarchy.
struct TreeEntry<C> {
    descriptor: Descriptor,
    node: Node<C>,
    parent: Option<NodeIndex>,
    /// Child indices in insertion order.
    children: Vec<NodeIndex>,
    /// Set by [`NodeTree::prune`]; detached entries are invisible to
    /// every query but keep their arena slot so indices stay stable.
    detached: bool,
}

/// A tree of containers and leaves, ready for execution.
///
/// Trees always have a container root. Nodes are added under an
/// existing parent and identified by a name that becomes the last
/// segment of their [`NodeId`]; sibling names must be unique.
///
/// # Example
///
/// ```
/// use gauntlet_engine::tree::NodeTree;
/// use gauntlet_node::node::{ContainerHooks, FunctionLeaf};
///
/// let mut tree = NodeTree::new("suite", ContainerHooks::new());
/// let root = tree.root();
/// let io = tree.add_container(root, "io", ContainerHooks::new())?;
/// tree.add_leaf(io, "read_empty", FunctionLeaf::new(|_context: ()| Ok(())))?;
///
/// assert_eq!(tree.node_count(), 3);
/// # Ok::<(), gauntlet_engine::tree::TreeError>(())
/// ```
pub struct NodeTree<C> {
    entries: Vec<TreeEntry<C>>,
    ids: HashMap<NodeId, NodeIndex>,
}

impl<C> NodeTree<C> {
    /// Creates a tree holding only a root container with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>, root: impl Container<C> + 'static) -> Self {
        let id = NodeId::root(name);
        let descriptor = Descriptor::new(id.clone(), gauntlet_node::node::NodeKind::Container);
        let entry = TreeEntry {
            descriptor,
            node: Node::container(root),
            parent: None,
            children: Vec::new(),
            detached: false,
        };
        let mut ids = HashMap::new();
        ids.insert(id, NodeIndex::new(0));
        Self { entries: vec![entry], ids }
    }

    /// The root node's index.
    #[must_use]
    pub fn root(&self) -> NodeIndex {
        NodeIndex::new(0)
    }

    /// Adds a container under `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` does not resolve, is a leaf, or already has a
    /// child named `name`.
    pub fn add_container(
        &mut self,
        parent: NodeIndex,
        name: impl Into<String>,
        container: impl Container<C> + 'static,
    ) -> Result<NodeIndex, TreeError> {
        self.add_node(parent, name.into(), Node::container(container))
    }

    /// Adds a leaf under `parent`.
    ///
    /// # Errors
    ///
    /// Fails if `parent` does not resolve, is a leaf, or already has a
    /// child named `name`.
    pub fn add_leaf(
        &mut self,
        parent: NodeIndex,
        name: impl Into<String>,
        leaf: impl Leaf<C> + 'static,
    ) -> Result<NodeIndex, TreeError> {
        self.add_node(parent, name.into(), Node::leaf(leaf))
    }

    fn add_node(
        &mut self,
        parent: NodeIndex,
        name: String,
        node: Node<C>,
    ) -> Result<NodeIndex, TreeError> {
        let parent_descriptor =
            self.descriptor(parent).ok_or(TreeError::UnknownNode(parent))?;
        if parent_descriptor.kind().is_leaf() {
            return Err(TreeError::ChildOfLeaf { parent });
        }
        let id = parent_descriptor.id().child(&name);
        if self.ids.contains_key(&id) {
            return Err(TreeError::DuplicateChildName { parent, name });
        }

        let index = NodeIndex::new(self.entries.len());
        let descriptor = Descriptor::new(id.clone(), node.kind());
        self.entries.push(TreeEntry {
            descriptor,
            node,
            parent: Some(parent),
            children: Vec::new(),
            detached: false,
        });
        self.entries[parent.0].children.push(index);
        self.ids.insert(id, index);
        Ok(index)
    }

    /// Overrides the display name reported for `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index` does not resolve.
    pub fn set_display_name(
        &mut self,
        index: NodeIndex,
        name: impl Into<String>,
    ) -> Result<(), TreeError> {
        let entry = self.live_entry_mut(index)?;
        entry.descriptor.set_display_name(name);
        Ok(())
    }

    /// Declares a tag on `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index` does not resolve.
    pub fn add_tag(&mut self, index: NodeIndex, tag: impl Into<String>) -> Result<(), TreeError> {
        let entry = self.live_entry_mut(index)?;
        entry.descriptor.push_tag(tag);
        Ok(())
    }

    /// Removes a childless, non-root node from the tree.
    ///
    /// The arena slot is kept so other indices stay valid, but the
    /// pruned index stops resolving and the node will never execute.
    ///
    /// # Errors
    ///
    /// Fails if `index` does not resolve, is the root, or still has
    /// children.
    pub fn prune(&mut self, index: NodeIndex) -> Result<(), TreeError> {
        let entry = self.live_entry(index).ok_or(TreeError::UnknownNode(index))?;
        let Some(parent) = entry.parent else {
            return Err(TreeError::PruneRoot);
        };
        if !entry.children.is_empty() {
            return Err(TreeError::PruneWithChildren {
                node: index,
                children: entry.children.len(),
            });
        }
        let id = entry.descriptor.id().clone();

        self.entries[index.0].detached = true;
        self.ids.remove(&id);
        self.entries[parent.0].children.retain(|child| *child != index);
        Ok(())
    }

    /// Resolves a stable id to its arena index.
    #[must_use]
    pub fn find(&self, id: &NodeId) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    /// The descriptor for `index`, if it resolves.
    #[must_use]
    pub fn descriptor(&self, index: NodeIndex) -> Option<&Descriptor> {
        self.live_entry(index).map(|entry| &entry.descriptor)
    }

    /// The children of `index` in insertion order. Unknown indices have
    /// no children.
    #[must_use]
    pub fn children(&self, index: NodeIndex) -> &[NodeIndex] {
        match self.live_entry(index) {
            Some(entry) => &entry.children,
            None => &[],
        }
    }

    /// The parent of `index`, or `None` for the root and for indices
    /// that do not resolve.
    #[must_use]
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.live_entry(index).and_then(|entry| entry.parent)
    }

    /// Tags visible on `index`: its ancestors' tags from the root down,
    /// then its own, with duplicates removed keeping the first
    /// occurrence.
    #[must_use]
    pub fn effective_tags(&self, index: NodeIndex) -> Option<Vec<String>> {
        self.live_entry(index)?;

        let mut chain = Vec::new();
        let mut cursor = Some(index);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.parent(current);
        }
        chain.reverse();

        let mut tags: Vec<String> = Vec::new();
        for ancestor in chain {
            if let Some(descriptor) = self.descriptor(ancestor) {
                for tag in descriptor.tags() {
                    if !tags.iter().any(|seen| seen == tag) {
                        tags.push(tag.clone());
                    }
                }
            }
        }
        Some(tags)
    }

    /// Visits every live node in insertion order, which always lists a
    /// parent before its children.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Descriptor)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.detached)
            .map(|(position, entry)| (NodeIndex::new(position), &entry.descriptor))
    }

    /// How many live nodes the tree holds.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.detached).count()
    }

    /// Arena access for the executor. Callers must hold an index minted
    /// by this tree and never pruned.
    ///
    /// # Panics
    ///
    /// Panics if the index does not resolve.
    pub(crate) fn node_at(&self, index: NodeIndex) -> &Node<C> {
        &self.entries[index.0].node
    }

    /// See [`NodeTree::node_at`].
    ///
    /// # Panics
    ///
    /// Panics if the index does not resolve.
    pub(crate) fn descriptor_at(&self, index: NodeIndex) -> &Descriptor {
        &self.entries[index.0].descriptor
    }

    fn live_entry(&self, index: NodeIndex) -> Option<&TreeEntry<C>> {
        self.entries.get(index.0).filter(|entry| !entry.detached)
    }

    fn live_entry_mut(&mut self, index: NodeIndex) -> Result<&mut TreeEntry<C>, TreeError> {
        self.entries
            .get_mut(index.0)
            .filter(|entry| !entry.detached)
            .ok_or(TreeError::UnknownNode(index))
    }
}

impl<C> fmt::Debug for NodeTree<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTree")
            .field("nodes", &self.node_count())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TreeError
// ─────────────────────────────────────────────────────────────────────────────

/// Errors raised while building or editing a tree.
#[derive(Debug, Clone)]
pub enum TreeError {
    /// The referenced index does not resolve in this tree.
    UnknownNode(NodeIndex),
    /// Children can only be added under containers.
    ChildOfLeaf {
        /// The leaf that was used as a parent.
        parent: NodeIndex,
    },
    /// Sibling names must be unique under one parent.
    DuplicateChildName {
        /// The parent that already has a child with this name.
        parent: NodeIndex,
        /// The colliding name.
        name: String,
    },
    /// Only childless nodes can be pruned.
    PruneWithChildren {
        /// The node that still has children.
        node: NodeIndex,
        /// How many children it has.
        children: usize,
    },
    /// The root cannot be pruned.
    PruneRoot,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::UnknownNode(index) => write!(f, "unknown node: {index}"),
            TreeError::ChildOfLeaf { parent } => {
                write!(f, "cannot add children under leaf: {parent}")
            }
            TreeError::DuplicateChildName { parent, name } => {
                write!(f, "{parent} already has a child named '{name}'")
            }
            TreeError::PruneWithChildren { node, children } => {
                write!(f, "cannot prune {node}: it still has {children} children")
            }
            TreeError::PruneRoot => write!(f, "cannot prune the root node"),
        }
    }
}

impl core::error::Error for TreeError {}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
