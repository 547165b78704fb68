//! Stable node identities and per-node metadata.
//!
//! Every node in a tree carries a [`Descriptor`]: a stable, path-shaped
//! [`NodeId`], a human-readable display name, the node kind, and tags.
//! Identities are derived from the tree structure, so the same tree
//! built twice yields the same ids. Listeners receive descriptors with
//! every notification and should treat them as the node's public face.

use core::fmt;

use gauntlet_node::node::NodeKind;

// ─────────────────────────────────────────────────────────────────────────────
// NodeId
// ─────────────────────────────────────────────────────────────────────────────

/// A stable, hierarchical node identity.
///
/// An id is the path of name segments from the root down to the node,
/// displayed with `/` separators. Ids order lexicographically by path,
/// which groups siblings under their parent.
///
/// # Example
///
/// ```
/// use gauntlet_engine::descriptor::NodeId;
///
/// let id = NodeId::root("suite").child("parser").child("empty_input");
/// assert_eq!(id.to_string(), "suite/parser/empty_input");
/// assert_eq!(id.parent(), Some(NodeId::root("suite").child("parser")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    segments: Vec<String>,
}

impl NodeId {
    /// The identity of a root node.
    #[must_use]
    pub fn root(segment: impl Into<String>) -> Self {
        Self { segments: vec![segment.into()] }
    }

    /// The identity of a child of this node.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// The identity of this node's parent, or `None` for a root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self { segments: self.segments[..self.segments.len() - 1].to_vec() })
    }

    /// The path segments from the root down to this node.
    ///
    /// Never empty.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The node's own name, the last path segment.
    #[must_use]
    pub fn last_segment(&self) -> &str {
        match self.segments.last() {
            Some(segment) => segment,
            // Unreachable: constructors never build an empty path.
            None => "",
        }
    }

    /// How many segments deep this id is. A root has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptor
// ─────────────────────────────────────────────────────────────────────────────

/// Public metadata for one node in a tree.
///
/// Descriptors are created by the tree when nodes are added and handed
/// to listeners with every notification. The display name defaults to
/// the last id segment until overridden.
#[derive(Debug, Clone)]
pub struct Descriptor {
    id: NodeId,
    display_name: String,
    kind: NodeKind,
    tags: Vec<String>,
}

impl Descriptor {
    pub(crate) fn new(id: NodeId, kind: NodeKind) -> Self {
        let display_name = id.last_segment().to_owned();
        Self { id, display_name, kind, tags: Vec::new() }
    }

    pub(crate) fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = name.into();
    }

    pub(crate) fn push_tag(&mut self, tag: impl Into<String>) {
        self.tags.push(tag.into());
    }

    /// The node's stable identity.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The human-readable name reported to listeners.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Whether this node is a container or a leaf.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Tags declared directly on this node, in declaration order.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Returns `true` for container nodes.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Returns `true` for leaf nodes.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
