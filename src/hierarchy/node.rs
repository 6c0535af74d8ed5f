//! Arena node of a cluster tree.

use core::fmt;

/// Index of a node in a [`ClusterTree`](super::ClusterTree) arena.
pub type NodeId = usize;

/// A node in a cluster tree.
///
/// Tips carry a level label; internal nodes carry child ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Position in the arena.
    pub id: NodeId,
    /// Tip or internal payload.
    pub kind: NodeKind,
    /// Parent node (`None` for the root).
    pub parent: Option<NodeId>,
}

/// Payload of a tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Tip node labelled with a cluster level.
    Tip(String),
    /// Internal node; well-formed trees have exactly two children.
    Internal(Vec<NodeId>),
}

impl Node {
    /// Check if this is a tip.
    pub fn is_tip(&self) -> bool {
        matches!(self.kind, NodeKind::Tip(_))
    }

    /// Tip label, if this is a tip.
    pub fn label(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Tip(label) => Some(label),
            NodeKind::Internal(_) => None,
        }
    }

    /// Child ids (empty for tips).
    pub fn child_ids(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Tip(_) => &[],
            NodeKind::Internal(children) => children,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Tip(label) => write!(f, "Tip[{}]: {}", self.id, label),
            NodeKind::Internal(children) => write!(f, "Node[{}] -> {:?}", self.id, children),
        }
    }
}
