//! Cluster tree arena and navigation.
//!
//! A [`ClusterTree`] is a rooted tree whose tips are cluster levels (not
//! samples). Nodes live in a flat arena and refer to each other by index,
//! so every query is an index walk:
//!
//! ```text
//!            4            preorder:  4, 3, 0, 1, 2
//!           / \           internal:  4, 3
//!          3   2 (C)      tips:      0, 1, 2
//!         / \
//!    (A) 0   1 (B)
//! ```
//!
//! Internal nodes are listed in preorder (root first, first child before
//! second). Dendrogram contrasts follow that order.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::dendrogram::Dendrogram;
use super::node::{Node, NodeId, NodeKind};
use crate::error::{Error, Result};
use crate::labels::ClusterLevels;

/// Incremental constructor for a [`ClusterTree`].
///
/// ```rust
/// use cluster_contrasts::hierarchy::TreeBuilder;
///
/// let mut b = TreeBuilder::new();
/// let a = b.tip("Cl01");
/// let bb = b.tip("Cl02");
/// let c = b.tip("Cl03");
/// let ab = b.internal([a, bb]);
/// let root = b.internal([ab, c]);
/// let tree = b.build(root).unwrap();
/// assert_eq!(tree.internal_nodes(), vec![root, ab]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tip labelled `label`.
    pub fn tip(&mut self, label: impl Into<String>) -> NodeId {
        self.push(NodeKind::Tip(label.into()))
    }

    /// Add an internal node over `children`.
    pub fn internal(&mut self, children: impl IntoIterator<Item = NodeId>) -> NodeId {
        self.push(NodeKind::Internal(children.into_iter().collect()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            id,
            kind,
            parent: None,
        });
        id
    }

    /// Finish the tree rooted at `root`.
    ///
    /// Fails if a child id is out of range, a node has more than one parent,
    /// or some node cannot be reached from `root`. Child counts are not
    /// checked here; [`ClusterTree::children`] rejects non-binary nodes.
    pub fn build(mut self, root: NodeId) -> Result<ClusterTree> {
        let n = self.nodes.len();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if root >= n {
            return Err(Error::InvalidParameter {
                name: "root",
                message: "root id is not a node of the tree",
            });
        }

        let mut parents: Vec<Option<NodeId>> = vec![None; n];
        for node in &self.nodes {
            for &child in node.child_ids() {
                if child >= n {
                    return Err(Error::InvalidParameter {
                        name: "children",
                        message: "child id is not a node of the tree",
                    });
                }
                if child == root || parents[child].is_some() {
                    return Err(Error::InvalidParameter {
                        name: "children",
                        message: "node has more than one parent",
                    });
                }
                parents[child] = Some(node.id);
            }
        }
        for (node, parent) in self.nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }

        let tree = ClusterTree {
            nodes: self.nodes,
            root,
        };
        let reached = tree.preorder_from(root).len();
        if reached != n {
            return Err(Error::Other(format!(
                "{} of {} tree nodes are not reachable from the root",
                n - reached,
                n
            )));
        }
        Ok(tree)
    }
}

/// An immutable rooted tree over cluster levels.
#[derive(Debug, Clone)]
pub struct ClusterTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ClusterTree {
    /// Convert a merge-history dendrogram, labelling leaf `i` with `labels[i]`.
    pub fn from_dendrogram<S: AsRef<str>>(dend: &Dendrogram, labels: &[S]) -> Result<Self> {
        dend.check()?;
        if labels.len() != dend.n_items() {
            return Err(Error::ShapeMismatch {
                expected: format!("{} tip labels", dend.n_items()),
                actual: format!("{} tip labels", labels.len()),
            });
        }

        let mut builder = TreeBuilder::new();
        let mut root = 0;
        for label in labels {
            root = builder.tip(label.as_ref());
        }
        for merge in dend.merges() {
            root = builder.internal([merge.cluster_a, merge.cluster_b]);
        }
        builder.build(root)
    }

    /// Root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A built tree always holds at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Iterate over the arena in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Parent of `id` (`None` for the root or unknown ids).
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    /// Number of tips.
    pub fn n_tips(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_tip()).count()
    }

    /// All node ids in preorder.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root)
    }

    fn preorder_from(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if seen[id] {
                continue;
            }
            seen[id] = true;
            out.push(id);
            stack.extend(self.nodes[id].child_ids().iter().rev());
        }
        out
    }

    /// Tip labels, left to right.
    pub fn tip_labels(&self) -> Vec<&str> {
        self.preorder()
            .into_iter()
            .filter_map(|id| self.nodes[id].label())
            .collect()
    }

    /// Label of tip `id`; `None` for internal or out-of-range ids.
    pub fn tip_label(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).and_then(Node::label)
    }

    /// Internal node ids in preorder.
    pub fn internal_nodes(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| !self.nodes[id].is_tip())
            .collect()
    }

    /// The two children of an internal node.
    pub fn children(&self, id: NodeId) -> Result<[NodeId; 2]> {
        let node = self.get(id)?;
        match node.child_ids() {
            &[a, b] => Ok([a, b]),
            other => Err(Error::NonBinaryNode {
                node: id,
                children: other.len(),
            }),
        }
    }

    /// Tip node ids under `id`, left to right. A tip is its own descendant.
    pub fn descendant_tip_ids(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.get(id)?;
        Ok(self
            .preorder_from(id)
            .into_iter()
            .filter(|&n| self.nodes[n].is_tip())
            .collect())
    }

    /// Tip labels under `id`, left to right.
    pub fn descendant_tips(&self, id: NodeId) -> Result<Vec<&str>> {
        Ok(self
            .descendant_tip_ids(id)?
            .into_iter()
            .filter_map(|n| self.nodes[n].label())
            .collect())
    }

    /// Match tips to `levels`, returning the level index of every tip.
    ///
    /// Tips may be labelled with display names (`Cl03`) or raw cluster ids
    /// (`3`). The tip set must equal the level set exactly: every level
    /// covered by one tip, every tip naming one level.
    pub fn match_levels(&self, levels: &ClusterLevels) -> Result<HashMap<NodeId, usize>> {
        let mut matched = HashMap::new();
        let mut covered = vec![false; levels.len()];
        let mut unexpected = Vec::new();
        let mut by_raw_id = 0usize;

        for node in self.nodes.iter() {
            let Some(label) = node.label() else {
                continue;
            };
            match levels.resolve(label) {
                Some(idx) if !covered[idx] => {
                    covered[idx] = true;
                    if levels.index_of_name(label).is_none() {
                        by_raw_id += 1;
                    }
                    matched.insert(node.id, idx);
                }
                _ => unexpected.push(label.to_string()),
            }
        }

        let missing: Vec<String> = covered
            .iter()
            .enumerate()
            .filter(|(_, c)| !**c)
            .filter_map(|(i, _)| levels.level(i).map(|l| l.name.clone()))
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(Error::TipMismatch {
                missing,
                unexpected,
            });
        }
        if by_raw_id > 0 {
            warn!(
                tips = by_raw_id,
                "tree tips labelled by raw cluster id; output uses display names"
            );
        }
        debug!(n_tips = matched.len(), "matched tree tips to levels");
        Ok(matched)
    }

    fn get(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(Error::InvalidParameter {
            name: "node",
            message: "node id is not part of the tree",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `((A,B),C)`
    fn abc() -> (ClusterTree, [NodeId; 5]) {
        let mut b = TreeBuilder::new();
        let a = b.tip("A");
        let bb = b.tip("B");
        let c = b.tip("C");
        let ab = b.internal([a, bb]);
        let root = b.internal([ab, c]);
        (b.build(root).unwrap(), [a, bb, c, ab, root])
    }

    #[test]
    fn test_navigation() -> Result<()> {
        let (tree, [a, bb, c, ab, root]) = abc();
        assert_eq!(tree.root(), root);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.n_tips(), 3);
        assert_eq!(tree.tip_labels(), vec!["A", "B", "C"]);
        assert_eq!(tree.internal_nodes(), vec![root, ab]);
        assert_eq!(tree.children(root)?, [ab, c]);
        assert_eq!(tree.children(ab)?, [a, bb]);
        assert_eq!(tree.descendant_tips(root)?, vec!["A", "B", "C"]);
        assert_eq!(tree.descendant_tips(ab)?, vec!["A", "B"]);
        assert_eq!(tree.descendant_tips(c)?, vec!["C"]);
        assert_eq!(tree.parent(a), Some(ab));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.tip_label(c), Some("C"));
        assert_eq!(tree.tip_label(ab), None);
        Ok(())
    }

    #[test]
    fn test_non_binary_node() {
        let mut b = TreeBuilder::new();
        let tips: Vec<NodeId> = ["A", "B", "C"].into_iter().map(|l| b.tip(l)).collect();
        let root = b.internal(tips);
        let tree = b.build(root).unwrap();
        assert_eq!(
            tree.children(root),
            Err(Error::NonBinaryNode {
                node: root,
                children: 3
            })
        );
    }

    #[test]
    fn test_tip_has_no_children() {
        let (tree, [a, ..]) = abc();
        assert!(matches!(
            tree.children(a),
            Err(Error::NonBinaryNode { children: 0, .. })
        ));
    }

    #[test]
    fn test_build_rejects_shared_child() {
        let mut b = TreeBuilder::new();
        let a = b.tip("A");
        let x = b.internal([a]);
        let root = b.internal([x, a]);
        assert!(b.build(root).is_err());
    }

    #[test]
    fn test_build_rejects_unreachable() {
        let mut b = TreeBuilder::new();
        let a = b.tip("A");
        let bb = b.tip("B");
        let _stray = b.tip("C");
        let root = b.internal([a, bb]);
        assert!(b.build(root).is_err());
    }

    #[test]
    fn test_from_dendrogram() -> Result<()> {
        let dend = Dendrogram::from_merges(3, &[(0, 1, 0.4), (3, 2, 1.2)])?;
        let tree = ClusterTree::from_dendrogram(&dend, &["Cl01", "Cl02", "Cl03"])?;
        assert_eq!(tree.root(), 4);
        assert_eq!(tree.internal_nodes(), vec![4, 3]);
        assert_eq!(tree.descendant_tips(3)?, vec!["Cl01", "Cl02"]);
        Ok(())
    }

    #[test]
    fn test_from_dendrogram_label_count() -> Result<()> {
        let dend = Dendrogram::from_merges(3, &[(0, 1, 0.4), (3, 2, 1.2)])?;
        assert!(matches!(
            ClusterTree::from_dendrogram(&dend, &["Cl01", "Cl02"]),
            Err(Error::ShapeMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_match_levels_by_name_and_id() -> Result<()> {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        let mut b = TreeBuilder::new();
        let t1 = b.tip("Cl01");
        let t2 = b.tip("2");
        let t3 = b.tip("Cl03");
        let x = b.internal([t1, t2]);
        let root = b.internal([x, t3]);
        let tree = b.build(root)?;

        let matched = tree.match_levels(&levels)?;
        assert_eq!(matched[&t1], 0);
        assert_eq!(matched[&t2], 1);
        assert_eq!(matched[&t3], 2);
        Ok(())
    }

    #[test]
    fn test_match_levels_mismatch() {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        let mut b = TreeBuilder::new();
        let t1 = b.tip("Cl01");
        let t2 = b.tip("Cl02");
        let t4 = b.tip("Cl04");
        let x = b.internal([t1, t2]);
        let root = b.internal([x, t4]);
        let tree = b.build(root).unwrap();

        assert_eq!(
            tree.match_levels(&levels),
            Err(Error::TipMismatch {
                missing: vec!["Cl03".to_string()],
                unexpected: vec!["Cl04".to_string()],
            })
        );
    }

    #[test]
    fn test_match_levels_duplicate_tip() {
        let levels = ClusterLevels::new(&[1, 2], true);
        let mut b = TreeBuilder::new();
        let t1 = b.tip("Cl01");
        let t2 = b.tip("1");
        let root = b.internal([t1, t2]);
        let tree = b.build(root).unwrap();
        assert!(matches!(
            tree.match_levels(&levels),
            Err(Error::TipMismatch { .. })
        ));
    }
}
