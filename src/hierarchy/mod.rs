//! Hierarchies over cluster levels.
//!
//! Once samples are clustered, the clusters themselves can be arranged in
//! a tree: similar clusters merge early, distinct ones late.
//!
//! ```text
//!             root
//!            /    \
//!         n1        Cl04
//!        /  \
//!     Cl01   n2
//!           /  \
//!        Cl02  Cl03
//! ```
//!
//! Every internal node splits its tips into two groups, which is exactly
//! the comparison a dendrogram contrast tests: `Cl02-Cl03` at `n2`,
//! `Cl01-(Cl02+Cl03)/2` at `n1`, and so on up to the root.
//!
//! - [`Dendrogram`]: merge history as produced by agglomerative clustering
//! - [`ClusterTree`]: labelled arena tree with descendant/children queries
//! - [`TreeBuilder`]: build a [`ClusterTree`] node by node
//! - [`HealthCheck`]: collect every structural problem in one report

mod dendrogram;
mod node;
pub mod tree;
mod validate;

pub use dendrogram::{Dendrogram, Merge};
pub use node::{Node, NodeId, NodeKind};
pub use tree::{ClusterTree, TreeBuilder};
pub use validate::{HealthCheck, HealthReport, Severity, ValidationIssue};
