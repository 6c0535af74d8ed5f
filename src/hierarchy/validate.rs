//! Cluster tree health checks.
//!
//! [`ClusterTree`] construction already guarantees a single root and no
//! cycles. What it cannot guarantee is that the tree is usable for
//! dendrogram contrasts: every internal node binary, every tip labelled
//! uniquely. A health check collects all such problems at once instead of
//! failing on the first.
//!
//! ```rust
//! use cluster_contrasts::hierarchy::{HealthCheck, TreeBuilder};
//!
//! let mut b = TreeBuilder::new();
//! let tips: Vec<_> = ["Cl01", "Cl02", "Cl03"].into_iter().map(|l| b.tip(l)).collect();
//! let root = b.internal(tips);
//! let tree = b.build(root).unwrap();
//!
//! let report = tree.health_check();
//! assert!(!report.is_healthy());
//! ```

use std::collections::{HashMap, HashSet};

use super::ClusterTree;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational, not a problem.
    Info,
    /// Something unusual but not necessarily wrong.
    Warning,
    /// Contrasts cannot be built from this tree.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single issue found during a health check.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Node involved, if any.
    pub node_id: Option<usize>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            node_id: None,
        }
    }

    /// Attach the node this issue refers to.
    pub fn with_node(mut self, id: usize) -> Self {
        self.node_id = Some(id);
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(id) = self.node_id {
            write!(f, " (node {})", id)?;
        }
        Ok(())
    }
}

/// Health report for a cluster tree.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Issues found, in node order.
    pub issues: Vec<ValidationIssue>,
    /// Total number of nodes.
    pub node_count: usize,
    /// Number of tips.
    pub tip_count: usize,
    /// Longest root-to-tip path, in edges.
    pub max_depth: usize,
}

impl HealthReport {
    /// True when no issue is an error.
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    /// Count issues by severity.
    pub fn counts(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity).or_default() += 1;
        }
        counts
    }
}

impl std::fmt::Display for HealthReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Cluster tree: {} nodes ({} tips), depth {}",
            self.node_count, self.tip_count, self.max_depth
        )?;
        if self.issues.is_empty() {
            return write!(f, "no issues found");
        }
        let counts = self.counts();
        let parts: Vec<String> = [
            (Severity::Error, "errors"),
            (Severity::Warning, "warnings"),
            (Severity::Info, "info"),
        ]
        .iter()
        .filter_map(|(sev, name)| counts.get(sev).map(|c| format!("{} {}", c, name)))
        .collect();
        writeln!(f, "{}", parts.join(", "))?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Types that can be health-checked.
pub trait HealthCheck {
    /// Perform a health check and return a report.
    fn health_check(&self) -> HealthReport;

    /// Quick check: returns true if healthy.
    fn is_healthy(&self) -> bool {
        self.health_check().is_healthy()
    }
}

impl HealthCheck for ClusterTree {
    fn health_check(&self) -> HealthReport {
        let mut issues = Vec::new();
        let mut labels = HashSet::new();

        for node in self.iter() {
            match node.label() {
                Some(label) => {
                    if label.is_empty() {
                        issues.push(
                            ValidationIssue::new(Severity::Error, "tip has an empty label")
                                .with_node(node.id),
                        );
                    } else if !labels.insert(label) {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Error,
                                format!("duplicate tip label '{label}'"),
                            )
                            .with_node(node.id),
                        );
                    } else if label.trim().parse::<i64>().is_ok() {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Info,
                                format!("tip '{label}' is a raw cluster id"),
                            )
                            .with_node(node.id),
                        );
                    }
                }
                None => {
                    let n = node.child_ids().len();
                    if n != 2 {
                        issues.push(
                            ValidationIssue::new(
                                Severity::Error,
                                format!("internal node has {n} children; exactly 2 are required"),
                            )
                            .with_node(node.id),
                        );
                    }
                }
            }
        }

        let tip_count = self.n_tips();
        if tip_count < 2 {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                "fewer than 2 tips; no contrasts can be formed",
            ));
        }

        let mut depth = vec![0usize; self.len()];
        let mut max_depth = 0;
        for id in self.preorder() {
            if let Some(parent) = self.parent(id) {
                depth[id] = depth[parent] + 1;
                max_depth = max_depth.max(depth[id]);
            }
        }

        HealthReport {
            issues,
            node_count: self.len(),
            tip_count,
            max_depth,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::hierarchy::{Dendrogram, TreeBuilder};
    use proptest::prelude::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_healthy_binary_tree() {
        let mut b = TreeBuilder::new();
        let a = b.tip("Cl01");
        let c = b.tip("Cl02");
        let d = b.tip("Cl03");
        let x = b.internal([a, c]);
        let root = b.internal([x, d]);
        let report = b.build(root).unwrap().health_check();
        assert!(report.is_healthy(), "{}", report);
        assert_eq!(report.tip_count, 3);
        assert_eq!(report.max_depth, 2);
    }

    #[test]
    fn test_duplicate_and_non_binary() {
        let mut b = TreeBuilder::new();
        let a = b.tip("Cl01");
        let c = b.tip("Cl01");
        let d = b.tip("Cl02");
        let root = b.internal([a, c, d]);
        let report = b.build(root).unwrap().health_check();
        assert!(!report.is_healthy());
        assert_eq!(report.counts().get(&Severity::Error), Some(&2));
        let s = format!("{}", report);
        assert!(s.contains("duplicate tip label"));
        assert!(s.contains("3 children"));
    }

    #[test]
    fn test_raw_id_tips_are_reported_as_info() {
        let mut b = TreeBuilder::new();
        let a = b.tip("1");
        let c = b.tip("Cl02");
        let root = b.internal([a, c]);
        let report = b.build(root).unwrap().health_check();
        assert!(report.is_healthy());
        assert_eq!(report.counts().get(&Severity::Info), Some(&1));
        assert_eq!(report.issues[0].node_id, Some(a));
        assert!(format!("{}", report).contains("1 info"));
    }

    proptest! {
        #[test]
        fn caterpillar_dendrograms_are_healthy(n in 2usize..40) {
            // Merge leaves one at a time onto a growing cluster.
            let mut merges = vec![(0, 1, 1.0)];
            for leaf in 2..n {
                merges.push((n + leaf - 2, leaf, leaf as f64));
            }
            let dend = Dendrogram::from_merges(n, &merges).unwrap();
            let labels: Vec<String> = (1..=n).map(|i| format!("Cl{i:02}")).collect();
            let tree = ClusterTree::from_dendrogram(&dend, &labels).unwrap();
            let report = tree.health_check();
            prop_assert!(report.is_healthy(), "{}", report);
            prop_assert_eq!(report.max_depth, n - 1);
            prop_assert_eq!(tree.internal_nodes().len(), n - 1);
        }
    }
}
