//! Merge-history dendrogram over cluster levels.
//!
//! This is the generic form most agglomerative clustering routines hand
//! back: `n` leaves numbered `0..n`, and merge `i` creating cluster id
//! `n + i` (SciPy/MATLAB convention). It carries no labels of its own; use
//! [`ClusterTree::from_dendrogram`](super::ClusterTree::from_dendrogram)
//! to attach level names and get a navigable tree.

use crate::error::{Error, Result};

/// A dendrogram recording how cluster levels were merged.
#[derive(Debug, Clone)]
pub struct Dendrogram {
    merges: Vec<Merge>,
    n_items: usize,
}

/// A single merge operation in the dendrogram.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Merge {
    /// First cluster being merged (index).
    pub cluster_a: usize,
    /// Second cluster being merged (index).
    pub cluster_b: usize,
    /// Height at which the merge occurred.
    pub distance: f64,
    /// Number of leaves under the merged cluster.
    pub size: usize,
}

impl Dendrogram {
    /// Create a new dendrogram for `n_items` leaves.
    pub fn new(n_items: usize) -> Self {
        Self {
            merges: Vec::with_capacity(n_items.saturating_sub(1)),
            n_items,
        }
    }

    /// Build from a complete merge list, checking that it describes one tree.
    pub fn from_merges(n_items: usize, merges: &[(usize, usize, f64)]) -> Result<Self> {
        let mut dend = Self::new(n_items);
        let mut sizes = vec![1usize; n_items];
        for &(a, b, distance) in merges {
            let size = match (sizes.get(a), sizes.get(b)) {
                (Some(sa), Some(sb)) => sa + sb,
                _ => {
                    return Err(Error::InvalidParameter {
                        name: "merges",
                        message: "merge references a cluster that does not exist yet",
                    })
                }
            };
            sizes.push(size);
            dend.add_merge(a, b, distance, size);
        }
        dend.check()?;
        Ok(dend)
    }

    /// Record a merge operation.
    pub fn add_merge(&mut self, cluster_a: usize, cluster_b: usize, distance: f64, size: usize) {
        self.merges.push(Merge {
            cluster_a,
            cluster_b,
            distance,
            size,
        });
    }

    /// Check that merges form a single rooted binary tree over all leaves.
    ///
    /// Each merge may only reference leaves or earlier merges, every cluster
    /// is merged at most once, and exactly `n_items - 1` merges are present.
    pub fn check(&self) -> Result<()> {
        if self.n_items == 0 {
            return Err(Error::EmptyInput);
        }
        if self.merges.len() != self.n_items - 1 {
            return Err(Error::ShapeMismatch {
                expected: format!("{} merges", self.n_items - 1),
                actual: format!("{} merges", self.merges.len()),
            });
        }

        let mut used = vec![false; self.n_items + self.merges.len()];
        for (i, merge) in self.merges.iter().enumerate() {
            let next_id = self.n_items + i;
            for c in [merge.cluster_a, merge.cluster_b] {
                if c >= next_id {
                    return Err(Error::InvalidParameter {
                        name: "merges",
                        message: "merge references a cluster that does not exist yet",
                    });
                }
                if used[c] {
                    return Err(Error::InvalidParameter {
                        name: "merges",
                        message: "cluster merged more than once",
                    });
                }
                used[c] = true;
            }
            if merge.cluster_a == merge.cluster_b {
                return Err(Error::InvalidParameter {
                    name: "merges",
                    message: "cluster merged with itself",
                });
            }
        }
        Ok(())
    }

    /// Number of leaves.
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    /// Number of merges recorded.
    pub fn n_merges(&self) -> usize {
        self.merges.len()
    }

    /// Iterate over merges in the order they happened.
    pub fn merges(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    /// Merge heights, in merge order.
    pub fn distances(&self) -> Vec<f64> {
        self.merges.iter().map(|m| m.distance).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dendrogram_creation() {
        let dendro = Dendrogram::new(5);
        assert_eq!(dendro.n_items(), 5);
        assert_eq!(dendro.n_merges(), 0);
        assert!(dendro.check().is_err());
    }

    #[test]
    fn test_from_merges_tracks_sizes() -> Result<()> {
        let dendro = Dendrogram::from_merges(4, &[(0, 1, 0.5), (2, 3, 0.7), (4, 5, 1.0)])?;
        assert_eq!(dendro.n_merges(), 3);
        let sizes: Vec<usize> = dendro.merges().map(|m| m.size).collect();
        assert_eq!(sizes, vec![2, 2, 4]);
        assert_eq!(dendro.distances(), vec![0.5, 0.7, 1.0]);
        Ok(())
    }

    #[test]
    fn test_forward_reference_rejected() {
        assert!(Dendrogram::from_merges(3, &[(0, 4, 0.5), (1, 2, 0.7)]).is_err());
    }

    #[test]
    fn test_double_merge_rejected() {
        let mut dendro = Dendrogram::new(3);
        dendro.add_merge(0, 1, 0.5, 2);
        dendro.add_merge(0, 2, 0.7, 2);
        assert!(dendro.check().is_err());
    }
}
