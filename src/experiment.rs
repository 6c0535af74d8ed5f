//! Entry points: raw assignment vectors and multi-clustering containers.
//!
//! [`cluster_contrasts`] is the only implementation of the pipeline
//! (levels, contrasts, assembly). [`ClusterExperiment`] holds several
//! clusterings of the same samples plus an optional cluster dendrogram, and
//! only picks out the assignment and tree to hand to it.

use tracing::debug;

use crate::config::ContrastConfig;
use crate::contrast::build_contrasts;
use crate::error::{Error, Result};
use crate::hierarchy::{ClusterTree, HealthCheck, Severity};
use crate::labels::ClusterLevels;
use crate::matrix::ContrastOutput;

/// Build contrasts for one cluster assignment.
///
/// Configuration is validated before any level or contrast is computed.
/// Rows of the output are the canonical levels (display names).
///
/// ```rust
/// use cluster_contrasts::{cluster_contrasts, ContrastConfig, ContrastType};
///
/// let cfg = ContrastConfig::new().with_contrast_type(ContrastType::OneAgainstAll);
/// let out = cluster_contrasts(&[1, 2, 3, -1, 2], None, &cfg).unwrap();
/// assert_eq!(out.formulas()[0], "Cl01-(Cl02+Cl03)/2");
/// ```
pub fn cluster_contrasts(
    assignment: &[i64],
    tree: Option<&ClusterTree>,
    config: &ContrastConfig,
) -> Result<ContrastOutput> {
    let pairs = config.validate()?;
    let levels =
        ClusterLevels::with_prefix(assignment, config.remove_negative, &config.level_prefix);
    let contrasts = build_contrasts(&levels, config.contrast_type, tree, pairs.as_ref())?;
    debug!(
        contrast_type = config.contrast_type.as_str(),
        output = config.output.as_str(),
        "assembling contrasts"
    );
    ContrastOutput::assemble(&contrasts, &levels.names(), config.output)
}

/// A named clustering of the experiment's samples.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clustering {
    /// Label of the clustering (e.g. `"k=5"`).
    pub label: String,
    /// One cluster id per sample.
    pub assignment: Vec<i64>,
}

/// Several clusterings of the same samples.
///
/// One clustering is primary; one may carry a dendrogram over its clusters.
#[derive(Debug, Clone)]
pub struct ClusterExperiment {
    n_samples: usize,
    clusterings: Vec<Clustering>,
    primary: Option<usize>,
    dendrogram: Option<(usize, ClusterTree)>,
}

impl ClusterExperiment {
    /// Empty experiment over `n_samples` samples.
    pub fn new(n_samples: usize) -> Self {
        Self {
            n_samples,
            clusterings: Vec::new(),
            primary: None,
            dendrogram: None,
        }
    }

    /// Number of samples.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Add a clustering; the first one added becomes primary.
    pub fn add_clustering(
        &mut self,
        label: impl Into<String>,
        assignment: Vec<i64>,
    ) -> Result<usize> {
        let label = label.into();
        if assignment.len() != self.n_samples {
            return Err(Error::ShapeMismatch {
                expected: format!("{} samples", self.n_samples),
                actual: format!("{} samples", assignment.len()),
            });
        }
        if self.index_of(&label).is_some() {
            return Err(Error::InvalidParameter {
                name: "label",
                message: "clustering label already used",
            });
        }
        self.clusterings.push(Clustering { label, assignment });
        let idx = self.clusterings.len() - 1;
        if self.primary.is_none() {
            self.primary = Some(idx);
        }
        Ok(idx)
    }

    /// All clusterings, in insertion order.
    pub fn clusterings(&self) -> &[Clustering] {
        &self.clusterings
    }

    /// Clustering by label.
    pub fn clustering(&self, label: &str) -> Option<&Clustering> {
        self.index_of(label).map(|i| &self.clusterings[i])
    }

    /// Make `label` the primary clustering.
    pub fn set_primary(&mut self, label: &str) -> Result<()> {
        let idx = self.require(label)?;
        self.primary = Some(idx);
        Ok(())
    }

    /// The primary clustering.
    pub fn primary(&self) -> Option<&Clustering> {
        self.primary.map(|i| &self.clusterings[i])
    }

    /// Attach a dendrogram over the clusters of clustering `label`.
    ///
    /// Only the shape of the tree is checked here. Tip names are matched
    /// against the levels when contrasts are built, under that call's
    /// prefix and `remove_negative`.
    pub fn set_dendrogram(&mut self, label: &str, tree: ClusterTree) -> Result<()> {
        let idx = self.require(label)?;
        let report = tree.health_check();
        debug!(clustering = label, tips = report.tip_count, "storing cluster dendrogram");
        if let Some(issue) = report.issues.iter().find(|i| i.severity == Severity::Error) {
            return Err(Error::Other(format!("cluster dendrogram rejected: {issue}")));
        }
        self.dendrogram = Some((idx, tree));
        Ok(())
    }

    /// The stored dendrogram and the label of the clustering it describes.
    pub fn dendrogram(&self) -> Option<(&str, &ClusterTree)> {
        self.dendrogram
            .as_ref()
            .map(|(i, t)| (self.clusterings[*i].label.as_str(), t))
    }

    /// Contrasts for the primary clustering.
    pub fn contrasts(&self, config: &ContrastConfig) -> Result<ContrastOutput> {
        let primary = self.primary().ok_or(Error::EmptyInput)?;
        self.contrasts_for(&primary.label, config)
    }

    /// Contrasts for clustering `label`.
    ///
    /// The stored dendrogram is used only when it belongs to `label`.
    pub fn contrasts_for(&self, label: &str, config: &ContrastConfig) -> Result<ContrastOutput> {
        let idx = self.require(label)?;
        let tree = self
            .dendrogram
            .as_ref()
            .filter(|(i, _)| *i == idx)
            .map(|(_, t)| t);
        cluster_contrasts(&self.clusterings[idx].assignment, tree, config)
    }

    fn index_of(&self, label: &str) -> Option<usize> {
        self.clusterings.iter().position(|c| c.label == label)
    }

    fn require(&self, label: &str) -> Result<usize> {
        self.index_of(label)
            .ok_or_else(|| Error::Other(format!("no clustering labelled '{label}'")))
    }
}
