//! Contrast configuration.

use crate::contrast::{ContrastType, PairMatrix};
use crate::error::Result;
use crate::labels::DEFAULT_PREFIX;
use crate::matrix::OutputType;

/// Configuration for building contrasts from a cluster assignment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ContrastConfig {
    /// Which comparisons to build.
    pub contrast_type: ContrastType,
    /// Output packaging.
    pub output: OutputType,
    /// Drop unassigned (`<= 0`) cluster ids before building levels.
    pub remove_negative: bool,
    /// Prefix of level display names.
    pub level_prefix: String,
    /// Rows of cluster-id pairs for [`ContrastType::Pairs`]; all pairs when `None`.
    pub pair_matrix: Option<Vec<Vec<i64>>>,
}

impl Default for ContrastConfig {
    fn default() -> Self {
        Self {
            contrast_type: ContrastType::Dendro,
            output: OutputType::Limma,
            remove_negative: true,
            level_prefix: DEFAULT_PREFIX.to_string(),
            pair_matrix: None,
        }
    }
}

impl ContrastConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the contrast strategy.
    pub fn with_contrast_type(mut self, contrast_type: ContrastType) -> Self {
        self.contrast_type = contrast_type;
        self
    }

    /// Set the output format.
    pub fn with_output(mut self, output: OutputType) -> Self {
        self.output = output;
        self
    }

    /// Keep or drop non-positive cluster ids.
    pub fn with_remove_negative(mut self, remove: bool) -> Self {
        self.remove_negative = remove;
        self
    }

    /// Set the display-name prefix.
    pub fn with_level_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.level_prefix = prefix.into();
        self
    }

    /// Restrict pairwise contrasts to these rows of cluster ids.
    pub fn with_pair_matrix(mut self, rows: Vec<Vec<i64>>) -> Self {
        self.pair_matrix = Some(rows);
        self
    }

    /// Restrict pairwise contrasts to these pairs of cluster ids.
    pub fn with_pairs(self, pairs: impl IntoIterator<Item = (i64, i64)>) -> Self {
        self.with_pair_matrix(pairs.into_iter().map(|(a, b)| vec![a, b]).collect())
    }

    /// Checks that need no data: output availability and pair matrix shape.
    ///
    /// Returns the parsed pair matrix, if one was given.
    pub fn validate(&self) -> Result<Option<PairMatrix>> {
        self.output.ensure_available()?;
        self.pair_matrix
            .as_deref()
            .map(PairMatrix::from_rows)
            .transpose()
    }
}
