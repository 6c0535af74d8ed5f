//! Pairwise contrasts.

use std::collections::HashSet;

use tracing::warn;

use super::Contrast;
use crate::error::{Error, Result};
use crate::labels::ClusterLevels;

/// Ordered list of cluster-id pairs to contrast.
///
/// Pairs use original cluster ids, not display names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairMatrix {
    pairs: Vec<(i64, i64)>,
}

impl PairMatrix {
    /// Build from matrix rows; every row must have exactly two columns.
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self> {
        let pairs = rows
            .iter()
            .enumerate()
            .map(|(row, r)| match r.as_ref() {
                &[a, b] => Ok((a, b)),
                other => Err(Error::PairMatrixShape {
                    row,
                    found: other.len(),
                }),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { pairs })
    }

    /// Build from `(a, b)` tuples.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i64, i64)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
        }
    }

    /// Every unordered pair of distinct levels, in canonical order.
    pub fn all_pairs(levels: &ClusterLevels) -> Self {
        let ids = levels.ids();
        let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2);
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                pairs.push((a, b));
            }
        }
        Self { pairs }
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.pairs.iter().copied()
    }
}

/// One `A-B` contrast per pair, named `A-B`.
///
/// Every id must be a level; self pairs are rejected and repeated
/// unordered pairs are dropped.
pub(crate) fn pair_contrasts(
    levels: &ClusterLevels,
    pairs: Option<&PairMatrix>,
) -> Result<Vec<Contrast>> {
    let generated;
    let pairs = match pairs {
        Some(p) => p,
        None => {
            generated = PairMatrix::all_pairs(levels);
            &generated
        }
    };

    let lookup = move |id: i64| {
        levels
            .index_of_id(id)
            .and_then(|i| levels.level(i))
            .map(|l| l.name.as_str())
            .ok_or(Error::UnknownLevel {
                value: id.to_string(),
            })
    };

    let mut resolved = Vec::with_capacity(pairs.len());
    for (a, b) in pairs.iter() {
        let (na, nb) = (lookup(a)?, lookup(b)?);
        if a == b {
            return Err(Error::InvalidParameter {
                name: "pair_matrix",
                message: "a cluster cannot be contrasted with itself",
            });
        }
        resolved.push((na, nb));
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(resolved.len());
    for (a, b) in resolved {
        let key = if a < b { (a, b) } else { (b, a) };
        if !seen.insert(key) {
            warn!(pair = %format!("{a}-{b}"), "dropping repeated pair");
            continue;
        }
        let name = format!("{a}-{b}");
        out.push(Contrast::between(&[a], &[b], Some(name))?);
    }
    Ok(out)
}
