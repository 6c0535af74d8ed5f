//! Contrast construction.
//!
//! A contrast compares the mean expression of one group of cluster levels
//! with another. Three strategies decide which groups get compared:
//!
//! | Strategy | One contrast per | Form | Named |
//! |----------|------------------|------|-------|
//! | [`ContrastType::Pairs`] | pair of levels | `A-B` | `A-B` |
//! | [`ContrastType::OneAgainstAll`] | level | `A-(B+C)/2` | `A` |
//! | [`ContrastType::Dendro`] | internal tree node | `(A+B)/2-C` | no |
//!
//! Groups with more than one level are averaged, so every contrast's
//! weights sum to zero:
//!
//! ```text
//!            Cl01  Cl02  Cl03
//! Cl01-(..)   1   -1/2  -1/2
//! ```
//!
//! Contrasts are built directly as weight maps; the symbolic formula is
//! rendered alongside for display and for consumers that parse formulas.

mod pairs;
mod weight;

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::hierarchy::{ClusterTree, NodeId};
use crate::labels::ClusterLevels;

pub use pairs::PairMatrix;
pub use weight::{Contrast, Weight};

/// Which comparisons to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ContrastType {
    /// One contrast per internal node of the cluster tree.
    #[default]
    Dendro,
    /// One contrast per pair of levels.
    Pairs,
    /// Each level against the average of all others.
    OneAgainstAll,
}

impl ContrastType {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContrastType::Dendro => "Dendro",
            ContrastType::Pairs => "Pairs",
            ContrastType::OneAgainstAll => "OneAgainstAll",
        }
    }
}

impl fmt::Display for ContrastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContrastType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dendro" => Ok(ContrastType::Dendro),
            "pairs" => Ok(ContrastType::Pairs),
            "oneagainstall" => Ok(ContrastType::OneAgainstAll),
            _ => Err(Error::InvalidParameter {
                name: "contrast_type",
                message: "expected one of Dendro, Pairs, OneAgainstAll",
            }),
        }
    }
}

/// Build the contrasts of `contrast_type` over `levels`.
///
/// `tree` is required for [`ContrastType::Dendro`] and ignored otherwise;
/// `pairs` restricts [`ContrastType::Pairs`] to the given pairs (all pairs
/// when `None`). Fewer than two levels is an error for every strategy.
pub fn build_contrasts(
    levels: &ClusterLevels,
    contrast_type: ContrastType,
    tree: Option<&ClusterTree>,
    pairs: Option<&PairMatrix>,
) -> Result<Vec<Contrast>> {
    if contrast_type == ContrastType::Dendro && tree.is_none() {
        return Err(Error::MissingDendrogram);
    }
    if levels.len() < 2 {
        return Err(Error::TooFewLevels {
            contrast_type: contrast_type.as_str(),
            found: levels.len(),
        });
    }

    let contrasts = match (contrast_type, tree) {
        (ContrastType::Dendro, Some(tree)) => dendro_contrasts(levels, tree)?,
        (ContrastType::Dendro, None) => return Err(Error::MissingDendrogram),
        (ContrastType::Pairs, _) => pairs::pair_contrasts(levels, pairs)?,
        (ContrastType::OneAgainstAll, _) => one_against_all(levels)?,
    };

    debug!(
        contrast_type = contrast_type.as_str(),
        n_levels = levels.len(),
        n_contrasts = contrasts.len(),
        "built contrasts"
    );
    Ok(contrasts)
}

/// Each level against the average of the others, named after the level.
fn one_against_all(levels: &ClusterLevels) -> Result<Vec<Contrast>> {
    let names = levels.names();
    names
        .iter()
        .enumerate()
        .map(|(i, &one)| {
            let rest: Vec<&str> = names
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &n)| n)
                .collect();
            Contrast::between(&[one], &rest, Some(one.to_string()))
        })
        .collect()
}

/// First child's tips against second child's tips at every internal node.
fn dendro_contrasts(levels: &ClusterLevels, tree: &ClusterTree) -> Result<Vec<Contrast>> {
    let tip_levels = tree.match_levels(levels)?;
    tree.internal_nodes()
        .into_iter()
        .map(|node| {
            let [first, second] = tree.children(node)?;
            let left = tip_names(tree, levels, &tip_levels, first)?;
            let right = tip_names(tree, levels, &tip_levels, second)?;
            Contrast::between(&left, &right, None)
        })
        .collect()
}

/// Display names of the levels under `node`, left to right.
fn tip_names<'a>(
    tree: &ClusterTree,
    levels: &'a ClusterLevels,
    tip_levels: &HashMap<NodeId, usize>,
    node: NodeId,
) -> Result<Vec<&'a str>> {
    tree.descendant_tip_ids(node)?
        .into_iter()
        .map(|tip| {
            tip_levels
                .get(&tip)
                .and_then(|&idx| levels.level(idx))
                .map(|l| l.name.as_str())
                .ok_or_else(|| Error::Other(format!("tip {tip} has no matching level")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::TreeBuilder;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn tree(tips: &[&str]) -> ClusterTree {
        // ((a,b),c) for tips = [a, b, c]
        let mut b = TreeBuilder::new();
        let t: Vec<_> = tips.iter().map(|l| b.tip(*l)).collect();
        let ab = b.internal([t[0], t[1]]);
        let root = b.internal([ab, t[2]]);
        b.build(root).unwrap()
    }

    #[test]
    fn test_contrast_type_parse() {
        assert_eq!("pairs".parse::<ContrastType>(), Ok(ContrastType::Pairs));
        assert_eq!(
            "OneAgainstAll".parse::<ContrastType>(),
            Ok(ContrastType::OneAgainstAll)
        );
        assert!("nodes".parse::<ContrastType>().is_err());
        assert_eq!(ContrastType::default().to_string(), "Dendro");
    }

    #[test]
    fn test_one_against_all() -> Result<()> {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        let contrasts = build_contrasts(&levels, ContrastType::OneAgainstAll, None, None)?;
        let formulas: Vec<&str> = contrasts.iter().map(|c| c.formula()).collect();
        assert_eq!(
            formulas,
            vec![
                "Cl01-(Cl02+Cl03)/2",
                "Cl02-(Cl01+Cl03)/2",
                "Cl03-(Cl01+Cl02)/2"
            ]
        );
        let names: Vec<Option<&str>> = contrasts.iter().map(|c| c.name()).collect();
        assert_eq!(names, vec![Some("Cl01"), Some("Cl02"), Some("Cl03")]);
        Ok(())
    }

    #[test]
    fn test_dendro() -> Result<()> {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        let t = tree(&["Cl01", "Cl02", "Cl03"]);
        let contrasts = build_contrasts(&levels, ContrastType::Dendro, Some(&t), None)?;
        let formulas: Vec<&str> = contrasts.iter().map(|c| c.formula()).collect();
        assert_eq!(formulas, vec!["(Cl01+Cl02)/2-Cl03", "Cl01-Cl02"]);
        assert!(contrasts.iter().all(|c| c.name().is_none()));
        Ok(())
    }

    #[test]
    fn test_dendro_tips_by_raw_id_render_display_names() -> Result<()> {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        let t = tree(&["3", "1", "2"]);
        let contrasts = build_contrasts(&levels, ContrastType::Dendro, Some(&t), None)?;
        assert_eq!(contrasts[0].formula(), "(Cl03+Cl01)/2-Cl02");
        assert_eq!(contrasts[1].formula(), "Cl03-Cl01");
        Ok(())
    }

    #[test]
    fn test_dendro_requires_tree() {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        assert_eq!(
            build_contrasts(&levels, ContrastType::Dendro, None, None),
            Err(Error::MissingDendrogram)
        );
    }

    #[test]
    fn test_dendro_non_binary() {
        let levels = ClusterLevels::new(&[1, 2, 3], true);
        let mut b = TreeBuilder::new();
        let tips: Vec<_> = ["Cl01", "Cl02", "Cl03"].iter().map(|l| b.tip(*l)).collect();
        let root = b.internal(tips);
        let t = b.build(root).unwrap();
        assert!(matches!(
            build_contrasts(&levels, ContrastType::Dendro, Some(&t), None),
            Err(Error::NonBinaryNode { children: 3, .. })
        ));
    }

    #[test]
    fn test_single_level_is_degenerate() {
        let levels = ClusterLevels::new(&[4, 4, -1], true);
        for ct in [ContrastType::Pairs, ContrastType::OneAgainstAll] {
            assert_eq!(
                build_contrasts(&levels, ct, None, None),
                Err(Error::TooFewLevels {
                    contrast_type: ct.as_str(),
                    found: 1
                })
            );
        }
    }

    proptest! {
        #[test]
        fn one_against_all_weights_sum_to_zero(
            assignment in proptest::collection::vec(1i64..30, 2..100)
        ) {
            let levels = ClusterLevels::new(&assignment, true);
            prop_assume!(levels.len() >= 2);
            let contrasts =
                build_contrasts(&levels, ContrastType::OneAgainstAll, None, None).unwrap();
            prop_assert_eq!(contrasts.len(), levels.len());
            for c in &contrasts {
                prop_assert!(c.weight_sum().is_zero());
            }
        }

        #[test]
        fn all_pairs_are_unique(assignment in proptest::collection::vec(1i64..20, 2..100)) {
            let levels = ClusterLevels::new(&assignment, true);
            prop_assume!(levels.len() >= 2);
            let contrasts = build_contrasts(&levels, ContrastType::Pairs, None, None).unwrap();
            let n = levels.len();
            prop_assert_eq!(contrasts.len(), n * (n - 1) / 2);
            let names: HashSet<&str> = contrasts.iter().map(|c| c.formula()).collect();
            prop_assert_eq!(names.len(), contrasts.len());
        }
    }
}
