//! Contrast matrix assembly.
//!
//! Downstream DE engines take contrasts in one of two shapes:
//!
//! - **limma-style**: a numeric matrix $C$ with one row per level and one
//!   column per contrast. Column $j$ holds the weight of every level in
//!   contrast $j$, zero where the level is not referenced.
//! - **hypothesis-style**: the symbolic formulas plus the level vector,
//!   left for the consumer to parse.
//!
//! ```text
//!          Cl01-Cl02  Cl01-Cl03  Cl02-Cl03
//! Cl01         1          1          0
//! Cl02        -1          0          1
//! Cl03         0         -1         -1
//! ```

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;

use faer::{Mat, MatRef};
use tracing::debug;

use crate::contrast::Contrast;
use crate::error::{Error, Result};

/// Output format for assembled contrasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OutputType {
    /// Numeric level-by-contrast matrix.
    #[default]
    Limma,
    /// Formulas and level names, for hypothesis-based engines (MAST).
    Hypothesis,
}

impl OutputType {
    /// Canonical name.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::Limma => "limma",
            OutputType::Hypothesis => "Hypothesis",
        }
    }

    /// Fail unless this output format was compiled in.
    pub fn ensure_available(&self) -> Result<()> {
        match self {
            #[cfg(not(feature = "hypothesis"))]
            OutputType::Hypothesis => Err(self.unavailable()),
            _ => Ok(()),
        }
    }

    #[cfg(not(feature = "hypothesis"))]
    fn unavailable(&self) -> Error {
        Error::BackendUnavailable {
            output: self.as_str(),
            feature: "hypothesis",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "limma" => Ok(OutputType::Limma),
            "hypothesis" | "mast" => Ok(OutputType::Hypothesis),
            _ => Err(Error::InvalidParameter {
                name: "output",
                message: "expected limma or Hypothesis",
            }),
        }
    }
}

/// Map every level name to its row, rejecting duplicates.
fn level_index<S: AsRef<str>>(levels: &[S]) -> Result<HashMap<&str, usize>> {
    if levels.is_empty() {
        return Err(Error::EmptyInput);
    }
    let mut index = HashMap::with_capacity(levels.len());
    for (i, level) in levels.iter().enumerate() {
        if index.insert(level.as_ref(), i).is_some() {
            return Err(Error::InvalidParameter {
                name: "levels",
                message: "level names must be unique",
            });
        }
    }
    Ok(index)
}

/// Contrast names, or `None` when any contrast is unnamed (dendrogram mode).
fn contrast_names(contrasts: &[Contrast]) -> Option<Vec<String>> {
    contrasts
        .iter()
        .map(|c| c.name().map(str::to_string))
        .collect()
}

/// Numeric contrast matrix: rows are levels, columns are contrasts.
#[derive(Debug, Clone)]
pub struct ContrastMatrix {
    levels: Vec<String>,
    names: Option<Vec<String>>,
    formulas: Vec<String>,
    inner: Mat<f64>,
}

impl ContrastMatrix {
    /// Lay `contrasts` out against the ordered level vector `levels`.
    ///
    /// Every level a contrast references must be in `levels`.
    pub fn assemble<S: AsRef<str>>(contrasts: &[Contrast], levels: &[S]) -> Result<Self> {
        let index = level_index(levels)?;
        let mut inner = Mat::<f64>::zeros(levels.len(), contrasts.len());

        for (j, contrast) in contrasts.iter().enumerate() {
            for (level, weight) in contrast.weights() {
                let i = *index.get(level.as_str()).ok_or_else(|| Error::UnknownLevel {
                    value: level.clone(),
                })?;
                inner[(i, j)] += weight.to_f64();
            }
        }

        debug!(
            n_levels = levels.len(),
            n_contrasts = contrasts.len(),
            "assembled contrast matrix"
        );

        Ok(Self {
            levels: levels.iter().map(|l| l.as_ref().to_string()).collect(),
            names: contrast_names(contrasts),
            formulas: contrasts.iter().map(|c| c.formula().to_string()).collect(),
            inner,
        })
    }

    /// Number of levels (rows).
    pub fn nrows(&self) -> usize {
        self.inner.nrows()
    }

    /// Number of contrasts (columns).
    pub fn ncols(&self) -> usize {
        self.inner.ncols()
    }

    /// Get the matrix reference.
    pub fn as_ref(&self) -> MatRef<'_, f64> {
        self.inner.as_ref()
    }

    /// Row labels.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Column names; `None` for dendrogram contrasts, which are unnamed.
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }

    /// Symbolic formula of every column.
    pub fn formulas(&self) -> &[String] {
        &self.formulas
    }

    /// Weight of `level` in contrast `col`.
    pub fn get(&self, level: &str, col: usize) -> Option<f64> {
        let row = self.levels.iter().position(|l| l == level)?;
        (col < self.ncols()).then(|| self.inner[(row, col)])
    }

    /// Column `col` as a vector, in level order.
    pub fn column(&self, col: usize) -> Option<Vec<f64>> {
        (col < self.ncols()).then(|| (0..self.nrows()).map(|i| self.inner[(i, col)]).collect())
    }

    /// Sum of each column; zero (up to rounding) for well-formed contrasts.
    pub fn column_sums(&self) -> Vec<f64> {
        (0..self.ncols())
            .map(|j| (0..self.nrows()).map(|i| self.inner[(i, j)]).sum())
            .collect()
    }
}

/// Symbolic contrasts packaged with their level vector.
#[cfg(feature = "hypothesis")]
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hypothesis {
    formulas: Vec<String>,
    levels: Vec<String>,
    names: Option<Vec<String>>,
}

#[cfg(feature = "hypothesis")]
impl Hypothesis {
    /// Package `contrasts` with `levels`.
    ///
    /// Every referenced level must be in `levels`.
    pub fn new<S: AsRef<str>>(contrasts: &[Contrast], levels: &[S]) -> Result<Self> {
        let index = level_index(levels)?;
        for (level, _) in contrasts.iter().flat_map(|c| c.weights()) {
            if !index.contains_key(level.as_str()) {
                return Err(Error::UnknownLevel {
                    value: level.clone(),
                });
            }
        }
        Ok(Self {
            formulas: contrasts.iter().map(|c| c.formula().to_string()).collect(),
            levels: levels.iter().map(|l| l.as_ref().to_string()).collect(),
            names: contrast_names(contrasts),
        })
    }

    /// Formulas, one per contrast.
    pub fn formulas(&self) -> &[String] {
        &self.formulas
    }

    /// Level vector the formulas refer to.
    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Contrast names; `None` for dendrogram contrasts.
    pub fn names(&self) -> Option<&[String]> {
        self.names.as_deref()
    }
}

/// Assembled contrasts in the configured output format.
#[derive(Debug, Clone)]
pub enum ContrastOutput {
    /// limma-style matrix.
    Matrix(ContrastMatrix),
    /// Hypothesis packaging.
    #[cfg(feature = "hypothesis")]
    Hypothesis(Hypothesis),
}

impl ContrastOutput {
    /// Assemble `contrasts` over `levels` in format `output`.
    pub fn assemble<S: AsRef<str>>(
        contrasts: &[Contrast],
        levels: &[S],
        output: OutputType,
    ) -> Result<Self> {
        match output {
            OutputType::Limma => ContrastMatrix::assemble(contrasts, levels).map(Self::Matrix),
            #[cfg(feature = "hypothesis")]
            OutputType::Hypothesis => Hypothesis::new(contrasts, levels).map(Self::Hypothesis),
            #[cfg(not(feature = "hypothesis"))]
            OutputType::Hypothesis => Err(output.unavailable()),
        }
    }

    /// Contrast names; `None` for dendrogram contrasts.
    pub fn names(&self) -> Option<&[String]> {
        match self {
            ContrastOutput::Matrix(m) => m.names(),
            #[cfg(feature = "hypothesis")]
            ContrastOutput::Hypothesis(h) => h.names(),
        }
    }

    /// Symbolic formulas.
    pub fn formulas(&self) -> &[String] {
        match self {
            ContrastOutput::Matrix(m) => m.formulas(),
            #[cfg(feature = "hypothesis")]
            ContrastOutput::Hypothesis(h) => h.formulas(),
        }
    }

    /// The matrix, if this is limma-style output.
    pub fn as_matrix(&self) -> Option<&ContrastMatrix> {
        match self {
            ContrastOutput::Matrix(m) => Some(m),
            #[cfg(feature = "hypothesis")]
            ContrastOutput::Hypothesis(_) => None,
        }
    }

    /// The hypothesis packaging, if that was requested.
    #[cfg(feature = "hypothesis")]
    pub fn as_hypothesis(&self) -> Option<&Hypothesis> {
        match self {
            ContrastOutput::Matrix(_) => None,
            ContrastOutput::Hypothesis(h) => Some(h),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs_abc() -> Vec<Contrast> {
        [("A", "B"), ("A", "C"), ("B", "C")]
            .iter()
            .map(|&(a, b)| Contrast::between(&[a], &[b], Some(format!("{a}-{b}"))).unwrap())
            .collect()
    }

    #[test]
    fn test_assemble_pairs() -> Result<()> {
        let m = ContrastMatrix::assemble(&pairs_abc(), &["A", "B", "C"])?;
        assert_eq!((m.nrows(), m.ncols()), (3, 3));
        assert_eq!(m.column(0), Some(vec![1.0, -1.0, 0.0]));
        assert_eq!(m.column(2), Some(vec![0.0, 1.0, -1.0]));
        assert_eq!(m.get("C", 1), Some(-1.0));
        assert_eq!(m.get("D", 1), None);
        assert_eq!(m.column(3), None);
        assert_eq!(
            m.names().map(|n| n.to_vec()),
            Some(vec!["A-B".to_string(), "A-C".to_string(), "B-C".to_string()])
        );
        Ok(())
    }

    #[test]
    fn test_assemble_group_weights() -> Result<()> {
        let c = Contrast::between(&["A", "B"], &["C"], None)?;
        let m = ContrastMatrix::assemble(&[c], &["A", "B", "C", "D"])?;
        assert_eq!(m.column(0), Some(vec![0.5, 0.5, -1.0, 0.0]));
        assert_eq!(m.names(), None);
        assert_eq!(m.formulas(), &["(A+B)/2-C".to_string()]);
        assert!(m.column_sums()[0].abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_unknown_level_is_fatal() {
        let err = ContrastMatrix::assemble(&pairs_abc(), &["A", "B"]).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownLevel {
                value: "C".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        assert!(ContrastMatrix::assemble(&pairs_abc(), &["A", "B", "C", "A"]).is_err());
        assert!(ContrastMatrix::assemble::<&str>(&pairs_abc(), &[]).is_err());
    }

    #[test]
    fn test_assembly_is_deterministic() -> Result<()> {
        let contrasts = vec![
            Contrast::between(&["A"], &["B", "C", "D"], Some("A".into()))?,
            Contrast::between(&["B", "C"], &["A", "D"], None)?,
        ];
        let levels = ["A", "B", "C", "D"];
        let m1 = ContrastMatrix::assemble(&contrasts, &levels)?;
        let m2 = ContrastMatrix::assemble(&contrasts, &levels)?;
        for j in 0..m1.ncols() {
            for i in 0..m1.nrows() {
                assert_eq!(m1.as_ref()[(i, j)].to_bits(), m2.as_ref()[(i, j)].to_bits());
            }
        }
        Ok(())
    }

    #[test]
    fn test_output_type_parse() {
        assert_eq!("MAST".parse::<OutputType>(), Ok(OutputType::Hypothesis));
        assert_eq!("limma".parse::<OutputType>(), Ok(OutputType::Limma));
        assert!("edgeR".parse::<OutputType>().is_err());
        assert!(OutputType::Limma.ensure_available().is_ok());
    }

    #[cfg(feature = "hypothesis")]
    #[test]
    fn test_hypothesis_packaging() -> Result<()> {
        assert!(OutputType::Hypothesis.ensure_available().is_ok());
        let out = ContrastOutput::assemble(&pairs_abc(), &["A", "B", "C"], OutputType::Hypothesis)?;
        let h = out.as_hypothesis().unwrap();
        assert_eq!(h.formulas(), &["A-B", "A-C", "B-C"]);
        assert_eq!(h.levels(), &["A", "B", "C"]);
        assert!(out.as_matrix().is_none());
        Ok(())
    }

    #[cfg(not(feature = "hypothesis"))]
    #[test]
    fn test_hypothesis_requires_feature() {
        let unavailable = Error::BackendUnavailable {
            output: "Hypothesis",
            feature: "hypothesis",
        };
        assert_eq!(
            OutputType::Hypothesis.ensure_available(),
            Err(unavailable.clone())
        );
        let err = ContrastOutput::assemble(&pairs_abc(), &["A", "B", "C"], OutputType::Hypothesis)
            .unwrap_err();
        assert_eq!(err, unavailable);
    }
}
