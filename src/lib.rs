//! # cluster-contrasts
//!
//! Turn cluster assignments into contrast specifications for differential
//! expression testing.
//!
//! The pipeline has four steps:
//!
//! 1. [`labels`]: cluster ids become canonical, zero-padded levels (`Cl01`, `Cl02`, ...)
//! 2. [`hierarchy`]: an optional dendrogram over those levels, as a navigable tree
//! 3. [`contrast`]: pairwise, one-against-all, or per-node contrasts as exact weights
//! 4. [`matrix`]: a level-by-contrast matrix, or formulas for hypothesis-based engines
//!
//! [`cluster_contrasts`] runs all four for a raw assignment vector;
//! [`ClusterExperiment`] does the same for a container of clusterings.
//!
//! ```rust
//! use cluster_contrasts::{cluster_contrasts, ContrastConfig, ContrastType};
//!
//! let cfg = ContrastConfig::new().with_contrast_type(ContrastType::Pairs);
//! let out = cluster_contrasts(&[1, 1, 2, 3, -1], None, &cfg).unwrap();
//! let m = out.as_matrix().unwrap();
//! assert_eq!(m.names().unwrap(), &["Cl01-Cl02", "Cl01-Cl03", "Cl02-Cl03"]);
//! assert_eq!(m.column(0).unwrap(), vec![1.0, -1.0, 0.0]);
//! ```

pub mod config;
pub mod contrast;
/// Error types used across `cluster_contrasts`.
pub mod error;
pub mod experiment;
pub mod hierarchy;
pub mod labels;
pub mod matrix;

pub use config::ContrastConfig;
pub use contrast::{build_contrasts, Contrast, ContrastType, PairMatrix, Weight};
pub use error::{Error, Result};
pub use experiment::{cluster_contrasts, ClusterExperiment, Clustering};
pub use hierarchy::{ClusterTree, Dendrogram, HealthCheck, TreeBuilder};
pub use labels::{ClusterLevels, Level};
#[cfg(feature = "hypothesis")]
pub use matrix::Hypothesis;
pub use matrix::{ContrastMatrix, ContrastOutput, OutputType};
