use core::fmt;

/// Result alias for `cluster_contrasts`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned while normalising levels, walking cluster trees and
/// building contrasts.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Dendrogram contrasts were requested but no cluster tree is available.
    MissingDendrogram,

    /// Tree tip labels do not match the cluster levels.
    TipMismatch {
        /// Levels with no corresponding tip.
        missing: Vec<String>,
        /// Tips with no corresponding level.
        unexpected: Vec<String>,
    },

    /// An internal node does not have exactly two children.
    NonBinaryNode {
        /// Node id in the tree arena.
        node: usize,
        /// Number of children found.
        children: usize,
    },

    /// A pair matrix row does not have exactly two columns.
    PairMatrixShape {
        /// Offending row.
        row: usize,
        /// Number of columns found in that row.
        found: usize,
    },

    /// A cluster id or level name is not part of the level set.
    UnknownLevel {
        /// The unmatched value, as written by the caller.
        value: String,
    },

    /// Not enough levels to contrast anything.
    TooFewLevels {
        /// Contrast strategy that was requested.
        contrast_type: &'static str,
        /// Number of usable levels.
        found: usize,
    },

    /// The requested output format was not compiled in.
    BackendUnavailable {
        /// Output format requested.
        output: &'static str,
        /// Cargo feature providing it.
        feature: &'static str,
    },

    /// Shape mismatch (string description).
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// Generic error with message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::MissingDendrogram => write!(
                f,
                "dendrogram contrasts requested but no cluster dendrogram was supplied"
            ),
            Error::TipMismatch {
                missing,
                unexpected,
            } => write!(
                f,
                "tip names don't match cluster vector values (levels without tip: {missing:?}, tips without level: {unexpected:?})"
            ),
            Error::NonBinaryNode { node, children } => write!(
                f,
                "internal node {node} has {children} children; exactly 2 are required"
            ),
            Error::PairMatrixShape { row, found } => {
                write!(f, "pair matrix row {row} has {found} columns; expected 2")
            }
            Error::UnknownLevel { value } => {
                write!(f, "'{value}' is not a level of the cluster vector")
            }
            Error::TooFewLevels {
                contrast_type,
                found,
            } => write!(
                f,
                "{contrast_type} contrasts need at least 2 cluster levels, found {found}"
            ),
            Error::BackendUnavailable { output, feature } => write!(
                f,
                "output type {output} requires the '{feature}' feature"
            ),
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}
