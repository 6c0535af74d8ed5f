//! Cluster label normalisation.
//!
//! Clusterings hand us one integer per sample. Positive values are cluster
//! ids; `-1` marks an unassigned sample and `-2` a sample that was never
//! clustered. Before contrasts can be written down, the ids have to become
//! levels with names that are valid symbolic identifiers:
//!
//! ```text
//! assignment:  [ 3, 1, -1, 12, 3, -2, 1 ]
//!                    │ drop non-positive
//! unique ids:  { 1, 3, 12 }         width = 2 (fewer than 100 levels)
//!                    │ prefix + zero-pad
//! levels:      [ Cl01, Cl03, Cl12 ]  (sorted by display name)
//! ```
//!
//! Level order is the lexicographic order of the display names, not the
//! numeric order of the ids. Zero-padding makes the two agree whenever the
//! ids fit in the pad width.

use std::collections::HashMap;

use tracing::debug;

/// Prefix used for display names unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "Cl";

/// Id given to samples left unassigned by a clustering.
pub const UNASSIGNED: i64 = -1;

/// Id given to samples excluded from clustering altogether.
pub const NOT_CLUSTERED: i64 = -2;

/// A distinct cluster id kept after filtering, with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Level {
    /// Original cluster id.
    pub id: i64,
    /// Zero-padded, prefixed identifier (e.g. `Cl07`).
    pub name: String,
}

/// Zero-pad width for `n_levels` distinct levels.
///
/// Two digits below 100 levels, three otherwise.
pub fn pad_width(n_levels: usize) -> usize {
    if n_levels < 100 {
        2
    } else {
        3
    }
}

/// Display name of cluster `id`: `prefix` followed by the id padded to `width`.
pub fn display_name(prefix: &str, id: i64, width: usize) -> String {
    sanitize_identifier(&format!("{prefix}{id:0width$}"))
}

/// Turn an arbitrary label into a syntactically valid identifier.
///
/// Characters outside `[A-Za-z0-9._]` become `.`; a leading digit,
/// underscore, or `.` followed by a digit gets an `X` prefix. Names that
/// are already valid pass through untouched.
pub fn sanitize_identifier(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
                c
            } else {
                '.'
            }
        })
        .collect();

    let bytes = out.as_bytes();
    let needs_prefix = match bytes.first() {
        None => true,
        Some(b) if b.is_ascii_digit() || *b == b'_' => true,
        Some(b'.') => bytes.get(1).is_some_and(|b| b.is_ascii_digit()),
        _ => false,
    };
    if needs_prefix {
        out.insert(0, 'X');
    }
    out
}

/// Canonical level set derived from one cluster assignment.
#[derive(Debug, Clone)]
pub struct ClusterLevels {
    levels: Vec<Level>,
    /// Per-sample index into `levels`; `None` for removed samples.
    codes: Vec<Option<usize>>,
    width: usize,
    by_id: HashMap<i64, usize>,
    by_name: HashMap<String, usize>,
}

impl ClusterLevels {
    /// Normalise `assignment` with the default `Cl` prefix.
    ///
    /// With `remove_negative`, every id `<= 0` is dropped; otherwise such
    /// ids become levels like any other.
    pub fn new(assignment: &[i64], remove_negative: bool) -> Self {
        Self::with_prefix(assignment, remove_negative, DEFAULT_PREFIX)
    }

    /// Normalise `assignment`, naming levels `prefix` + padded id.
    pub fn with_prefix(assignment: &[i64], remove_negative: bool, prefix: &str) -> Self {
        let keep = |id: i64| !remove_negative || id > 0;

        let mut ids: Vec<i64> = assignment.iter().copied().filter(|&id| keep(id)).collect();
        ids.sort_unstable();
        ids.dedup();

        let width = pad_width(ids.len());
        let mut levels: Vec<Level> = ids
            .into_iter()
            .map(|id| Level {
                id,
                name: display_name(prefix, id, width),
            })
            .collect();
        levels.sort_by(|a, b| a.name.cmp(&b.name));

        let by_id: HashMap<i64, usize> =
            levels.iter().enumerate().map(|(i, l)| (l.id, i)).collect();
        let by_name: HashMap<String, usize> = levels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect();

        let codes = assignment
            .iter()
            .map(|id| if keep(*id) { by_id.get(id).copied() } else { None })
            .collect();

        debug!(
            n_samples = assignment.len(),
            n_levels = levels.len(),
            width,
            "normalised cluster labels"
        );

        Self {
            levels,
            codes,
            width,
            by_id,
            by_name,
        }
    }

    /// Levels in canonical (display-name) order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// True when no level survived filtering.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Pad width used for the display names.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Display names in canonical order.
    pub fn names(&self) -> Vec<&str> {
        self.levels.iter().map(|l| l.name.as_str()).collect()
    }

    /// Original ids in canonical order.
    pub fn ids(&self) -> Vec<i64> {
        self.levels.iter().map(|l| l.id).collect()
    }

    /// Per-sample level index (`None` where the sample was removed).
    pub fn codes(&self) -> &[Option<usize>] {
        &self.codes
    }

    /// Per-sample display name (`None` where the sample was removed).
    pub fn sample_names(&self) -> Vec<Option<&str>> {
        self.codes
            .iter()
            .map(|c| c.map(|i| self.levels[i].name.as_str()))
            .collect()
    }

    /// Level at canonical position `index`.
    pub fn level(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Canonical position of cluster id `id`.
    pub fn index_of_id(&self, id: i64) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Canonical position of the level displayed as `name`.
    pub fn index_of_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Resolve a label that is either a display name or a raw cluster id.
    pub fn resolve(&self, label: &str) -> Option<usize> {
        self.index_of_name(label).or_else(|| {
            label
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(|id| self.index_of_id(id))
        })
    }
}
