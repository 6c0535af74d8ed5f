//! Exact contrast weights and weighted contrasts.

use core::fmt;
use core::ops::{Add, Neg};

use crate::error::{Error, Result};

/// Exact rational coefficient of one level in a contrast.
///
/// Always stored reduced, with a positive denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weight {
    num: i64,
    den: i64,
}

impl Weight {
    /// Zero weight.
    pub const ZERO: Weight = Weight { num: 0, den: 1 };

    /// `num / den`, or `None` when `den` is zero.
    pub fn new(num: i64, den: i64) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let sign = if den < 0 { -1 } else { 1 };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()).max(1) as i64;
        Some(Self {
            num: sign * num / g,
            den: sign * den / g,
        })
    }

    /// `1 / group_size` (positive side of an averaged group).
    pub(crate) fn share(group_size: usize) -> Self {
        Self::new(1, group_size.max(1) as i64).unwrap_or(Self::ZERO)
    }

    /// Numerator.
    pub fn numer(&self) -> i64 {
        self.num
    }

    /// Denominator (always positive).
    pub fn denom(&self) -> i64 {
        self.den
    }

    /// True for the zero weight.
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    /// Floating point value.
    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Weight) -> Weight {
        let den = self.den * rhs.den;
        let num = self.num * rhs.den + rhs.num * self.den;
        Weight::new(num, den).unwrap_or(Weight::ZERO)
    }
}

impl Neg for Weight {
    type Output = Weight;

    fn neg(self) -> Weight {
        Weight {
            num: -self.num,
            den: self.den,
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}

/// One hypothesis: the (averaged) first group minus the (averaged) second.
///
/// The symbolic formula is kept for display and for consumers that parse
/// it themselves; the weights are what the matrix assembler uses.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contrast {
    name: Option<String>,
    formula: String,
    weights: Vec<(String, Weight)>,
}

impl Contrast {
    /// Contrast of group `left` against group `right`.
    ///
    /// Each group contributes `+1/|left|` or `-1/|right|` per level. A level
    /// listed on both sides gets the sum of its weights; zero weights are
    /// dropped.
    pub fn between(left: &[&str], right: &[&str], name: Option<String>) -> Result<Self> {
        if left.is_empty() || right.is_empty() {
            return Err(Error::InvalidParameter {
                name: "group",
                message: "both sides of a contrast need at least one level",
            });
        }

        let mut weights: Vec<(String, Weight)> = Vec::with_capacity(left.len() + right.len());
        let sides = [
            (left, Weight::share(left.len())),
            (right, -Weight::share(right.len())),
        ];
        for (group, w) in sides {
            for &level in group {
                match weights.iter_mut().find(|(l, _)| l.as_str() == level) {
                    Some((_, existing)) => *existing = *existing + w,
                    None => weights.push((level.to_string(), w)),
                }
            }
        }
        weights.retain(|(_, w)| !w.is_zero());

        Ok(Self {
            name,
            formula: format!("{}-{}", group_expr(left), group_expr(right)),
            weights,
        })
    }

    /// Contrast name (`None` for dendrogram contrasts).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Symbolic form, e.g. `Cl01-(Cl02+Cl03)/2`.
    pub fn formula(&self) -> &str {
        &self.formula
    }

    /// Non-zero weights, in the order levels appear in the formula.
    pub fn weights(&self) -> &[(String, Weight)] {
        &self.weights
    }

    /// Weight of `level` (zero when not referenced).
    pub fn weight_of(&self, level: &str) -> Weight {
        self.weights
            .iter()
            .find(|(l, _)| l == level)
            .map(|(_, w)| *w)
            .unwrap_or(Weight::ZERO)
    }

    /// Sum of all weights; zero for every well-formed contrast.
    pub fn weight_sum(&self) -> Weight {
        self.weights.iter().fold(Weight::ZERO, |acc, (_, w)| acc + *w)
    }
}

impl fmt::Display for Contrast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name}: {}", self.formula),
            None => write!(f, "{}", self.formula),
        }
    }
}

/// `A` for a single level, `(A+B+C)/3` for a group.
fn group_expr(levels: &[&str]) -> String {
    match levels {
        [single] => (*single).to_string(),
        _ => format!("({})/{}", levels.join("+"), levels.len()),
    }
}
