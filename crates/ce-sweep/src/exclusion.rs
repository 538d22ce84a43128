//! Boundary values known a priori to be unsolvable.

use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Why a boundary value was excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Listed explicitly as unsolvable.
    Listed,
    /// Below the lowest solvable value.
    BelowLimit(i32),
    /// Above the highest solvable value.
    AboveLimit(i32),
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listed => write!(f, "listed as unsolvable"),
            Self::BelowLimit(limit) => write!(f, "below solvable limit {limit}"),
            Self::AboveLimit(limit) => write!(f, "above solvable limit {limit}"),
        }
    }
}

/// A boundary value skipped before any simulation call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("boundary value {value} excluded: {reason}")]
pub struct ExcludedBoundaryCondition {
    pub value: i32,
    pub reason: ExclusionReason,
}

/// Predicate over boundary values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    values: BTreeSet<i32>,
    below: Option<i32>,
    above: Option<i32>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.values.extend(values);
        self
    }

    /// Exclude every value strictly below `limit`.
    pub fn with_lower_limit(mut self, limit: i32) -> Self {
        self.below = Some(limit);
        self
    }

    /// Exclude every value strictly above `limit`.
    pub fn with_upper_limit(mut self, limit: i32) -> Self {
        self.above = Some(limit);
        self
    }

    pub fn check(&self, value: i32) -> Result<(), ExcludedBoundaryCondition> {
        let reason = if self.values.contains(&value) {
            Some(ExclusionReason::Listed)
        } else if let Some(limit) = self.below.filter(|&l| value < l) {
            Some(ExclusionReason::BelowLimit(limit))
        } else {
            self.above
                .filter(|&l| value > l)
                .map(ExclusionReason::AboveLimit)
        };

        match reason {
            Some(reason) => Err(ExcludedBoundaryCondition { value, reason }),
            None => Ok(()),
        }
    }

    pub fn is_excluded(&self, value: i32) -> bool {
        self.check(value).is_err()
    }

    pub fn listed(&self) -> impl Iterator<Item = i32> + '_ {
        self.values.iter().copied()
    }

    /// Split `values` into admitted values and exclusions, keeping order.
    pub fn partition(
        &self,
        values: impl IntoIterator<Item = i32>,
    ) -> (Vec<i32>, Vec<ExcludedBoundaryCondition>) {
        let mut admitted = Vec::new();
        let mut excluded = Vec::new();
        for v in values {
            match self.check(v) {
                Ok(()) => admitted.push(v),
                Err(e) => excluded.push(e),
            }
        }
        (admitted, excluded)
    }
}
