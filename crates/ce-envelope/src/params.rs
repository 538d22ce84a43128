//! Named parameter rows shared by every characterized unit type.

use std::fmt;
use thiserror::Error;

/// A fixed, ordered set of named values describing a unit at one boundary
/// value.
///
/// Tables interpolate each field on its own, so a row is nothing more than
/// its values in [`ParameterSet::FIELDS`] order plus the invariants a row
/// must satisfy.
pub trait ParameterSet: Copy + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Column names in persisted tables.
    const FIELDS: &'static [&'static str];

    /// Values ordered as [`ParameterSet::FIELDS`].
    fn to_row(&self) -> Vec<f64>;

    /// `None` unless `row` holds exactly one value per field.
    fn from_row(row: &[f64]) -> Option<Self>;

    fn check(&self) -> Result<(), InvariantViolation>;
}

/// A parameter value outside its admissible range.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("{field} = {value} violates {constraint}")]
pub struct InvariantViolation {
    pub field: &'static str,
    pub value: f64,
    pub constraint: &'static str,
}

/// First field holding a NaN or infinity.
pub(crate) fn first_non_finite<P: ParameterSet>(params: &P) -> Option<InvariantViolation> {
    P::FIELDS
        .iter()
        .zip(params.to_row())
        .find(|(_, v)| !v.is_finite())
        .map(|(&field, value)| InvariantViolation {
            field,
            value,
            constraint: "finite",
        })
}
