use ce_envelope::InvariantViolation;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("duplicate boundary key {key}")]
    DuplicateBoundaryKey { key: i32 },

    #[error("interpolation needs at least {needed} samples, got {got}")]
    TooFewSamples { needed: usize, got: usize },

    #[error("invalid boundary domain [{lo}, {hi}]")]
    InvalidDomain { lo: i32, hi: i32 },

    #[error("non-finite sample: {what}")]
    NonFinite { what: String },

    #[error("knots are not strictly increasing")]
    UnsortedKnots,

    #[error("spline system is singular")]
    Singular,

    #[error("row has {got} values, expected {expected}")]
    RowWidth { expected: usize, got: usize },

    #[error("row {key} is not a valid envelope: {source}")]
    InvalidRow {
        key: i32,
        #[source]
        source: InvariantViolation,
    },
}

pub type TableResult<T> = Result<T, TableError>;
