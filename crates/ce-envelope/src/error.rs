use crate::params::InvariantViolation;
use ce_core::CoreError;
use thiserror::Error;

/// Reasons an envelope cannot be extracted for a boundary condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("corner {corner} has no converged reference point")]
    MissingCorner { corner: &'static str },

    #[error("regression for corner {corner} failed: {source}")]
    Regression {
        corner: &'static str,
        source: CoreError,
    },

    #[error("{got} converged points, at least {needed} needed")]
    TooFewPoints { needed: usize, got: usize },

    #[error("degenerate {what}")]
    Degenerate { what: &'static str },

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;
