use crate::exclusion::ExcludedBoundaryCondition;
use thiserror::Error;

/// Errors raised before or while sweeping one boundary condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepError {
    #[error("Invalid sweep plan: {what}")]
    InvalidPlan { what: String },

    #[error(transparent)]
    Excluded(#[from] ExcludedBoundaryCondition),
}

pub type SweepResult<T> = Result<T, SweepError>;
