use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResampleError {
    /// A timestep value has no row in the envelope table.
    #[error("timestep {index}: boundary value {value} is outside the envelope table")]
    TableDomain { index: usize, value: f64 },

    #[error("{parameter} has {got} values, horizon is {expected}")]
    HorizonMismatch {
        parameter: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("H_L_FG_share_min {0} for this unit kind")]
    ShareMin(&'static str),
}

pub type ResampleResult<T> = Result<T, ResampleError>;
