use thiserror::Error;

/// A simulation call that produced no usable operating point.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvergenceFailure {
    #[error("solver did not converge: {message}")]
    NotConverged { message: String },

    #[error("network is linearly dependent")]
    LinearDependent,

    #[error("solver returned non-finite {field}")]
    NonFinite { field: &'static str },
}

impl ConvergenceFailure {
    /// Short tag used in traces and manifests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConverged { .. } => "not_converged",
            Self::LinearDependent => "linear_dependent",
            Self::NonFinite { .. } => "non_finite",
        }
    }
}
