//! Error types for the ce-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for frontends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read project file: {path}")]
    ProjectFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error("Sweep error: {0}")]
    Sweep(String),

    #[error("Interpolation error: {0}")]
    Table(String),

    #[error("Resampling error: {0}")]
    Resample(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for ce-app operations.
pub type AppResult<T> = Result<T, AppError>;

impl From<ce_project::ProjectError> for AppError {
    fn from(err: ce_project::ProjectError) -> Self {
        match err {
            ce_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<ce_project::ValidationError> for AppError {
    fn from(err: ce_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<ce_sweep::SweepError> for AppError {
    fn from(err: ce_sweep::SweepError) -> Self {
        AppError::Sweep(err.to_string())
    }
}

impl From<ce_table::TableError> for AppError {
    fn from(err: ce_table::TableError) -> Self {
        AppError::Table(err.to_string())
    }
}

impl From<ce_resample::ResampleError> for AppError {
    fn from(err: ce_resample::ResampleError) -> Self {
        AppError::Resample(err.to_string())
    }
}

impl From<ce_results::ResultsError> for AppError {
    fn from(err: ce_results::ResultsError) -> Self {
        match err {
            ce_results::ResultsError::RunNotFound { run_id } => AppError::RunNotFound(run_id),
            other => AppError::Results(other.to_string()),
        }
    }
}
