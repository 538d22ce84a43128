//! ce-results: characterization run cache and tabular exports.

pub mod hash;
pub mod store;
pub mod tables;
pub mod types;

pub use hash::compute_run_id;
pub use store::ResultStore;
pub use tables::{read_envelopes_csv, read_series_column, write_envelopes_csv, write_timeseries_csv};
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Run not found: {run_id}")]
    RunNotFound { run_id: String },

    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    #[error("Malformed table: {message}")]
    Format { message: String },
}
