//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub unit_id: String,
    pub timestamp: String,
    pub tool_version: String,
    pub boundary_name: String,
    /// Boundary values with an extracted envelope.
    pub sampled: Vec<i32>,
    /// Boundary values skipped before simulation.
    #[serde(default)]
    pub excluded: Vec<BoundaryIssue>,
    /// Boundary values whose extraction failed.
    #[serde(default)]
    pub failed: Vec<BoundaryIssue>,
    #[serde(default)]
    pub simulation: SimulationSummary,
}

impl RunManifest {
    pub fn now_timestamp() -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryIssue {
    pub value: i32,
    pub reason: String,
}

/// Simulator call counts summed over all boundary values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub calls: usize,
    pub converged: usize,
    pub not_converged: usize,
    pub linear_dependent: usize,
    pub non_finite: usize,
}

/// Raw converged P-Q cloud of one boundary value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepTrace {
    pub boundary: i32,
    #[serde(rename = "Q")]
    pub q: Vec<f64>,
    #[serde(rename = "P")]
    pub p: Vec<f64>,
    /// Wall-clock time of the sweep.
    pub runtime_s: f64,
    pub failed_steps: usize,
}
