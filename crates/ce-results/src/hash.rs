//! Content-based hashing for run IDs.

use ce_project::schema::BoundaryDef;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Run id of one unit's characterization.
///
/// Covers everything that changes the sweeps: the unit definition (CHP unit
/// or heat pump), the boundary domain and the tool version.
pub fn compute_run_id<U: Serialize>(unit: &U, boundary: &BoundaryDef, tool_version: &str) -> String {
    let mut hasher = Sha256::new();

    let unit_json = serde_json::to_string(unit).unwrap_or_default();
    hasher.update(unit_json.as_bytes());

    let boundary_json = serde_json::to_string(boundary).unwrap_or_default();
    hasher.update(boundary_json.as_bytes());

    hasher.update(tool_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
