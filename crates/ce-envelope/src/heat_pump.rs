//! Heat pump parameters: a linear heat output over electrical input line.
//!
//! Dispatch models represent a heat pump as `Q = c_1 * P + c_0` between
//! `P_min` and `P_max`, plus its COP at nameplate output.

use crate::error::{ExtractionError, ExtractionResult};
use crate::params::{InvariantViolation, ParameterSet, first_non_finite};
use ce_core::{Tolerances, nearly_equal};
use ce_sweep::HeatPumpSweep;
use serde::{Deserialize, Serialize};
use tracing::debug;

const FIELD_NAMES: [&str; 5] = ["P_max", "P_min", "c_1", "c_0", "COP"];

/// Heat pump operating range at one boundary condition.
///
/// Electrical inputs and `c_0` in W, `c_1` and COP dimensionless.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatPumpParameters {
    /// Electrical input at nameplate heat output.
    #[serde(rename = "P_max")]
    pub p_max: f64,
    /// Electrical input at minimum heat output.
    #[serde(rename = "P_min")]
    pub p_min: f64,
    /// Heat output per unit of electrical input along the line.
    #[serde(rename = "c_1")]
    pub c_1: f64,
    #[serde(rename = "c_0")]
    pub c_0: f64,
    /// Coefficient of performance at nameplate heat output.
    #[serde(rename = "COP")]
    pub cop: f64,
}

impl HeatPumpParameters {
    /// Heat output at a given electrical input on the linear model.
    pub fn heat_at(&self, p_in: f64) -> f64 {
        self.c_1 * p_in + self.c_0
    }
}

impl ParameterSet for HeatPumpParameters {
    const FIELDS: &'static [&'static str] = &FIELD_NAMES;

    fn to_row(&self) -> Vec<f64> {
        vec![self.p_max, self.p_min, self.c_1, self.c_0, self.cop]
    }

    fn from_row(row: &[f64]) -> Option<Self> {
        let [p_max, p_min, c_1, c_0, cop]: [f64; 5] = row.try_into().ok()?;
        Some(Self {
            p_max,
            p_min,
            c_1,
            c_0,
            cop,
        })
    }

    /// Finite fields, `P_max >= P_min > 0`, and positive `c_1` and COP.
    fn check(&self) -> Result<(), InvariantViolation> {
        if let Some(non_finite) = first_non_finite(self) {
            return Err(non_finite);
        }
        let violation = |field, value, constraint| {
            Err(InvariantViolation {
                field,
                value,
                constraint,
            })
        };
        if self.p_min <= 0.0 {
            return violation("P_min", self.p_min, "P_min > 0");
        }
        if self.p_max < self.p_min {
            return violation("P_max", self.p_max, "P_max >= P_min");
        }
        if self.c_1 <= 0.0 {
            return violation("c_1", self.c_1, "c_1 > 0");
        }
        if self.cop <= 0.0 {
            return violation("COP", self.cop, "COP > 0");
        }
        Ok(())
    }
}

/// Reduce a heat pump load sweep to its linear model.
///
/// `P_max` and `P_min` are the largest and smallest electrical inputs seen.
/// The slope joins the first and last converged heat outputs over that
/// input range, and the line passes through the nameplate end.
pub fn extract_heat_pump(sweep: &HeatPumpSweep) -> ExtractionResult<HeatPumpParameters> {
    let [first, .., last] = sweep.points.as_slice() else {
        return Err(ExtractionError::TooFewPoints {
            needed: 2,
            got: sweep.points.len(),
        });
    };

    let inputs = sweep.points.iter().map(|op| op.p_elec().abs());
    let p_max = inputs.clone().fold(f64::NEG_INFINITY, f64::max);
    let p_min = inputs.fold(f64::INFINITY, f64::min);
    if nearly_equal(p_max, p_min, Tolerances::default()) {
        return Err(ExtractionError::Degenerate {
            what: "electrical input range",
        });
    }

    let q_first = first.q_heat().abs();
    let c_1 = (q_first - last.q_heat().abs()).abs() / (p_max - p_min);
    let c_0 = q_first - c_1 * p_max;

    let p_nameplate = first.p_elec().abs();
    if p_nameplate <= 0.0 {
        return Err(ExtractionError::Degenerate {
            what: "electrical input",
        });
    }

    let params = HeatPumpParameters {
        p_max,
        p_min,
        c_1,
        c_0,
        cop: q_first / p_nameplate,
    };
    params.check()?;

    debug!(
        boundary = sweep.boundary,
        p_max = params.p_max,
        p_min = params.p_min,
        cop = params.cop,
        "heat pump parameters extracted"
    );
    Ok(params)
}
