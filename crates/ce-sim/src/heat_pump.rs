//! Analytic heat pump surrogate.
//!
//! The coefficient of performance is a fixed share of the Carnot COP between
//! the heat source and the condensing temperature, which sits a fixed
//! approach above the sink supply temperature. Part-load operation lowers
//! that share quadratically.

use crate::point::OperatingPoint;
use crate::setpoint::Setpoint;
use crate::simulator::{RawSolution, Simulator, SimulatorError};
use ce_core::{as_kelvin, degc};

const COLD_START_ITERATIONS: usize = 8;
const WARM_START_ITERATIONS: usize = 2;

/// Heat pump driven by its heat output target alone.
///
/// Electrical input is reported as negative `p_elec_w` and as `q_fuel_in_w`.
/// Heat drawn from the source takes the `q_condenser_w` slot.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPumpSurrogate {
    /// Heat output at design sink flow (W).
    pub nameplate_heat_w: f64,
    pub source_temp_c: f64,
    /// Condensing temperature above the sink supply temperature (K).
    pub sink_approach_k: f64,
    /// Share of the Carnot COP reached at nameplate output.
    pub carnot_quality: f64,
    /// Relative loss of that share at zero output.
    pub part_load_penalty: f64,
    /// Boundary values for which the network is reported linearly dependent.
    pub unsolvable: Vec<i32>,
}

impl Default for HeatPumpSurrogate {
    fn default() -> Self {
        Self {
            nameplate_heat_w: 10e6,
            source_temp_c: 40.0,
            sink_approach_k: 5.0,
            carnot_quality: 0.5,
            part_load_penalty: 0.2,
            unsolvable: Vec::new(),
        }
    }
}

impl HeatPumpSurrogate {
    /// COP at a sink supply temperature and output fraction.
    ///
    /// `None` when the condensing temperature does not lie above the source.
    pub fn cop(&self, sink_temp_c: f64, load_fraction: f64) -> Option<f64> {
        let t_cond = as_kelvin(degc(sink_temp_c + self.sink_approach_k));
        let lift = t_cond - as_kelvin(degc(self.source_temp_c));
        if lift <= 0.0 {
            return None;
        }
        let quality = self.carnot_quality * (1.0 - self.part_load_penalty * (1.0 - load_fraction).powi(2));
        Some(quality * t_cond / lift)
    }
}

impl Simulator for HeatPumpSurrogate {
    fn name(&self) -> &str {
        "heat-pump-surrogate"
    }

    fn solve(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError> {
        if self.nameplate_heat_w <= 0.0 {
            return Err(SimulatorError::InvalidSetpoint {
                what: "nameplate heat output must be positive".to_string(),
            });
        }
        if self.unsolvable.iter().any(|&v| v as f64 == boundary) {
            return Ok(RawSolution::singular());
        }

        let iterations = if warm_start.is_some() {
            WARM_START_ITERATIONS
        } else {
            COLD_START_ITERATIONS
        };

        let x = setpoint.heat_duty_w / self.nameplate_heat_w;
        if !(x > 0.0 && x <= 1.0 + 1e-9) {
            return Ok(RawSolution::diverged(iterations));
        }
        let Some(cop) = self.cop(boundary, x).filter(|&c| c > 0.0) else {
            return Ok(RawSolution::diverged(iterations));
        };

        let q = setpoint.heat_duty_w;
        let p_in = q / cop;
        Ok(RawSolution {
            p_elec_w: -p_in,
            q_heat_w: q,
            q_fuel_in_w: p_in,
            q_condenser_w: q - p_in,
            converged: true,
            linear_dependent: false,
            iterations,
        })
    }
}
