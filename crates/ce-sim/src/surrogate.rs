//! Analytic extraction-CHP surrogate.
//!
//! Not a thermodynamic model: a handful of closed-form relations that give a
//! plant-like P-Q region with a part-load efficiency curve, a heat-extraction
//! capacity that shrinks with load, and a power-loss coefficient that follows
//! the Carnot factor of the district-heating feed temperature.

use crate::point::OperatingPoint;
use crate::setpoint::Setpoint;
use crate::simulator::{RawSolution, Simulator, SimulatorError};
use ce_core::{as_kelvin, degc};

const COLD_START_ITERATIONS: usize = 12;
const WARM_START_ITERATIONS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionChpSurrogate {
    /// Generator nameplate load (W).
    pub nameplate_load_w: f64,
    /// Electrical efficiency at nameplate load without heat extraction.
    pub eta_el_nominal: f64,
    /// Relative efficiency `c0 + c1 x + c2 x^2` over load fraction `x`.
    pub part_load_coeffs: [f64; 3],
    /// Power loss per unit of extracted heat at `reference_temp_c`.
    pub beta_ref: f64,
    pub reference_temp_c: f64,
    pub ambient_temp_c: f64,
    /// Extraction capacity at nameplate load (W).
    pub max_heat_duty_w: f64,
    /// Share of the extraction capacity still available at zero load.
    pub heat_capacity_floor: f64,
    /// Fraction of fuel input lost with the flue gas.
    pub flue_share: f64,
    /// Duties below this value do not converge.
    pub min_stable_duty_w: f64,
    /// Boundary values for which the network is reported linearly dependent.
    pub unsolvable: Vec<i32>,
}

impl Default for ExtractionChpSurrogate {
    fn default() -> Self {
        Self {
            nameplate_load_w: 100e6,
            eta_el_nominal: 0.45,
            part_load_coeffs: [0.7, 0.5, -0.2],
            beta_ref: 0.15,
            reference_temp_c: 90.0,
            ambient_temp_c: 15.0,
            max_heat_duty_w: 80e6,
            heat_capacity_floor: 0.3,
            flue_share: 0.08,
            min_stable_duty_w: 1e6,
            unsolvable: Vec::new(),
        }
    }
}

impl ExtractionChpSurrogate {
    fn carnot_factor(&self, feed_temp_c: f64) -> f64 {
        1.0 - as_kelvin(degc(self.ambient_temp_c)) / as_kelvin(degc(feed_temp_c))
    }

    /// Power loss per unit of extracted heat at the given feed temperature.
    pub fn beta(&self, feed_temp_c: f64) -> f64 {
        self.beta_ref * self.carnot_factor(feed_temp_c) / self.carnot_factor(self.reference_temp_c)
    }

    /// Electrical efficiency at the given load fraction.
    pub fn eta_el(&self, load_fraction: f64) -> f64 {
        let [c0, c1, c2] = self.part_load_coeffs;
        self.eta_el_nominal * (c0 + c1 * load_fraction + c2 * load_fraction * load_fraction)
    }

    /// Heat the extraction can deliver at the given load fraction (W).
    pub fn heat_capacity(&self, load_fraction: f64) -> f64 {
        let floor = self.heat_capacity_floor;
        self.max_heat_duty_w * (floor + (1.0 - floor) * load_fraction)
    }
}

impl Simulator for ExtractionChpSurrogate {
    fn name(&self) -> &str {
        "extraction-chp-surrogate"
    }

    fn solve(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError> {
        if self.nameplate_load_w <= 0.0 {
            return Err(SimulatorError::InvalidSetpoint {
                what: "nameplate load must be positive".to_string(),
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

        let x = setpoint.load_w / self.nameplate_load_w;
        let eta = self.eta_el(x);
        if !(x > 0.0 && x <= 1.0 + 1e-9) || eta <= 0.0 {
            return Ok(RawSolution::diverged(iterations));
        }
        if setpoint.heat_duty_w < self.min_stable_duty_w {
            return Ok(RawSolution::diverged(iterations));
        }

        let q_in = setpoint.load_w / eta;
        let q = setpoint.heat_duty_w.min(self.heat_capacity(x));
        let p = setpoint.load_w - self.beta(boundary) * q;
        let q_cond = q_in - p - q - self.flue_share * q_in;
        if q_cond < 0.0 {
            return Ok(RawSolution::diverged(iterations));
        }

        Ok(RawSolution {
            p_elec_w: p,
            q_heat_w: q,
            q_fuel_in_w: q_in,
            q_condenser_w: q_cond,
            converged: true,
            linear_dependent: false,
            iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beta_rises_with_feed_temperature() {
        let s = ExtractionChpSurrogate::default();
        assert!((s.beta(90.0) - 0.15).abs() < 1e-12);
        assert!(s.beta(120.0) > s.beta(90.0));
        assert!(s.beta(65.0) < s.beta(90.0));
    }

    #[test]
    fn heat_is_capped_by_capacity_at_part_load() {
        let mut s = ExtractionChpSurrogate::default();
        let raw = s
            .solve(&Setpoint::new(50e6, 80e6), 90.0, None)
            .unwrap();
        assert!(raw.converged);
        assert!((raw.q_heat_w - s.heat_capacity(0.5)).abs() < 1e-6);
        assert!(raw.q_condenser_w >= 0.0);
    }

    #[test]
    fn tiny_duty_does_not_converge() {
        let mut s = ExtractionChpSurrogate::default();
        let raw = s.solve(&Setpoint::new(100e6, 0.0), 90.0, None).unwrap();
        assert!(!raw.converged);
    }

    #[test]
    fn warm_start_needs_fewer_iterations() {
        let mut s = ExtractionChpSurrogate::default();
        let cold = s.solve(&Setpoint::new(100e6, 40e6), 90.0, None).unwrap();
        let prev = OperatingPoint::new(cold.p_elec_w, cold.q_heat_w, cold.q_fuel_in_w, cold.q_condenser_w).unwrap();
        let warm = s
            .solve(&Setpoint::new(100e6, 50e6), 90.0, Some(&prev))
            .unwrap();
        assert!(warm.iterations < cold.iterations);
    }
}
