//! Synthetic linear plant.
//!
//! `P = load - beta * duty`, `Q = duty`, valid for `0 <= duty <= max_duty`.
//! Fuel input depends on load only: `Q_in = load / eta_el`. A fixed share of
//! the fuel input leaves as flue gas and the rest of the balance is rejected
//! in the condenser.

use crate::point::OperatingPoint;
use crate::setpoint::Setpoint;
use crate::simulator::{RawSolution, Simulator, SimulatorError};

#[derive(Debug, Clone, PartialEq)]
pub struct LinearPlant {
    /// Power lost per unit of extracted heat.
    pub beta: f64,
    /// Electrical efficiency at zero heat extraction.
    pub eta_el: f64,
    /// Fraction of fuel input lost with the flue gas.
    pub flue_share: f64,
    /// Largest heat duty the plant accepts (W).
    pub max_duty_w: f64,
    /// Boundary values for which the network is reported linearly dependent.
    pub unsolvable: Vec<i32>,
}

impl Default for LinearPlant {
    fn default() -> Self {
        Self {
            beta: 0.5,
            eta_el: 0.4,
            flue_share: 0.1,
            max_duty_w: 100.0,
            unsolvable: Vec::new(),
        }
    }
}

impl Simulator for LinearPlant {
    fn name(&self) -> &str {
        "linear"
    }

    fn solve(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        _warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError> {
        if self.unsolvable.iter().any(|&v| v as f64 == boundary) {
            return Ok(RawSolution::singular());
        }
        let duty = setpoint.heat_duty_w;
        if !(0.0..=self.max_duty_w).contains(&duty) || setpoint.load_w <= 0.0 {
            return Ok(RawSolution::diverged(1));
        }
        if self.eta_el <= 0.0 {
            return Err(SimulatorError::Backend {
                message: "electrical efficiency must be positive".to_string(),
            });
        }

        let q_in = setpoint.load_w / self.eta_el;
        let p = setpoint.load_w - self.beta * duty;
        let q_flue = self.flue_share * q_in;
        Ok(RawSolution {
            p_elec_w: p,
            q_heat_w: duty,
            q_fuel_in_w: q_in,
            q_condenser_w: q_in - p - duty - q_flue,
            converged: true,
            linear_dependent: false,
            iterations: 1,
        })
    }
}
