//! Contract of the external plant simulator.

use crate::point::OperatingPoint;
use crate::setpoint::Setpoint;
use thiserror::Error;

/// Raw solver output, before classification.
///
/// Magnitudes are only meaningful when `converged` is set and
/// `linear_dependent` is not; they may be NaN otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSolution {
    pub p_elec_w: f64,
    pub q_heat_w: f64,
    pub q_fuel_in_w: f64,
    pub q_condenser_w: f64,
    pub converged: bool,
    pub linear_dependent: bool,
    pub iterations: usize,
}

impl RawSolution {
    /// A solution reporting non-convergence with no usable values.
    pub fn diverged(iterations: usize) -> Self {
        Self {
            p_elec_w: f64::NAN,
            q_heat_w: f64::NAN,
            q_fuel_in_w: f64::NAN,
            q_condenser_w: f64::NAN,
            converged: false,
            linear_dependent: false,
            iterations,
        }
    }

    /// A solution reporting a rank-deficient system.
    pub fn singular() -> Self {
        Self {
            linear_dependent: true,
            ..Self::diverged(0)
        }
    }
}

/// Backend fault raised by a simulator (as opposed to a reported non-convergence).
#[derive(Error, Debug, Clone)]
pub enum SimulatorError {
    #[error("Invalid setpoint: {what}")]
    InvalidSetpoint { what: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

/// A nonlinear plant simulator.
///
/// Implementations may keep internal state between calls; the sweep driver
/// owns one simulator per boundary-condition sweep and calls it sequentially.
pub trait Simulator {
    /// Human readable model name.
    fn name(&self) -> &str;

    /// Solve the plant at `setpoint` under the scalar `boundary` condition.
    ///
    /// `warm_start` is the previously converged point of the same sweep, if any.
    fn solve(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError>;
}

impl<S: Simulator + ?Sized> Simulator for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError> {
        (**self).solve(setpoint, boundary, warm_start)
    }
}
