//! Classification of raw simulator output.

use crate::failure::ConvergenceFailure;
use crate::point::OperatingPoint;
use crate::setpoint::Setpoint;
use crate::simulator::{RawSolution, Simulator};
use ce_core::CoreError;
use tracing::{debug, warn};

/// Outcome of one adapted simulation call.
pub type SimOutcome = Result<OperatingPoint, ConvergenceFailure>;

/// Call counters kept by the adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterStats {
    pub calls: usize,
    pub converged: usize,
    pub not_converged: usize,
    pub linear_dependent: usize,
    pub non_finite: usize,
    pub iterations: usize,
}

impl AdapterStats {
    pub fn failures(&self) -> usize {
        self.not_converged + self.linear_dependent + self.non_finite
    }

    fn record(&mut self, outcome: &SimOutcome) {
        self.calls += 1;
        match outcome {
            Ok(_) => self.converged += 1,
            Err(ConvergenceFailure::NotConverged { .. }) => self.not_converged += 1,
            Err(ConvergenceFailure::LinearDependent) => self.linear_dependent += 1,
            Err(ConvergenceFailure::NonFinite { .. }) => self.non_finite += 1,
        }
    }
}

/// Turn a raw solution into an operating point or a failure.
///
/// The linear-dependency flag wins over the convergence flag; a solution that
/// claims convergence but carries non-finite values is still a failure.
pub fn classify(raw: &RawSolution) -> SimOutcome {
    if raw.linear_dependent {
        return Err(ConvergenceFailure::LinearDependent);
    }
    if !raw.converged {
        return Err(ConvergenceFailure::NotConverged {
            message: format!("no convergence after {} iterations", raw.iterations),
        });
    }
    OperatingPoint::new(raw.p_elec_w, raw.q_heat_w, raw.q_fuel_in_w, raw.q_condenser_w).map_err(
        |e| match e {
            CoreError::NonFinite { what, .. } => ConvergenceFailure::NonFinite { field: what },
            other => ConvergenceFailure::NotConverged {
                message: other.to_string(),
            },
        },
    )
}

/// Owns one simulator for the duration of a sweep.
pub struct SimulationAdapter<S> {
    simulator: S,
    stats: AdapterStats,
}

impl<S: Simulator> SimulationAdapter<S> {
    pub fn new(simulator: S) -> Self {
        Self {
            simulator,
            stats: AdapterStats::default(),
        }
    }

    /// Run one blocking simulation call.
    ///
    /// `previous` is forwarded to the simulator as its warm start.
    pub fn simulate(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        previous: Option<&OperatingPoint>,
    ) -> SimOutcome {
        let outcome = match self.simulator.solve(setpoint, boundary, previous) {
            Ok(raw) => {
                self.stats.iterations += raw.iterations;
                classify(&raw)
            }
            Err(e) => Err(ConvergenceFailure::NotConverged {
                message: e.to_string(),
            }),
        };
        self.stats.record(&outcome);

        match &outcome {
            Ok(op) => debug!(
                boundary,
                load_w = setpoint.load_w,
                duty_w = setpoint.heat_duty_w,
                p_w = op.p_elec(),
                q_w = op.q_heat(),
                "converged"
            ),
            Err(failure) => warn!(
                boundary,
                load_w = setpoint.load_w,
                duty_w = setpoint.heat_duty_w,
                model = self.simulator.name(),
                "simulation step failed: {failure}"
            ),
        }
        outcome
    }

    pub fn stats(&self) -> AdapterStats {
        self.stats
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    pub fn into_inner(self) -> S {
        self.simulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(p: f64) -> RawSolution {
        RawSolution {
            p_elec_w: p,
            q_heat_w: 10.0,
            q_fuel_in_w: 100.0,
            q_condenser_w: 5.0,
            converged: true,
            linear_dependent: false,
            iterations: 4,
        }
    }

    #[test]
    fn converged_solution_becomes_point() {
        let op = classify(&raw(40.0)).unwrap();
        assert_eq!(op.p_elec(), 40.0);
        assert_eq!(op.q_condenser_loss(), 5.0);
    }

    #[test]
    fn linear_dependency_wins_over_converged_flag() {
        let mut r = raw(40.0);
        r.linear_dependent = true;
        assert_eq!(classify(&r), Err(ConvergenceFailure::LinearDependent));
    }

    #[test]
    fn nan_in_converged_solution_is_failure() {
        let err = classify(&raw(f64::NAN)).unwrap_err();
        assert_eq!(err, ConvergenceFailure::NonFinite { field: "P_elec" });
    }

    #[test]
    fn unconverged_flag_is_failure() {
        let err = classify(&RawSolution::diverged(50)).unwrap_err();
        assert_eq!(err.kind(), "not_converged");
    }
}
