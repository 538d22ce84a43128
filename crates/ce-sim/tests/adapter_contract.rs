//! Adapter behaviour against scripted simulators.

use ce_sim::{
    ConvergenceFailure, OperatingPoint, RawSolution, Setpoint, SimulationAdapter, Simulator,
    SimulatorError,
};

/// Replays a fixed list of responses and remembers the warm starts it saw.
struct Scripted {
    responses: Vec<Result<RawSolution, SimulatorError>>,
    warm_starts: Vec<Option<OperatingPoint>>,
}

impl Simulator for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn solve(
        &mut self,
        _setpoint: &Setpoint,
        _boundary: f64,
        warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError> {
        self.warm_starts.push(warm_start.copied());
        self.responses.remove(0)
    }
}

fn good(p: f64) -> RawSolution {
    RawSolution {
        p_elec_w: p,
        q_heat_w: 20.0,
        q_fuel_in_w: 200.0,
        q_condenser_w: 30.0,
        converged: true,
        linear_dependent: false,
        iterations: 3,
    }
}

#[test]
fn adapter_counts_each_failure_kind() {
    let sim = Scripted {
        responses: vec![
            Ok(good(80.0)),
            Ok(RawSolution::diverged(50)),
            Ok(RawSolution::singular()),
            Ok(good(f64::NAN)),
            Err(SimulatorError::Backend {
                message: "license server unreachable".to_string(),
            }),
        ],
        warm_starts: Vec::new(),
    };
    let mut adapter = SimulationAdapter::new(sim);
    let sp = Setpoint::new(100.0, 20.0);

    assert!(adapter.simulate(&sp, 90.0, None).is_ok());
    assert!(matches!(
        adapter.simulate(&sp, 90.0, None),
        Err(ConvergenceFailure::NotConverged { .. })
    ));
    assert_eq!(
        adapter.simulate(&sp, 90.0, None),
        Err(ConvergenceFailure::LinearDependent)
    );
    assert!(matches!(
        adapter.simulate(&sp, 90.0, None),
        Err(ConvergenceFailure::NonFinite { .. })
    ));
    let backend = adapter.simulate(&sp, 90.0, None).unwrap_err();
    assert!(backend.to_string().contains("license server"));

    let stats = adapter.stats();
    assert_eq!(stats.calls, 5);
    assert_eq!(stats.converged, 1);
    assert_eq!(stats.not_converged, 2);
    assert_eq!(stats.linear_dependent, 1);
    assert_eq!(stats.non_finite, 1);
    assert_eq!(stats.failures(), 4);
}

#[test]
fn previous_point_is_forwarded_as_warm_start() {
    let sim = Scripted {
        responses: vec![Ok(good(80.0)), Ok(good(79.0))],
        warm_starts: Vec::new(),
    };
    let mut adapter = SimulationAdapter::new(sim);
    let sp = Setpoint::new(100.0, 20.0);

    let first = adapter.simulate(&sp, 90.0, None).unwrap();
    adapter.simulate(&sp, 90.0, Some(&first)).unwrap();

    let seen = &adapter.simulator().warm_starts;
    assert_eq!(seen[0], None);
    assert_eq!(seen[1], Some(first));
}
