//! Corner sweep protocol against the synthetic linear plant.

use ce_sim::{LinearPlant, OperatingPoint, RawSolution, Setpoint, SimulationAdapter, Simulator, SimulatorError};
use ce_sweep::{ExclusionSet, SweepError, SweepPhase, SweepPlan, sweep_corners};

fn plan() -> SweepPlan {
    SweepPlan {
        min_heat_duty_w: 10.0,
        ..SweepPlan::new(100.0, 0.5, 100.0)
    }
}

/// Linear plant that refuses a fixed set of call indices and logs warm starts.
struct Flaky {
    inner: LinearPlant,
    fail_calls: Vec<usize>,
    calls: usize,
    warm_starts: Vec<bool>,
}

impl Simulator for Flaky {
    fn name(&self) -> &str {
        "flaky-linear"
    }

    fn solve(
        &mut self,
        setpoint: &Setpoint,
        boundary: f64,
        warm_start: Option<&OperatingPoint>,
    ) -> Result<RawSolution, SimulatorError> {
        let call = self.calls;
        self.calls += 1;
        self.warm_starts.push(warm_start.is_some());
        if self.fail_calls.contains(&call) {
            return Ok(RawSolution::diverged(99));
        }
        self.inner.solve(setpoint, boundary, warm_start)
    }
}

#[test]
fn protocol_visits_all_four_phases_in_order() {
    let plan = plan();
    let mut adapter = SimulationAdapter::new(LinearPlant::default());
    let corners = sweep_corners(&mut adapter, &plan, 90, &ExclusionSet::new()).unwrap();

    let expected = 2 * plan.heat_steps + 2 * (plan.load_levels - 1);
    assert_eq!(corners.trace.len(), expected);
    assert_eq!(corners.failed_steps(), 0);

    let phases: Vec<SweepPhase> = corners.trace.iter().map(|s| s.phase).collect();
    assert_eq!(phases[0], SweepPhase::TopHeat);
    assert_eq!(phases[plan.heat_steps], SweepPhase::FullHeatLoad);
    assert_eq!(phases[expected - 1], SweepPhase::MinHeatLoad);

    let tr = corners.top_right.reference().unwrap();
    assert_eq!(tr.q_heat(), 100.0);
    assert_eq!(tr.p_elec(), 50.0);

    let br = corners.bottom_right.reference().unwrap();
    assert!((br.q_fuel_in() - 125.0).abs() < 1e-9);

    assert_eq!(corners.top_left.len(), 3);
    assert_eq!(corners.bottom_left.len(), 3);
    assert_eq!(corners.top_min_heat().unwrap().q_heat(), 10.0);
    assert_eq!(corners.bottom_min_heat().unwrap().q_heat(), 10.0);
    assert_eq!(corners.full_heat_load_sweep.len(), plan.load_levels - 1);
    assert_eq!(corners.min_heat_load_sweep.len(), plan.load_levels - 1);
}

#[test]
fn no_zero_heat_setpoint_is_ever_issued() {
    let mut adapter = SimulationAdapter::new(LinearPlant::default());
    let corners = sweep_corners(&mut adapter, &plan(), 90, &ExclusionSet::new()).unwrap();
    assert!(corners.trace.iter().all(|s| s.setpoint.heat_duty_w >= 10.0));
}

#[test]
fn failed_steps_are_skipped_and_sweep_continues() {
    // Call 6 is the full-duty step of the top sweep, call 2 an intermediate one.
    let flaky = Flaky {
        inner: LinearPlant::default(),
        fail_calls: vec![2, 6],
        calls: 0,
        warm_starts: Vec::new(),
    };
    let mut adapter = SimulationAdapter::new(flaky);
    let corners = sweep_corners(&mut adapter, &plan(), 90, &ExclusionSet::new()).unwrap();

    assert_eq!(corners.failed_steps(), 2);
    assert_eq!(corners.top_heat_sweep.len(), 5);
    assert!(corners.top_right.is_empty(), "full-duty step failed");
    assert!(corners.top_left.points().iter().all(|p| p.q_heat() < 100.0));
    assert_eq!(adapter.stats().not_converged, 2);

    // Later phases still ran.
    assert!(corners.bottom_right.reference().is_some());
}

#[test]
fn every_step_after_the_first_success_is_warm_started() {
    let flaky = Flaky {
        inner: LinearPlant::default(),
        fail_calls: vec![0],
        calls: 0,
        warm_starts: Vec::new(),
    };
    let mut adapter = SimulationAdapter::new(flaky);
    sweep_corners(&mut adapter, &plan(), 90, &ExclusionSet::new()).unwrap();

    let warm = &adapter.simulator().warm_starts;
    assert!(!warm[0]);
    assert!(!warm[1], "first call failed, nothing to warm start from");
    assert!(warm[2..].iter().all(|&w| w));
}

#[test]
fn excluded_boundary_never_reaches_the_simulator() {
    let mut adapter = SimulationAdapter::new(LinearPlant::default());
    let exclusions = ExclusionSet::new().with_values([74, 75, 76, 79]);
    let err = sweep_corners(&mut adapter, &plan(), 75, &exclusions).unwrap_err();
    assert!(matches!(err, SweepError::Excluded(e) if e.value == 75));
    assert_eq!(adapter.stats().calls, 0);
}

#[test]
fn singular_boundary_yields_empty_regimes() {
    let plant = LinearPlant {
        unsolvable: vec![80],
        ..LinearPlant::default()
    };
    let mut adapter = SimulationAdapter::new(plant);
    let corners = sweep_corners(&mut adapter, &plan(), 80, &ExclusionSet::new()).unwrap();
    assert_eq!(corners.converged_steps(), 0);
    assert!(corners.top_left.is_empty());
    assert!(corners.bottom_right.is_empty());
    assert_eq!(adapter.stats().linear_dependent, corners.trace.len());
}

#[test]
fn load_level_sweeps_only_feed_the_point_cloud() {
    let mut adapter = SimulationAdapter::new(LinearPlant::default());
    let corners = sweep_corners(&mut adapter, &plan(), 90, &ExclusionSet::new()).unwrap();

    let (q, p) = corners.pq_cloud();
    assert_eq!(q.len(), corners.converged_steps());
    assert_eq!(p.len(), q.len());

    let in_cloud = |op: &OperatingPoint| q.iter().zip(&p).any(|(&cq, &cp)| cq == op.q_heat() && cp == op.p_elec());
    assert!(!corners.full_heat_load_sweep.is_empty());
    assert!(corners.full_heat_load_sweep.iter().all(in_cloud));
    assert!(corners.min_heat_load_sweep.iter().all(in_cloud));

    // Intermediate load levels sit strictly between the two corner loads.
    let nameplate = corners.top_right.reference().unwrap().p_elec();
    let minimum = corners.bottom_right.reference().unwrap().p_elec();
    assert!(
        corners
            .full_heat_load_sweep
            .iter()
            .all(|op| op.p_elec() < nameplate && op.p_elec() >= minimum)
    );
}
