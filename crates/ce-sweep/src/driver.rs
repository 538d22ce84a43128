use crate::corners::{CornerSet, Regime, SweepPhase, SweepStep};
use crate::error::SweepResult;
use crate::exclusion::ExclusionSet;
use crate::plan::SweepPlan;
use ce_sim::{OperatingPoint, Setpoint, SimulationAdapter, Simulator};
use tracing::{debug, info};

/// Sequential step runner carrying the warm-start chain.
pub(crate) struct Sweeper<'a, S> {
    adapter: &'a mut SimulationAdapter<S>,
    boundary: i32,
    previous: Option<OperatingPoint>,
    pub(crate) trace: Vec<SweepStep>,
}

impl<'a, S: Simulator> Sweeper<'a, S> {
    pub(crate) fn new(adapter: &'a mut SimulationAdapter<S>, boundary: i32) -> Self {
        Self {
            adapter,
            boundary,
            previous: None,
            trace: Vec::new(),
        }
    }

    fn step(&mut self, phase: SweepPhase, setpoint: Setpoint) -> Option<OperatingPoint> {
        let outcome = self
            .adapter
            .simulate(&setpoint, self.boundary as f64, self.previous.as_ref());
        if let Ok(op) = &outcome {
            self.previous = Some(*op);
        }
        self.trace.push(SweepStep {
            phase,
            setpoint,
            outcome: outcome.clone(),
        });
        outcome.ok()
    }

    /// Run `setpoints` in order; returns converged points and whether the last step converged.
    pub(crate) fn run(
        &mut self,
        phase: SweepPhase,
        setpoints: impl IntoIterator<Item = Setpoint>,
    ) -> (Vec<OperatingPoint>, Option<OperatingPoint>) {
        let mut converged = Vec::new();
        let mut last = None;
        for sp in setpoints {
            last = self.step(phase, sp);
            converged.extend(last);
        }
        (converged, last)
    }
}

/// Pick up to `window` points nearest the full-duty end of a heat sweep.
fn regression_window(points: &[OperatingPoint], window: Option<usize>, full_duty_last: bool) -> Vec<OperatingPoint> {
    let n = window.map_or(points.len(), |w| w.min(points.len()));
    if full_duty_last {
        points[points.len() - n..].to_vec()
    } else {
        points[..n].to_vec()
    }
}

/// Trace the four corners of the feasible P-Q region at one boundary value.
///
/// Excluded boundary values are rejected before any simulation call. Failed
/// steps are recorded in the trace and left out of every regime.
pub fn sweep_corners<S: Simulator>(
    adapter: &mut SimulationAdapter<S>,
    plan: &SweepPlan,
    boundary: i32,
    exclusions: &ExclusionSet,
) -> SweepResult<CornerSet> {
    exclusions.check(boundary)?;
    plan.validate()?;

    info!(boundary, "sweeping corners");

    let nameplate = plan.nameplate_load_w;
    let min_load = plan.min_load_w();
    let mut sweeper = Sweeper::new(adapter, boundary);

    // Nameplate load, bypass closing towards full duty.
    let duties = plan
        .heat_sweep(plan.min_heat_duty_w, plan.max_heat_duty_w)?
        .generate_points();
    let (top_heat_sweep, top_right) = sweeper.run(
        SweepPhase::TopHeat,
        duties.iter().map(|&d| Setpoint::new(nameplate, d)),
    );

    // Full duty, load falling to the minimum.
    let loads = plan.load_sweep(nameplate, min_load)?.generate_points();
    let (full_heat_load_sweep, bottom_right) = sweeper.run(
        SweepPhase::FullHeatLoad,
        loads[1..]
            .iter()
            .map(|&l| Setpoint::new(l, plan.max_heat_duty_w)),
    );

    // Minimum load, duty falling from what the plant actually delivered.
    let bottom_start = bottom_right
        .map(|op| op.q_heat())
        .filter(|&q| q > plan.min_heat_duty_w)
        .unwrap_or(plan.max_heat_duty_w);
    let duties = plan
        .heat_sweep(bottom_start, plan.min_heat_duty_w)?
        .generate_points();
    let (bottom_heat_sweep, _) = sweeper.run(
        SweepPhase::BottomHeat,
        duties.iter().map(|&d| Setpoint::new(min_load, d)),
    );

    // Lowest duty, load rising back to nameplate.
    let loads = plan.load_sweep(min_load, nameplate)?.generate_points();
    let (min_heat_load_sweep, _) = sweeper.run(
        SweepPhase::MinHeatLoad,
        loads[1..]
            .iter()
            .map(|&l| Setpoint::new(l, plan.min_heat_duty_w)),
    );

    let trace = sweeper.trace;
    let failed = trace.iter().filter(|s| s.outcome.is_err()).count();
    debug!(boundary, steps = trace.len(), failed, "sweep finished");

    Ok(CornerSet {
        boundary,
        top_left: Regime::new(regression_window(&top_heat_sweep, plan.regression_points, true)),
        top_right: Regime::new(top_right.into_iter().collect()),
        bottom_left: Regime::new(regression_window(
            &bottom_heat_sweep,
            plan.regression_points,
            false,
        )),
        bottom_right: Regime::new(bottom_right.into_iter().collect()),
        top_heat_sweep,
        bottom_heat_sweep,
        full_heat_load_sweep,
        min_heat_load_sweep,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(q: f64) -> OperatingPoint {
        OperatingPoint::new(100.0 - q, q, 250.0, 0.0).unwrap()
    }

    #[test]
    fn window_takes_full_duty_end() {
        let pts: Vec<_> = [10.0, 20.0, 30.0, 40.0].map(op).to_vec();
        let top = regression_window(&pts, Some(3), true);
        assert_eq!(top.iter().map(|p| p.q_heat()).collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);

        let desc: Vec<_> = [40.0, 30.0, 20.0, 10.0].map(op).to_vec();
        let bottom = regression_window(&desc, Some(2), false);
        assert_eq!(bottom.iter().map(|p| p.q_heat()).collect::<Vec<_>>(), vec![40.0, 30.0]);
    }

    #[test]
    fn window_shrinks_to_available_points() {
        let pts: Vec<_> = [10.0, 20.0].map(op).to_vec();
        assert_eq!(regression_window(&pts, Some(3), true).len(), 2);
        assert_eq!(regression_window(&pts, None, false).len(), 2);
        assert!(regression_window(&[], Some(3), true).is_empty());
    }
}
