//! Swept points grouped by operating regime.

use ce_core::{CoreResult, LinearFit, fit_line, mean};
use ce_sim::{ConvergenceFailure, OperatingPoint, Setpoint};
use serde::Serialize;

/// Phase of the sweep protocol a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPhase {
    /// Nameplate load, heat duty rising.
    TopHeat,
    /// Full duty, load falling.
    FullHeatLoad,
    /// Minimum load, heat duty falling.
    BottomHeat,
    /// Lowest duty, load rising.
    MinHeatLoad,
    /// Heat pump, heat output falling from nameplate.
    HeatPumpLoad,
}

/// One simulation call of a sweep and its outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepStep {
    pub phase: SweepPhase,
    pub setpoint: Setpoint,
    pub outcome: Result<OperatingPoint, ConvergenceFailure>,
}

/// Converged points attributed to one corner of the P-Q region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Regime {
    points: Vec<OperatingPoint>,
}

impl Regime {
    pub fn new(points: Vec<OperatingPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[OperatingPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The corner's reference point: the last one collected.
    pub fn reference(&self) -> Option<&OperatingPoint> {
        self.points.last()
    }

    /// Least squares line of |P| over |Q|.
    ///
    /// The intercept is the power at zero heat extraction.
    pub fn power_over_heat(&self) -> CoreResult<LinearFit> {
        let q: Vec<f64> = self.points.iter().map(|op| op.q_heat().abs()).collect();
        let p: Vec<f64> = self.points.iter().map(|op| op.p_elec().abs()).collect();
        fit_line(&q, &p)
    }

    pub fn mean_fuel_input(&self) -> CoreResult<f64> {
        let q_in: Vec<f64> = self.points.iter().map(OperatingPoint::q_fuel_in).collect();
        mean(&q_in, "fuel input")
    }
}

/// Everything one boundary-condition sweep produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerSet {
    pub boundary: i32,
    /// Nameplate load, zero-heat regression points.
    pub top_left: Regime,
    /// Nameplate load, full duty.
    pub top_right: Regime,
    /// Minimum load, zero-heat regression points.
    pub bottom_left: Regime,
    /// Minimum load, full duty.
    pub bottom_right: Regime,
    /// Converged points of the nameplate heat sweep, duty ascending.
    pub top_heat_sweep: Vec<OperatingPoint>,
    /// Converged points of the minimum-load heat sweep, duty descending.
    pub bottom_heat_sweep: Vec<OperatingPoint>,
    /// Intermediate load levels at full duty.
    pub full_heat_load_sweep: Vec<OperatingPoint>,
    /// Intermediate load levels at the lowest duty.
    pub min_heat_load_sweep: Vec<OperatingPoint>,
    pub trace: Vec<SweepStep>,
}

impl CornerSet {
    /// Lowest-duty converged point at nameplate load.
    pub fn top_min_heat(&self) -> Option<&OperatingPoint> {
        self.top_heat_sweep.first()
    }

    /// Lowest-duty converged point at minimum load.
    pub fn bottom_min_heat(&self) -> Option<&OperatingPoint> {
        self.bottom_heat_sweep.last()
    }

    pub fn converged_steps(&self) -> usize {
        self.trace.iter().filter(|s| s.outcome.is_ok()).count()
    }

    pub fn failed_steps(&self) -> usize {
        self.trace.len() - self.converged_steps()
    }

    /// All converged `(Q, P)` pairs in sweep order.
    ///
    /// Includes the intermediate load levels, which no corner uses.
    pub fn pq_cloud(&self) -> (Vec<f64>, Vec<f64>) {
        converged_pq(&self.trace)
    }
}

/// Converged `(Q, P)` pairs of a trace, in step order.
pub(crate) fn converged_pq(trace: &[SweepStep]) -> (Vec<f64>, Vec<f64>) {
    trace
        .iter()
        .filter_map(|s| s.outcome.as_ref().ok())
        .map(|op| (op.q_heat(), op.p_elec()))
        .unzip()
}
