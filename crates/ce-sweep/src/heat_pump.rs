//! Load sweep of a heat pump at one sink temperature.
//!
//! A heat pump has no generator load to vary. Heat output is stepped down
//! from nameplate to the plant's minimum turndown and the electrical input
//! recorded at each level; the resulting line is reduced downstream.

use crate::corners::{SweepPhase, SweepStep, converged_pq};
use crate::driver::Sweeper;
use crate::error::{SweepError, SweepResult};
use crate::exclusion::ExclusionSet;
use crate::levels::{LevelSweep, Spacing};
use ce_sim::{OperatingPoint, Setpoint, SimulationAdapter, Simulator};
use tracing::{debug, info};

/// Turndown limits that replace the default ones above a boundary value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighBoundaryLimits {
    /// Boundary values strictly above this use the limits.
    pub above: i32,
    pub min_load_fraction: f64,
    pub load_levels: usize,
}

/// Setpoint protocol for one heat pump.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPumpPlan {
    /// Heat output at design sink flow (W).
    pub nameplate_heat_w: f64,
    /// Lowest heat output as a fraction of nameplate.
    pub min_load_fraction: f64,
    /// Heat output levels from nameplate to the minimum, both included.
    pub load_levels: usize,
    /// Narrower turndown at high sink temperatures.
    pub high_boundary: Option<HighBoundaryLimits>,
}

impl HeatPumpPlan {
    /// Plan turning down to 30 % over 8 levels, and to 50 % over 6 levels
    /// above 115.
    pub fn new(nameplate_heat_w: f64) -> Self {
        Self {
            nameplate_heat_w,
            min_load_fraction: 0.3,
            load_levels: 8,
            high_boundary: Some(HighBoundaryLimits {
                above: 115,
                min_load_fraction: 0.5,
                load_levels: 6,
            }),
        }
    }

    /// Minimum load fraction and level count in effect at `boundary`.
    pub fn limits_at(&self, boundary: i32) -> (f64, usize) {
        match self.high_boundary {
            Some(high) if boundary > high.above => (high.min_load_fraction, high.load_levels),
            _ => (self.min_load_fraction, self.load_levels),
        }
    }

    pub fn validate(&self) -> SweepResult<()> {
        if !(self.nameplate_heat_w.is_finite() && self.nameplate_heat_w > 0.0) {
            return Err(SweepError::InvalidPlan {
                what: format!("nameplate heat output must be positive, got {}", self.nameplate_heat_w),
            });
        }
        let limits = std::iter::once((self.min_load_fraction, self.load_levels))
            .chain(self.high_boundary.map(|h| (h.min_load_fraction, h.load_levels)));
        for (fraction, levels) in limits {
            if !(fraction > 0.0 && fraction < 1.0) {
                return Err(SweepError::InvalidPlan {
                    what: format!("minimum load fraction must lie in (0, 1), got {fraction}"),
                });
            }
            if levels < 2 {
                return Err(SweepError::InvalidPlan {
                    what: "heat pump sweeps need at least 2 levels".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Heat output levels at `boundary`, nameplate first.
    pub fn load_sweep(&self, boundary: i32) -> SweepResult<LevelSweep> {
        let (fraction, levels) = self.limits_at(boundary);
        LevelSweep::new(
            self.nameplate_heat_w,
            fraction * self.nameplate_heat_w,
            levels,
            Spacing::Linear,
        )
    }
}

/// Everything one heat pump sweep produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatPumpSweep {
    pub boundary: i32,
    /// Converged points, heat output descending.
    pub points: Vec<OperatingPoint>,
    pub trace: Vec<SweepStep>,
}

impl HeatPumpSweep {
    pub fn failed_steps(&self) -> usize {
        self.trace.iter().filter(|s| s.outcome.is_err()).count()
    }

    /// All converged `(Q, P)` pairs in sweep order.
    pub fn pq_cloud(&self) -> (Vec<f64>, Vec<f64>) {
        converged_pq(&self.trace)
    }
}

/// Step a heat pump from nameplate heat output down to its minimum at one
/// boundary value.
///
/// Excluded boundary values are rejected before any simulation call. Failed
/// steps stay in the trace and are left out of `points`.
pub fn sweep_heat_pump<S: Simulator>(
    adapter: &mut SimulationAdapter<S>,
    plan: &HeatPumpPlan,
    boundary: i32,
    exclusions: &ExclusionSet,
) -> SweepResult<HeatPumpSweep> {
    exclusions.check(boundary)?;
    plan.validate()?;

    info!(boundary, "sweeping heat pump");

    let duties = plan.load_sweep(boundary)?.generate_points();
    let mut sweeper = Sweeper::new(adapter, boundary);
    let (points, _) = sweeper.run(
        SweepPhase::HeatPumpLoad,
        duties.iter().map(|&d| Setpoint::new(0.0, d)),
    );

    let trace = sweeper.trace;
    debug!(boundary, steps = trace.len(), converged = points.len(), "heat pump sweep finished");

    Ok(HeatPumpSweep {
        boundary,
        points,
        trace,
    })
}
