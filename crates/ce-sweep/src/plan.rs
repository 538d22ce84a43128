use crate::error::{SweepError, SweepResult};
use crate::levels::{LevelSweep, Spacing};

/// Setpoint protocol for one plant unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPlan {
    /// Generator nameplate load (W).
    pub nameplate_load_w: f64,
    /// Minimum stable load as a fraction of nameplate. Plant specific.
    pub min_load_fraction: f64,
    /// Full heat-extraction duty (W).
    pub max_heat_duty_w: f64,
    /// Lowest duty simulated, the "bypass fully open" end of a heat sweep (W).
    pub min_heat_duty_w: f64,
    /// Number of steps of each heat-duty sweep.
    pub heat_steps: usize,
    pub heat_spacing: Spacing,
    /// Number of load levels between nameplate and minimum load, both included.
    pub load_levels: usize,
    /// Converged points nearest full duty used for the zero-heat intercepts.
    /// `None` uses every converged point of the sweep.
    pub regression_points: Option<usize>,
}

impl SweepPlan {
    /// Plan with the usual step counts; the lowest duty is 10 % of full duty.
    pub fn new(nameplate_load_w: f64, min_load_fraction: f64, max_heat_duty_w: f64) -> Self {
        Self {
            nameplate_load_w,
            min_load_fraction,
            max_heat_duty_w,
            min_heat_duty_w: 0.1 * max_heat_duty_w,
            heat_steps: 7,
            heat_spacing: Spacing::Linear,
            load_levels: 7,
            regression_points: Some(3),
        }
    }

    pub fn min_load_w(&self) -> f64 {
        self.min_load_fraction * self.nameplate_load_w
    }

    pub fn validate(&self) -> SweepResult<()> {
        let invalid = |what: String| Err(SweepError::InvalidPlan { what });

        if !(self.nameplate_load_w.is_finite() && self.nameplate_load_w > 0.0) {
            return invalid(format!(
                "nameplate load must be positive, got {}",
                self.nameplate_load_w
            ));
        }
        if !(self.min_load_fraction > 0.0 && self.min_load_fraction < 1.0) {
            return invalid(format!(
                "minimum load fraction must lie in (0, 1), got {}",
                self.min_load_fraction
            ));
        }
        if !(self.max_heat_duty_w.is_finite() && self.max_heat_duty_w > 0.0) {
            return invalid(format!(
                "full heat duty must be positive, got {}",
                self.max_heat_duty_w
            ));
        }
        if !(self.min_heat_duty_w >= 0.0 && self.min_heat_duty_w < self.max_heat_duty_w) {
            return invalid(format!(
                "lowest heat duty must lie in [0, {}), got {}",
                self.max_heat_duty_w, self.min_heat_duty_w
            ));
        }
        if self.heat_steps < 2 {
            return invalid("heat sweeps need at least 2 steps".to_string());
        }
        if self.load_levels < 2 {
            return invalid("load sweeps need at least 2 levels".to_string());
        }
        if let Some(n) = self.regression_points
            && !(2..=self.heat_steps).contains(&n)
        {
            return invalid(format!(
                "regression window must lie in [2, {}], got {n}",
                self.heat_steps
            ));
        }
        Ok(())
    }

    /// Heat-duty sweep between two duties.
    pub fn heat_sweep(&self, from_w: f64, to_w: f64) -> SweepResult<LevelSweep> {
        LevelSweep::new(from_w, to_w, self.heat_steps, self.heat_spacing)
    }

    /// Load sweep between two loads, always linear.
    pub fn load_sweep(&self, from_w: f64, to_w: f64) -> SweepResult<LevelSweep> {
        LevelSweep::new(from_w, to_w, self.load_levels, Spacing::Linear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_is_valid() {
        let plan = SweepPlan::new(100e6, 0.5, 80e6);
        plan.validate().unwrap();
        assert_eq!(plan.min_load_w(), 50e6);
        assert_eq!(plan.min_heat_duty_w, 8e6);
    }

    #[test]
    fn min_load_fraction_must_be_declared_in_range() {
        for bad in [0.0, 1.0, -0.2, f64::NAN] {
            let plan = SweepPlan::new(100e6, bad, 80e6);
            assert!(plan.validate().is_err(), "fraction {bad} accepted");
        }
    }

    #[test]
    fn regression_window_bounded_by_steps() {
        let mut plan = SweepPlan::new(100e6, 0.55, 80e6);
        plan.regression_points = Some(8);
        assert!(plan.validate().is_err());
        plan.regression_points = Some(1);
        assert!(plan.validate().is_err());
        plan.regression_points = None;
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn lowest_duty_below_full_duty() {
        let mut plan = SweepPlan::new(100e6, 0.6, 80e6);
        plan.min_heat_duty_w = 80e6;
        assert!(plan.validate().is_err());
    }
}
