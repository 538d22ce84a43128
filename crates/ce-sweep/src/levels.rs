//! Setpoint level generation.
//!
//! A sweep is defined by its bounds, a point count, and a spacing rule. The
//! bounds may run in either direction; the first generated point is always
//! `start` and the last is always exactly `end`.

use crate::error::{SweepError, SweepResult};
use ce_core::{Tolerances, linspace, nearly_equal};
use std::fmt;

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// Uniformly spaced points
    #[default]
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// Definition of a single setpoint sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSweep {
    pub start: f64,
    pub end: f64,
    /// Number of points to generate
    pub num_points: usize,
    pub spacing: Spacing,
}

impl LevelSweep {
    pub fn new(start: f64, end: f64, num_points: usize, spacing: Spacing) -> SweepResult<Self> {
        if num_points < 2 {
            return Err(SweepError::InvalidPlan {
                what: "sweep must have at least 2 points".to_string(),
            });
        }
        if !start.is_finite() || !end.is_finite() {
            return Err(SweepError::InvalidPlan {
                what: format!("sweep bounds must be finite ({start} .. {end})"),
            });
        }
        if nearly_equal(start, end, Tolerances::default()) {
            return Err(SweepError::InvalidPlan {
                what: "start and end values must be different".to_string(),
            });
        }
        Ok(Self {
            start,
            end,
            num_points,
            spacing,
        })
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> Vec<f64> {
        match self.spacing {
            Spacing::Linear => linspace(self.start, self.end, self.num_points),
            Spacing::Logarithmic => self.generate_logarithmic(),
        }
    }

    fn generate_logarithmic(&self) -> Vec<f64> {
        // For logarithmic sweep, both start and end must be positive
        if self.start <= 0.0 || self.end <= 0.0 {
            return linspace(self.start, self.end, self.num_points);
        }

        let mut points: Vec<f64> = linspace(self.start.ln(), self.end.ln(), self.num_points)
            .into_iter()
            .map(f64::exp)
            .collect();

        // Ensure exact endpoints
        points[0] = self.start;
        let last = points.len() - 1;
        points[last] = self.end;
        points
    }
}

impl fmt::Display for Spacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for LevelSweep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sweep from {} to {} ({} points, {})",
            self.start, self.end, self.num_points, self.spacing
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_sweep_generation() {
        let sweep = LevelSweep::new(10e6, 70e6, 7, Spacing::Linear).unwrap();
        let points = sweep.generate_points();
        assert_eq!(points.len(), 7);
        assert!((points[0] - 10e6).abs() < 1e-6);
        assert!((points[3] - 40e6).abs() < 1e-6);
        assert_eq!(points[6], 70e6);
    }

    #[test]
    fn descending_sweep_generation() {
        let sweep = LevelSweep::new(1.0, 0.5, 6, Spacing::Linear).unwrap();
        let points = sweep.generate_points();
        assert_eq!(points[0], 1.0);
        assert_eq!(points[5], 0.5);
        assert!(points.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn logarithmic_sweep_generation() {
        let sweep = LevelSweep::new(1e5, 1e7, 3, Spacing::Logarithmic).unwrap();
        let points = sweep.generate_points();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], 1e5);
        assert_eq!(points[2], 1e7);
        let expected_mid = (1e5_f64 * 1e7_f64).sqrt();
        assert!((points[1] - expected_mid).abs() / expected_mid < 1e-6);
    }

    #[test]
    fn logarithmic_falls_back_to_linear_through_zero() {
        let sweep = LevelSweep::new(0.0, 10.0, 3, Spacing::Logarithmic).unwrap();
        assert_eq!(sweep.generate_points(), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn reject_invalid_point_count() {
        assert!(LevelSweep::new(0.0, 1.0, 1, Spacing::Linear).is_err());
    }

    #[test]
    fn reject_identical_bounds() {
        assert!(LevelSweep::new(3.0, 3.0, 5, Spacing::Linear).is_err());
        // Bounds a rounding error apart at megawatt scale are still one level.
        assert!(LevelSweep::new(80e6, 80e6 * (1.0 + 1e-12), 5, Spacing::Linear).is_err());
        assert!(LevelSweep::new(80e6, 80e6 + 1.0, 5, Spacing::Linear).is_ok());
    }

    proptest::proptest! {
        #[test]
        fn endpoints_exact_and_strictly_monotone(
            start in 1.0f64..1e8,
            span in 1.0f64..1e8,
            n in 2usize..40,
            descending in proptest::bool::ANY,
            log in proptest::bool::ANY,
        ) {
            let (a, b) = if descending { (start + span, start) } else { (start, start + span) };
            let spacing = if log { Spacing::Logarithmic } else { Spacing::Linear };
            let points = LevelSweep::new(a, b, n, spacing).unwrap().generate_points();
            proptest::prop_assert_eq!(points.len(), n);
            proptest::prop_assert_eq!(points[0], a);
            proptest::prop_assert_eq!(points[n - 1], b);
            if descending {
                proptest::prop_assert!(points.windows(2).all(|w| w[1] < w[0]));
            } else {
                proptest::prop_assert!(points.windows(2).all(|w| w[1] > w[0]));
            }
        }
    }
}
