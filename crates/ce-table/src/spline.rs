//! Piecewise cubic interpolants in Hermite form.
//!
//! Both kinds store knot values and knot slopes; they differ only in how the
//! slopes are chosen. Queries outside the knot range evaluate the end
//! polynomial.

use crate::error::{TableError, TableResult};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    /// Shape-preserving piecewise cubic Hermite (Fritsch-Carlson slopes).
    #[default]
    Pchip,
    /// C2 cubic spline with zero curvature at both ends.
    NaturalCubic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    slopes: Vec<f64>,
}

impl CubicSpline {
    /// Fit through `(x, y)`; `x` must be strictly increasing.
    pub fn fit(kind: InterpolationKind, x: &[f64], y: &[f64]) -> TableResult<Self> {
        if x.len() != y.len() || x.len() < 2 {
            return Err(TableError::TooFewSamples {
                needed: 2,
                got: x.len().min(y.len()),
            });
        }
        if let Some(v) = x.iter().chain(y).find(|v| !v.is_finite()) {
            return Err(TableError::NonFinite {
                what: format!("knot value {v}"),
            });
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TableError::UnsortedKnots);
        }

        let slopes = match kind {
            InterpolationKind::Pchip => pchip_slopes(x, y),
            InterpolationKind::NaturalCubic => natural_slopes(x, y)?,
        };
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            slopes,
        })
    }

    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        let k = match self.x.partition_point(|&xi| xi <= xq) {
            0 => 0,
            i => (i - 1).min(n - 2),
        };
        let h = self.x[k + 1] - self.x[k];
        let t = (xq - self.x[k]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.y[k] + h10 * h * self.slopes[k] + h01 * self.y[k + 1] + h11 * h * self.slopes[k + 1]
    }
}

fn secants(x: &[f64], y: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = y
        .windows(2)
        .zip(&h)
        .map(|(w, &hk)| (w[1] - w[0]) / hk)
        .collect();
    (h, delta)
}

fn pchip_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let (h, delta) = secants(x, y);
    let n = x.len();
    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (d0, d1) = (delta[k - 1], delta[k]);
        if d0 * d1 <= 0.0 {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / d0 + w2 / d1);
    }
    d[0] = pchip_end_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = pchip_end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

/// Non-centred three-point end slope, limited to keep the end interval monotone.
fn pchip_end_slope(h0: f64, h1: f64, delta0: f64, delta1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * delta0 - h0 * delta1) / (h0 + h1);
    if d.signum() != delta0.signum() || delta0 == 0.0 {
        0.0
    } else if delta0.signum() != delta1.signum() && d.abs() > 3.0 * delta0.abs() {
        3.0 * delta0
    } else {
        d
    }
}

fn natural_slopes(x: &[f64], y: &[f64]) -> TableResult<Vec<f64>> {
    let (h, delta) = secants(x, y);
    let n = x.len();

    // Second derivatives; zero at both ends.
    let mut m = vec![0.0; n];
    if n > 2 {
        let inner = n - 2;
        let mut a = DMatrix::<f64>::zeros(inner, inner);
        let mut rhs = DVector::<f64>::zeros(inner);
        for i in 0..inner {
            let k = i + 1;
            a[(i, i)] = 2.0 * (h[k - 1] + h[k]);
            if i > 0 {
                a[(i, i - 1)] = h[k - 1];
            }
            if i + 1 < inner {
                a[(i, i + 1)] = h[k];
            }
            rhs[i] = 6.0 * (delta[k] - delta[k - 1]);
        }
        let sol = a.lu().solve(&rhs).ok_or(TableError::Singular)?;
        m[1..n - 1].copy_from_slice(sol.as_slice());
    }

    let mut d: Vec<f64> = (0..n - 1)
        .map(|k| delta[k] - h[k] * (2.0 * m[k] + m[k + 1]) / 6.0)
        .collect();
    d.push(delta[n - 2] + h[n - 2] * (m[n - 2] + 2.0 * m[n - 1]) / 6.0);
    Ok(d)
}
