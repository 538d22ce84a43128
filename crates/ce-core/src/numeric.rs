use crate::CoreError;

/// Scalar type of every power, heat flow and boundary value.
pub type Real = f64;

/// Absolute and relative slack for comparing two computed values.
///
/// The absolute part decides near zero, the relative part at plant scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self { abs: 1e-12, rel: 1e-9 }
    }
}

/// Whether `a` and `b` agree within either slack.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

/// `v` itself, or `NonFinite` naming `what`.
pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CoreError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Arithmetic mean. An empty slice is an error, never NaN.
pub fn mean(values: &[Real], what: &'static str) -> Result<Real, CoreError> {
    if values.is_empty() {
        return Err(CoreError::InsufficientData {
            what,
            needed: 1,
            got: 0,
        });
    }
    let sum: Real = values.iter().sum();
    ensure_finite(sum / values.len() as Real, what)
}

/// `n` evenly spaced values from `start` to `end`, both ends included.
pub fn linspace(start: Real, end: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let delta = (end - start) / (n - 1) as Real;
            let mut points: Vec<Real> = (0..n).map(|i| start + i as Real * delta).collect();
            // Ensure exact endpoint
            points[n - 1] = end;
            points
        }
    }
}
