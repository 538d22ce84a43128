//! Ordinary least squares line fits.
//!
//! Corner intercepts are never simulated directly; they are recovered as the
//! `x = 0` intercept of a straight line fitted through neighbouring converged
//! points. The fit is carried out on mean-centred abscissae so that megawatt
//! scale inputs stay well conditioned.

use crate::numeric::{Real, ensure_finite};
use crate::{CoreError, CoreResult};
use nalgebra::{DMatrix, DVector};

/// Result of fitting `y = slope * x + intercept`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub slope: Real,
    pub intercept: Real,
    /// Number of samples used for the fit.
    pub samples: usize,
}

/// Fit a straight line through `(x, y)` pairs by least squares.
///
/// Requires at least two samples with distinct abscissae.
pub fn fit_line(x: &[Real], y: &[Real]) -> CoreResult<LinearFit> {
    if x.len() != y.len() {
        return Err(CoreError::InvalidArg {
            what: "regression abscissa and ordinate lengths differ",
        });
    }
    if x.len() < 2 {
        return Err(CoreError::InsufficientData {
            what: "line fit",
            needed: 2,
            got: x.len(),
        });
    }
    for (&xi, &yi) in x.iter().zip(y) {
        ensure_finite(xi, "regression abscissa")?;
        ensure_finite(yi, "regression ordinate")?;
    }

    let n = x.len();
    let x_mean = x.iter().sum::<Real>() / n as Real;

    let design = DMatrix::from_fn(n, 2, |i, j| if j == 0 { x[i] - x_mean } else { 1.0 });
    let rhs = DVector::from_column_slice(y);

    let svd = design.svd(true, true);
    let s_max = svd
        .singular_values
        .iter()
        .fold(0.0_f64, |acc, &s| acc.max(s));
    let eps = s_max * 1e-12;
    if svd.rank(eps) < 2 {
        return Err(CoreError::Degenerate {
            what: "all abscissae coincide",
        });
    }

    let coeffs = svd.solve(&rhs, eps).map_err(|_| CoreError::Degenerate {
        what: "least squares solve failed",
    })?;

    let slope = ensure_finite(coeffs[0], "regression slope")?;
    let centred_intercept = coeffs[1];
    let intercept = ensure_finite(centred_intercept - slope * x_mean, "regression intercept")?;

    Ok(LinearFit {
        slope,
        intercept,
        samples: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn exact_line_is_recovered() {
        let x = [10e6, 20e6, 30e6];
        let y: Vec<f64> = x.iter().map(|q| -0.18 * q + 95e6).collect();
        let fit = fit_line(&x, &y).unwrap();
        assert!((fit.intercept - 95e6).abs() / 95e6 < 1e-9);
        assert!((fit.slope + 0.18).abs() < 1e-9);
        assert_eq!(fit.samples, 3);
    }

    #[test]
    fn constant_ordinate_gives_mean() {
        // Engine-type plants: power does not react to heat recovery.
        let fit = fit_line(&[1.0, 2.0, 4.0], &[5.0, 5.0, 5.0]).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert!((fit.intercept - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_single_sample() {
        let err = fit_line(&[1.0], &[2.0]).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientData { needed: 2, got: 1, .. }));
    }

    #[test]
    fn rejects_coincident_abscissae() {
        let err = fit_line(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, CoreError::Degenerate { .. }));
    }

    #[test]
    fn rejects_nan_input() {
        let err = fit_line(&[1.0, f64::NAN], &[2.0, 3.0]).unwrap_err();
        assert!(matches!(err, CoreError::NonFinite { .. }));
    }

    proptest! {
        #[test]
        fn intercept_recovered_within_tolerance(
            a in -2.0_f64..2.0,
            b in 1.0e5_f64..5.0e8,
            q0 in 1.0e5_f64..1.0e7,
            dq in 1.0e5_f64..5.0e6,
            n in 2_usize..8,
        ) {
            let x: Vec<f64> = (0..n).map(|i| q0 + i as f64 * dq).collect();
            let y: Vec<f64> = x.iter().map(|q| a * q + b).collect();
            let fit = fit_line(&x, &y).unwrap();
            prop_assert!((fit.intercept - b).abs() <= 1e-6 * b.abs());
        }
    }
}
