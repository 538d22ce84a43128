use crate::envelope::Envelope;
use crate::error::{ExtractionError, ExtractionResult};
use ce_core::mean;
use ce_sim::OperatingPoint;
use ce_sweep::{CornerSet, Regime};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the flue gas / ambient loss shares are reduced from corner points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossShareMethod {
    /// Mean of the per-point energy balance residual `1 - (P + Q) / Q_in`.
    #[default]
    CornerAverage,
    /// `1 - (dQ + dP) / dQ_in` between the two points of a heat level.
    DeltaRatio,
}

/// Reduce one boundary condition's corner regimes to an [`Envelope`].
///
/// Any missing corner or degenerate regression aborts the boundary; no
/// partially averaged envelope is ever returned.
pub fn extract(corners: &CornerSet, method: LossShareMethod) -> ExtractionResult<Envelope> {
    let p_max = intercept(&corners.top_left, "top_left")?;
    let p_min = intercept(&corners.bottom_left, "bottom_left")?;

    let q_in_top = fuel_input(&corners.top_left, "top_left")?;
    let q_in_bottom = fuel_input(&corners.bottom_left, "bottom_left")?;

    let tr = reference(&corners.top_right, "top_right")?;
    let br = reference(&corners.bottom_right, "bottom_right")?;
    let top_min = corners
        .top_min_heat()
        .ok_or(ExtractionError::MissingCorner { corner: "top_min_heat" })?;
    let bottom_min = corners
        .bottom_min_heat()
        .ok_or(ExtractionError::MissingCorner {
            corner: "bottom_min_heat",
        })?;

    let (share_max, share_min) = match method {
        LossShareMethod::CornerAverage => (
            mean(&[loss_share(tr)?, loss_share(br)?], "loss share")
                .map_err(|_| ExtractionError::Degenerate { what: "loss share" })?,
            mean(&[loss_share(top_min)?, loss_share(bottom_min)?], "loss share")
                .map_err(|_| ExtractionError::Degenerate { what: "loss share" })?,
        ),
        LossShareMethod::DeltaRatio => (delta_share(tr, br)?, delta_share(top_min, bottom_min)?),
    };

    let beta = (power_loss_per_heat(tr, p_max)? + power_loss_per_heat(br, p_min)?) / 2.0;
    let q_cw_min = tr
        .q_condenser_loss()
        .abs()
        .min(br.q_condenser_loss().abs());

    let envelope = Envelope {
        p_max_wo_dh: p_max,
        p_min_wo_dh: p_min,
        eta_el_max: p_max / q_in_top,
        eta_el_min: p_min / q_in_bottom,
        h_l_fg_share_max: share_max,
        h_l_fg_share_min: share_min,
        q_cw_min,
        beta,
        q_in: q_in_top,
    };
    envelope.validate()?;

    debug!(
        boundary = corners.boundary,
        p_max = envelope.p_max_wo_dh,
        p_min = envelope.p_min_wo_dh,
        beta = envelope.beta,
        "envelope extracted"
    );
    Ok(envelope)
}

fn intercept(regime: &Regime, corner: &'static str) -> ExtractionResult<f64> {
    regime
        .power_over_heat()
        .map(|fit| fit.intercept)
        .map_err(|source| ExtractionError::Regression { corner, source })
}

fn fuel_input(regime: &Regime, corner: &'static str) -> ExtractionResult<f64> {
    let q_in = regime
        .mean_fuel_input()
        .map_err(|source| ExtractionError::Regression { corner, source })?;
    if q_in > 0.0 {
        Ok(q_in)
    } else {
        Err(ExtractionError::Degenerate { what: "fuel input" })
    }
}

fn reference<'a>(regime: &'a Regime, corner: &'static str) -> ExtractionResult<&'a OperatingPoint> {
    regime
        .reference()
        .ok_or(ExtractionError::MissingCorner { corner })
}

fn loss_share(op: &OperatingPoint) -> ExtractionResult<f64> {
    op.loss_share()
        .ok_or(ExtractionError::Degenerate { what: "fuel input" })
}

fn delta_share(a: &OperatingPoint, b: &OperatingPoint) -> ExtractionResult<f64> {
    let d_in = b.q_fuel_in() - a.q_fuel_in();
    if d_in.abs() <= f64::EPSILON * a.q_fuel_in().abs().max(b.q_fuel_in().abs()) {
        return Err(ExtractionError::Degenerate {
            what: "fuel input difference",
        });
    }
    let ratio = ((b.q_heat() - a.q_heat()) + (b.p_elec() - a.p_elec())) / d_in;
    Ok(1.0 - ratio)
}

fn power_loss_per_heat(op: &OperatingPoint, p_without_heat: f64) -> ExtractionResult<f64> {
    let q = op.q_heat();
    if q.abs() <= f64::EPSILON {
        return Err(ExtractionError::Degenerate {
            what: "heat at full duty",
        });
    }
    Ok((op.p_elec() - p_without_heat).abs() / q.abs())
}
