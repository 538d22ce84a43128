use ce_core::{CoreResult, ensure_finite};
use serde::{Deserialize, Serialize};

/// One converged plant state. All values in W.
///
/// Every field is finite; construction goes through [`OperatingPoint::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    p_elec: f64,
    q_heat: f64,
    q_fuel_in: f64,
    q_condenser_loss: f64,
}

impl OperatingPoint {
    pub fn new(p_elec: f64, q_heat: f64, q_fuel_in: f64, q_condenser_loss: f64) -> CoreResult<Self> {
        Ok(Self {
            p_elec: ensure_finite(p_elec, "P_elec")?,
            q_heat: ensure_finite(q_heat, "Q_heat")?,
            q_fuel_in: ensure_finite(q_fuel_in, "Q_fuel_in")?,
            q_condenser_loss: ensure_finite(q_condenser_loss, "Q_condenser_loss")?,
        })
    }

    /// Signed net generator output.
    pub fn p_elec(&self) -> f64 {
        self.p_elec
    }

    /// Net delivered heat.
    pub fn q_heat(&self) -> f64 {
        self.q_heat
    }

    pub fn q_fuel_in(&self) -> f64 {
        self.q_fuel_in
    }

    pub fn q_condenser_loss(&self) -> f64 {
        self.q_condenser_loss
    }

    /// Fraction of fuel input neither converted to power nor delivered as heat.
    ///
    /// `None` when the fuel input is not positive.
    pub fn loss_share(&self) -> Option<f64> {
        if self.q_fuel_in > 0.0 {
            Some(1.0 - (self.p_elec + self.q_heat) / self.q_fuel_in)
        } else {
            None
        }
    }
}
