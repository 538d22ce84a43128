use crate::params::{InvariantViolation, ParameterSet, first_non_finite};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linear operating envelope of a CHP unit at one boundary condition.
///
/// Powers and heat flows in W, shares and efficiencies as fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Power at nameplate load without heat extraction.
    #[serde(rename = "P_max_woDH")]
    pub p_max_wo_dh: f64,
    /// Power at minimum load without heat extraction.
    #[serde(rename = "P_min_woDH")]
    pub p_min_wo_dh: f64,
    #[serde(rename = "eta_el_max")]
    pub eta_el_max: f64,
    #[serde(rename = "eta_el_min")]
    pub eta_el_min: f64,
    /// Flue gas / ambient loss share at full heat extraction.
    #[serde(rename = "H_L_FG_share_max")]
    pub h_l_fg_share_max: f64,
    /// Flue gas / ambient loss share at minimum heat extraction.
    #[serde(rename = "H_L_FG_share_min")]
    pub h_l_fg_share_min: f64,
    /// Condenser rejection floor.
    #[serde(rename = "Q_CW_min")]
    pub q_cw_min: f64,
    /// Power lost per unit of extracted heat.
    #[serde(rename = "beta")]
    pub beta: f64,
    /// Fuel input at nameplate load without heat extraction.
    #[serde(rename = "Q_in")]
    pub q_in: f64,
}

/// A field of [`Envelope`], for column-wise processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnvelopeField {
    PMaxWoDh,
    PMinWoDh,
    EtaElMax,
    EtaElMin,
    HLFgShareMax,
    HLFgShareMin,
    QCwMin,
    Beta,
    QIn,
}

const FIELD_NAMES: [&str; 9] = [
    "P_max_woDH",
    "P_min_woDH",
    "eta_el_max",
    "eta_el_min",
    "H_L_FG_share_max",
    "H_L_FG_share_min",
    "Q_CW_min",
    "beta",
    "Q_in",
];

impl EnvelopeField {
    pub const ALL: [EnvelopeField; 9] = [
        Self::PMaxWoDh,
        Self::PMinWoDh,
        Self::EtaElMax,
        Self::EtaElMin,
        Self::HLFgShareMax,
        Self::HLFgShareMin,
        Self::QCwMin,
        Self::Beta,
        Self::QIn,
    ];

    /// Position in [`EnvelopeField::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name in persisted tables.
    pub fn name(self) -> &'static str {
        FIELD_NAMES[self.index()]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    pub fn get(self, env: &Envelope) -> f64 {
        match self {
            Self::PMaxWoDh => env.p_max_wo_dh,
            Self::PMinWoDh => env.p_min_wo_dh,
            Self::EtaElMax => env.eta_el_max,
            Self::EtaElMin => env.eta_el_min,
            Self::HLFgShareMax => env.h_l_fg_share_max,
            Self::HLFgShareMin => env.h_l_fg_share_min,
            Self::QCwMin => env.q_cw_min,
            Self::Beta => env.beta,
            Self::QIn => env.q_in,
        }
    }

    fn slot(self, env: &mut Envelope) -> &mut f64 {
        match self {
            Self::PMaxWoDh => &mut env.p_max_wo_dh,
            Self::PMinWoDh => &mut env.p_min_wo_dh,
            Self::EtaElMax => &mut env.eta_el_max,
            Self::EtaElMin => &mut env.eta_el_min,
            Self::HLFgShareMax => &mut env.h_l_fg_share_max,
            Self::HLFgShareMin => &mut env.h_l_fg_share_min,
            Self::QCwMin => &mut env.q_cw_min,
            Self::Beta => &mut env.beta,
            Self::QIn => &mut env.q_in,
        }
    }
}

impl fmt::Display for EnvelopeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Envelope {
    /// Build from values ordered as [`EnvelopeField::ALL`].
    pub fn from_values(values: [f64; 9]) -> Self {
        let mut env = Self {
            p_max_wo_dh: 0.0,
            p_min_wo_dh: 0.0,
            eta_el_max: 0.0,
            eta_el_min: 0.0,
            h_l_fg_share_max: 0.0,
            h_l_fg_share_min: 0.0,
            q_cw_min: 0.0,
            beta: 0.0,
            q_in: 0.0,
        };
        for (field, value) in EnvelopeField::ALL.into_iter().zip(values) {
            *field.slot(&mut env) = value;
        }
        env
    }

    /// Values ordered as [`EnvelopeField::ALL`].
    pub fn values(&self) -> [f64; 9] {
        EnvelopeField::ALL.map(|f| f.get(self))
    }

    /// Check `P_max >= P_min >= 0`, loss shares in `[0, 1]`, efficiencies in
    /// `(0, 1]`, positive fuel input and finiteness of every field.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let violation = |field: EnvelopeField, constraint| InvariantViolation {
            field: field.name(),
            value: field.get(self),
            constraint,
        };

        if let Some(non_finite) = first_non_finite(self) {
            return Err(non_finite);
        }
        if self.p_min_wo_dh < 0.0 {
            return Err(violation(EnvelopeField::PMinWoDh, "P_min_woDH >= 0"));
        }
        if self.p_max_wo_dh < self.p_min_wo_dh {
            return Err(violation(EnvelopeField::PMaxWoDh, "P_max_woDH >= P_min_woDH"));
        }
        for field in [EnvelopeField::EtaElMax, EnvelopeField::EtaElMin] {
            let v = field.get(self);
            if !(v > 0.0 && v <= 1.0) {
                return Err(violation(field, "0 < eta_el <= 1"));
            }
        }
        for field in [EnvelopeField::HLFgShareMax, EnvelopeField::HLFgShareMin] {
            if !(0.0..=1.0).contains(&field.get(self)) {
                return Err(violation(field, "0 <= H_L_FG_share <= 1"));
            }
        }
        if self.q_in <= 0.0 {
            return Err(violation(EnvelopeField::QIn, "Q_in > 0"));
        }
        Ok(())
    }
}

impl ParameterSet for Envelope {
    const FIELDS: &'static [&'static str] = &FIELD_NAMES;

    fn to_row(&self) -> Vec<f64> {
        self.values().to_vec()
    }

    fn from_row(row: &[f64]) -> Option<Self> {
        let values: [f64; 9] = row.try_into().ok()?;
        Some(Self::from_values(values))
    }

    fn check(&self) -> Result<(), InvariantViolation> {
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> Envelope {
        Envelope {
            p_max_wo_dh: 100e6,
            p_min_wo_dh: 50e6,
            eta_el_max: 0.45,
            eta_el_min: 0.40,
            h_l_fg_share_max: 0.12,
            h_l_fg_share_min: 0.30,
            q_cw_min: 10e6,
            beta: 0.15,
            q_in: 222e6,
        }
    }

    #[test]
    fn values_round_trip_field_order() {
        let env = sample();
        assert_eq!(Envelope::from_values(env.values()), env);
        assert_eq!(EnvelopeField::from_name("H_L_FG_share_min"), Some(EnvelopeField::HLFgShareMin));
        assert_eq!(EnvelopeField::from_name("nope"), None);
        for (i, field) in EnvelopeField::ALL.into_iter().enumerate() {
            assert_eq!(field.index(), i);
            assert_eq!(Envelope::FIELDS[i], field.name());
        }
        assert_eq!(Envelope::from_row(&env.to_row()), Some(env));
        assert_eq!(Envelope::from_row(&[1.0; 8]), None);
    }

    #[test]
    fn valid_sample_passes() {
        sample().validate().unwrap();
    }

    #[test]
    fn power_ordering_enforced() {
        let env = Envelope {
            p_min_wo_dh: 120e6,
            ..sample()
        };
        let err = env.validate().unwrap_err();
        assert_eq!(err.field, "P_max_woDH");
    }

    #[test]
    fn shares_and_efficiencies_bounded() {
        let env = Envelope {
            h_l_fg_share_max: 1.2,
            ..sample()
        };
        assert_eq!(env.validate().unwrap_err().field, "H_L_FG_share_max");

        let env = Envelope {
            eta_el_max: 0.0,
            ..sample()
        };
        assert_eq!(env.validate().unwrap_err().field, "eta_el_max");
    }

    #[test]
    fn nan_is_never_valid() {
        let env = Envelope {
            beta: f64::NAN,
            ..sample()
        };
        let err = env.validate().unwrap_err();
        assert_eq!(err.constraint, "finite");
        assert_eq!(err.field, "beta");
    }
}
