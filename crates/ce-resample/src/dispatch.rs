//! Per-unit parameter records in the shape a linear dispatch model expects.

use crate::error::{ResampleError, ResampleResult};
use crate::series::ParameterTimeseries;
use ce_envelope::{Envelope, EnvelopeField, HeatPumpParameters};
use serde::{Deserialize, Serialize};

/// Turbine configuration of a plant unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    /// Extraction-condensing steam turbine.
    #[default]
    ExtractionTurbine,
    /// Back-pressure turbine: heat and power are rigidly coupled.
    BackPressureTurbine,
    /// Reciprocating engine with flue gas heat recovery.
    Engine,
}

impl UnitKind {
    pub fn is_back_pressure(self) -> bool {
        matches!(self, Self::BackPressureTurbine)
    }
}

/// A parameter that is either fixed or given per timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Constant(f64),
    Series(Vec<f64>),
}

impl ParameterValue {
    pub fn at(&self, t: usize) -> Option<f64> {
        match self {
            Self::Constant(v) => Some(*v),
            Self::Series(values) => values.get(t).copied(),
        }
    }

    /// Values over `horizon` timesteps.
    pub fn expand(&self, horizon: usize) -> Vec<f64> {
        match self {
            Self::Constant(v) => vec![*v; horizon],
            Self::Series(values) => values.clone(),
        }
    }

    fn check(&self, parameter: &'static str, horizon: usize) -> ResampleResult<()> {
        match self {
            Self::Series(values) if values.len() != horizon => Err(ResampleError::HorizonMismatch {
                parameter,
                expected: horizon,
                got: values.len(),
            }),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchParameters {
    /// Unit label; prefixes exported column names.
    pub unit: String,
    pub kind: UnitKind,
    #[serde(rename = "Q_in")]
    pub q_in: ParameterValue,
    #[serde(rename = "P_max_woDH")]
    pub p_max_wo_dh: ParameterValue,
    #[serde(rename = "P_min_woDH")]
    pub p_min_wo_dh: ParameterValue,
    #[serde(rename = "Eta_el_max_woDH")]
    pub eta_el_max_wo_dh: ParameterValue,
    #[serde(rename = "Eta_el_min_woDH")]
    pub eta_el_min_wo_dh: ParameterValue,
    #[serde(rename = "H_L_FG_share_max")]
    pub h_l_fg_share_max: ParameterValue,
    #[serde(rename = "H_L_FG_share_min", default, skip_serializing_if = "Option::is_none")]
    pub h_l_fg_share_min: Option<ParameterValue>,
    #[serde(rename = "Q_CW_min")]
    pub q_cw_min: ParameterValue,
    #[serde(rename = "Beta")]
    pub beta: ParameterValue,
}

impl DispatchParameters {
    /// Time-invariant record from a single envelope.
    pub fn constant(unit: impl Into<String>, kind: UnitKind, envelope: &Envelope) -> Self {
        Self::build(unit.into(), kind, |field| ParameterValue::Constant(field.get(envelope)))
    }

    /// Per-timestep record from a resampled series.
    pub fn from_timeseries(unit: impl Into<String>, kind: UnitKind, series: &ParameterTimeseries) -> Self {
        Self::build(unit.into(), kind, |field| ParameterValue::Series(series.column(field).to_vec()))
    }

    fn build(unit: String, kind: UnitKind, value: impl Fn(EnvelopeField) -> ParameterValue) -> Self {
        Self {
            unit,
            kind,
            q_in: value(EnvelopeField::QIn),
            p_max_wo_dh: value(EnvelopeField::PMaxWoDh),
            p_min_wo_dh: value(EnvelopeField::PMinWoDh),
            eta_el_max_wo_dh: value(EnvelopeField::EtaElMax),
            eta_el_min_wo_dh: value(EnvelopeField::EtaElMin),
            h_l_fg_share_max: value(EnvelopeField::HLFgShareMax),
            h_l_fg_share_min: (!kind.is_back_pressure()).then(|| value(EnvelopeField::HLFgShareMin)),
            q_cw_min: value(EnvelopeField::QCwMin),
            beta: value(EnvelopeField::Beta),
        }
    }

    fn named(&self) -> Vec<(&'static str, &ParameterValue)> {
        let mut named = vec![
            ("Q_in", &self.q_in),
            ("P_max_woDH", &self.p_max_wo_dh),
            ("P_min_woDH", &self.p_min_wo_dh),
            ("Eta_el_max_woDH", &self.eta_el_max_wo_dh),
            ("Eta_el_min_woDH", &self.eta_el_min_wo_dh),
            ("H_L_FG_share_max", &self.h_l_fg_share_max),
        ];
        if let Some(share_min) = &self.h_l_fg_share_min {
            named.push(("H_L_FG_share_min", share_min));
        }
        named.push(("Q_CW_min", &self.q_cw_min));
        named.push(("Beta", &self.beta));
        named
    }

    /// Check every series against the optimization horizon and the
    /// `H_L_FG_share_min` presence against the unit kind.
    pub fn validate(&self, horizon: usize) -> ResampleResult<()> {
        match (&self.h_l_fg_share_min, self.kind.is_back_pressure()) {
            (Some(_), true) => return Err(ResampleError::ShareMin("is not defined")),
            (None, false) => return Err(ResampleError::ShareMin("is required")),
            _ => {}
        }
        for (name, value) in self.named() {
            value.check(name, horizon)?;
        }
        Ok(())
    }

    /// Column name and values per parameter, names prefixed with the unit.
    pub fn columns(&self, horizon: usize) -> Vec<(String, Vec<f64>)> {
        self.named()
            .into_iter()
            .map(|(name, value)| (format!("{}_{}", self.unit, name), value.expand(horizon)))
            .collect()
    }
}

/// Heat pump record: `Q = c_1 * P + c_0` for `P_min <= P <= P_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatPumpDispatch {
    pub unit: String,
    #[serde(rename = "P_max")]
    pub p_max: ParameterValue,
    #[serde(rename = "P_min")]
    pub p_min: ParameterValue,
    #[serde(rename = "c_1")]
    pub c_1: ParameterValue,
    #[serde(rename = "c_0")]
    pub c_0: ParameterValue,
    #[serde(rename = "COP")]
    pub cop: ParameterValue,
}

impl HeatPumpDispatch {
    pub fn constant(unit: impl Into<String>, params: &HeatPumpParameters) -> Self {
        Self::build(unit.into(), |field| ParameterValue::Constant(field(params)))
    }

    pub fn from_timeseries(unit: impl Into<String>, series: &ParameterTimeseries<HeatPumpParameters>) -> Self {
        let rows: Vec<HeatPumpParameters> = (0..series.len()).filter_map(|t| series.envelope_at(t)).collect();
        Self::build(unit.into(), |field| ParameterValue::Series(rows.iter().map(field).collect()))
    }

    fn build(unit: String, value: impl Fn(fn(&HeatPumpParameters) -> f64) -> ParameterValue) -> Self {
        Self {
            unit,
            p_max: value(|p| p.p_max),
            p_min: value(|p| p.p_min),
            c_1: value(|p| p.c_1),
            c_0: value(|p| p.c_0),
            cop: value(|p| p.cop),
        }
    }

    fn named(&self) -> [(&'static str, &ParameterValue); 5] {
        [
            ("P_max", &self.p_max),
            ("P_min", &self.p_min),
            ("c_1", &self.c_1),
            ("c_0", &self.c_0),
            ("COP", &self.cop),
        ]
    }

    pub fn validate(&self, horizon: usize) -> ResampleResult<()> {
        for (name, value) in self.named() {
            value.check(name, horizon)?;
        }
        Ok(())
    }

    pub fn columns(&self, horizon: usize) -> Vec<(String, Vec<f64>)> {
        self.named()
            .into_iter()
            .map(|(name, value)| (format!("{}_{}", self.unit, name), value.expand(horizon)))
            .collect()
    }
}

/// Dispatch record of any characterized unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitDispatch {
    Chp(DispatchParameters),
    HeatPump(HeatPumpDispatch),
}

impl UnitDispatch {
    pub fn unit(&self) -> &str {
        match self {
            Self::Chp(p) => &p.unit,
            Self::HeatPump(p) => &p.unit,
        }
    }

    pub fn validate(&self, horizon: usize) -> ResampleResult<()> {
        match self {
            Self::Chp(p) => p.validate(horizon),
            Self::HeatPump(p) => p.validate(horizon),
        }
    }

    pub fn columns(&self, horizon: usize) -> Vec<(String, Vec<f64>)> {
        match self {
            Self::Chp(p) => p.columns(horizon),
            Self::HeatPump(p) => p.columns(horizon),
        }
    }
}
