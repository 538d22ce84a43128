use crate::error::{ResampleError, ResampleResult};
use ce_envelope::{Envelope, EnvelopeField, ParameterSet};
use ce_table::{EnvelopeTable, RowOrigin};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::debug;

/// How a real boundary value maps to a table key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyRounding {
    /// Toward zero, as an integer conversion does.
    #[default]
    Truncate,
    /// To the nearest integer, halves away from zero.
    Round,
}

impl KeyRounding {
    pub fn key(self, value: f64) -> Option<i32> {
        if !value.is_finite() {
            return None;
        }
        let k = match self {
            Self::Truncate => value.trunc(),
            Self::Round => value.round(),
        };
        if k < i32::MIN as f64 || k > i32::MAX as f64 {
            return None;
        }
        Some(k as i32)
    }
}

/// Parameter fields materialized per timestep, stored column-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterTimeseries<P = Envelope> {
    keys: Vec<i32>,
    origins: Vec<RowOrigin>,
    /// One column per field, in [`ParameterSet::FIELDS`] order.
    columns: Vec<Vec<f64>>,
    params: PhantomData<P>,
}

impl<P: ParameterSet> ParameterTimeseries<P> {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Table key looked up at each timestep.
    pub fn keys(&self) -> &[i32] {
        &self.keys
    }

    pub fn origins(&self) -> &[RowOrigin] {
        &self.origins
    }

    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        let index = P::FIELDS.iter().position(|&f| f == name)?;
        Some(&self.columns[index])
    }

    pub fn envelope_at(&self, t: usize) -> Option<P> {
        if t >= self.len() {
            return None;
        }
        let row: Vec<f64> = self.columns.iter().map(|c| c[t]).collect();
        P::from_row(&row)
    }
}

impl ParameterTimeseries<Envelope> {
    pub fn column(&self, field: EnvelopeField) -> &[f64] {
        &self.columns[field.index()]
    }
}

/// Look up every timestep of `series` in `table`.
///
/// No interpolation happens here; a value whose key has no row fails with
/// the offending timestep index.
pub fn resample<P: ParameterSet>(
    table: &EnvelopeTable<P>,
    series: &[f64],
    rounding: KeyRounding,
) -> ResampleResult<ParameterTimeseries<P>> {
    let mut keys = Vec::with_capacity(series.len());
    let mut origins = Vec::with_capacity(series.len());
    let mut columns = vec![Vec::with_capacity(series.len()); P::FIELDS.len()];

    for (index, &value) in series.iter().enumerate() {
        let row = rounding
            .key(value)
            .and_then(|key| table.get(key).map(|row| (key, row)));
        let Some((key, row)) = row else {
            return Err(ResampleError::TableDomain { index, value });
        };
        keys.push(key);
        origins.push(row.origin);
        for (column, v) in columns.iter_mut().zip(row.envelope.to_row()) {
            column.push(v);
        }
    }

    debug!(steps = keys.len(), "series resampled");
    Ok(ParameterTimeseries {
        keys,
        origins,
        columns,
        params: PhantomData,
    })
}
