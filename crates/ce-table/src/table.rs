use crate::error::{TableError, TableResult};
use crate::spline::{CubicSpline, InterpolationKind};
use ce_envelope::{Envelope, ParameterSet};
use ce_sweep::ExclusionSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use tracing::{debug, warn};

/// Sparse sampled parameter rows keyed by boundary value.
///
/// Keys are unique and never contain an excluded value.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable<P = Envelope> {
    samples: BTreeMap<i32, P>,
}

impl<P> Default for SampleTable<P> {
    fn default() -> Self {
        Self {
            samples: BTreeMap::new(),
        }
    }
}

impl<P: ParameterSet> SampleTable<P> {
    /// Collect samples, dropping excluded keys. A repeated key is an error.
    pub fn from_samples(samples: impl IntoIterator<Item = (i32, P)>, exclusions: &ExclusionSet) -> TableResult<Self> {
        let mut table = BTreeMap::new();
        for (key, params) in samples {
            if let Err(excluded) = exclusions.check(key) {
                warn!(%excluded, "dropping sample");
                continue;
            }
            match table.entry(key) {
                Entry::Occupied(_) => return Err(TableError::DuplicateBoundaryKey { key }),
                Entry::Vacant(slot) => {
                    slot.insert(params);
                }
            }
        }
        Ok(Self { samples: table })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, key: i32) -> Option<&P> {
        self.samples.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.samples.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &P)> {
        self.samples.iter().map(|(k, v)| (*k, v))
    }

    /// One interpolant per field, in [`ParameterSet::FIELDS`] order.
    fn splines(&self, kind: InterpolationKind) -> TableResult<Vec<CubicSpline>> {
        let x: Vec<f64> = self.samples.keys().map(|&k| k as f64).collect();
        let rows: Vec<Vec<f64>> = self.samples.values().map(ParameterSet::to_row).collect();
        (0..P::FIELDS.len())
            .map(|field| {
                let y: Vec<f64> = rows.iter().map(|row| row[field]).collect();
                CubicSpline::fit(kind, &x, &y)
            })
            .collect()
    }
}

/// Inclusive integer range of boundary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryDomain {
    pub lo: i32,
    pub hi: i32,
}

impl BoundaryDomain {
    pub fn new(lo: i32, hi: i32) -> TableResult<Self> {
        if lo > hi {
            return Err(TableError::InvalidDomain { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.lo..=self.hi).contains(&value)
    }

    pub fn values(&self) -> impl Iterator<Item = i32> {
        self.lo..=self.hi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOrigin {
    Sampled,
    Interpolated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableRow<P = Envelope> {
    pub envelope: P,
    pub origin: RowOrigin,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationSettings {
    pub kind: InterpolationKind,
    /// Fill excluded boundary values inside the domain with interpolated rows.
    /// Off by default: an excluded value never becomes a table key.
    pub fill_excluded: bool,
}

/// Dense parameter rows over a boundary domain.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeTable<P = Envelope> {
    domain: BoundaryDomain,
    rows: BTreeMap<i32, TableRow<P>>,
}

impl<P: ParameterSet> EnvelopeTable<P> {
    /// Interpolate every field over `domain`.
    ///
    /// Sampled keys keep their sampled row verbatim. Every other row is
    /// evaluated from the per-field interpolants. Sampled and interpolated
    /// rows alike must satisfy the parameter invariants.
    pub fn interpolate(
        samples: &SampleTable<P>,
        domain: BoundaryDomain,
        exclusions: &ExclusionSet,
        settings: &InterpolationSettings,
    ) -> TableResult<Self> {
        let splines = samples.splines(settings.kind)?;

        let mut rows = BTreeMap::new();
        for key in domain.values() {
            if exclusions.is_excluded(key) && !settings.fill_excluded {
                debug!(key, "excluded boundary left out of table");
                continue;
            }
            let row = match samples.get(key) {
                Some(params) => TableRow {
                    envelope: *params,
                    origin: RowOrigin::Sampled,
                },
                None => {
                    let values: Vec<f64> = splines.iter().map(|s| s.eval(key as f64)).collect();
                    let params = P::from_row(&values).ok_or(TableError::RowWidth {
                        expected: P::FIELDS.len(),
                        got: values.len(),
                    })?;
                    TableRow {
                        envelope: params,
                        origin: RowOrigin::Interpolated,
                    }
                }
            };
            row.envelope
                .check()
                .map_err(|source| TableError::InvalidRow { key, source })?;
            rows.insert(key, row);
        }

        debug!(
            lo = domain.lo,
            hi = domain.hi,
            sampled = samples.len(),
            rows = rows.len(),
            "envelope table built"
        );
        Ok(Self { domain, rows })
    }

    pub fn domain(&self) -> BoundaryDomain {
        self.domain
    }

    pub fn get(&self, key: i32) -> Option<&TableRow<P>> {
        self.rows.get(&key)
    }

    pub fn envelope(&self, key: i32) -> Option<&P> {
        self.rows.get(&key).map(|row| &row.envelope)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &TableRow<P>)> {
        self.rows.iter().map(|(k, v)| (*k, v))
    }
}
