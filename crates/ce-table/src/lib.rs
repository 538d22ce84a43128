//! Boundary-condition interpolation of envelopes.
//!
//! Sparse, sampled envelopes become a dense [`EnvelopeTable`] over an integer
//! domain. Each envelope field is interpolated on its own.

pub mod error;
pub mod spline;
pub mod table;

pub use error::{TableError, TableResult};
pub use spline::{CubicSpline, InterpolationKind};
pub use table::{BoundaryDomain, EnvelopeTable, InterpolationSettings, RowOrigin, SampleTable, TableRow};
