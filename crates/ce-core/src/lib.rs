//! ce-core: numeric foundation for chp-envelope.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - regression (ordinary least squares line fits)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod regression;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use regression::{LinearFit, fit_line};
pub use units::*;
