//! Timeseries resampling and dispatch parameter records.

pub mod dispatch;
pub mod error;
pub mod series;

pub use dispatch::{DispatchParameters, HeatPumpDispatch, ParameterValue, UnitDispatch, UnitKind};
pub use error::{ResampleError, ResampleResult};
pub use series::{KeyRounding, ParameterTimeseries, resample};
