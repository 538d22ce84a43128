//! Shared application service layer for CHP envelope and heat pump
//! characterization.
//!
//! Frontends go through this crate for project handling, characterization
//! runs with caching, interpolation and resampling.

pub mod characterize;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod project_service;
pub mod runtime;

pub use characterize::{
    CharacterizeOptions, CharacterizeRequest, CharacterizeResponse, UnitCharacterization,
    characterize_unit, ensure_characterization, ensure_characterization_with_progress,
    ensure_heat_pump_characterization, ensure_heat_pump_characterization_with_progress,
};
pub use error::{AppError, AppResult};
pub use pipeline::{
    ResampleRequest, ResampleResponse, UnitSeries, interpolate_heat_pump, interpolate_unit, load_heat_pump_table,
    load_table, resample_project,
};
pub use progress::{ProgressEvent, RunStage};
pub use project_service::{
    HeatPumpSummary, UnitSummary, get_heat_pump, get_unit, list_heat_pumps, list_units, load_project, save_project,
    validate_project,
};
pub use runtime::{BoundarySweep, HeatPumpRuntime, UnitDefinition, UnitModel, UnitRuntime};
