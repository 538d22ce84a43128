//! Envelope extraction.
//!
//! Reduces the corner regimes of one boundary-condition sweep to the linear
//! "Generic CHP" parameter set consumed by dispatch models, and a heat pump
//! load sweep to its linear heat over power line.

pub mod envelope;
pub mod error;
pub mod extract;
pub mod heat_pump;
pub mod params;

pub use envelope::{Envelope, EnvelopeField};
pub use error::{ExtractionError, ExtractionResult};
pub use extract::{LossShareMethod, extract};
pub use heat_pump::{HeatPumpParameters, extract_heat_pump};
pub use params::{InvariantViolation, ParameterSet};
