//! Corner sweep driver.
//!
//! Drives one plant simulator through a fixed, ordered setpoint protocol at a
//! single boundary condition and collects the converged results into a
//! [`CornerSet`]:
//!
//! 1. nameplate load, heat duty rising to full duty (top-right corner)
//! 2. full duty, load falling to the minimum load (bottom-right corner)
//! 3. minimum load, heat duty falling back to the lowest duty
//! 4. lowest duty, load rising back to nameplate
//!
//! The zero-heat corners are never simulated. They are recovered later by
//! regression over the heat sweeps of phases 1 and 3.
//!
//! Heat pumps follow a single-phase protocol instead, see [`sweep_heat_pump`].

pub mod corners;
pub mod driver;
pub mod error;
pub mod exclusion;
pub mod heat_pump;
pub mod levels;
pub mod plan;

pub use corners::{CornerSet, Regime, SweepPhase, SweepStep};
pub use driver::sweep_corners;
pub use error::{SweepError, SweepResult};
pub use exclusion::{ExcludedBoundaryCondition, ExclusionReason, ExclusionSet};
pub use heat_pump::{HeatPumpPlan, HeatPumpSweep, HighBoundaryLimits, sweep_heat_pump};
pub use levels::{LevelSweep, Spacing};
pub use plan::SweepPlan;
