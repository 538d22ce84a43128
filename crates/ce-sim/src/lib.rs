//! Simulation adapter for plant characterization.
//!
//! The detailed plant simulator lives outside this workspace. This crate fixes
//! the contract it is consumed through (`Simulator`), and the adapter that turns
//! its raw, flag-carrying solutions into either a converged [`OperatingPoint`]
//! or a typed [`ConvergenceFailure`].
//!
//! Two reference plants implement the contract so the pipeline can run without
//! the external solver: [`LinearPlant`] and [`ExtractionChpSurrogate`].
//! [`HeatPumpSurrogate`] does the same for heat pumps.

pub mod adapter;
pub mod failure;
pub mod heat_pump;
pub mod point;
pub mod setpoint;
pub mod simulator;
pub mod surrogate;
pub mod synthetic;

pub use adapter::{AdapterStats, SimOutcome, SimulationAdapter, classify};
pub use failure::ConvergenceFailure;
pub use heat_pump::HeatPumpSurrogate;
pub use point::OperatingPoint;
pub use setpoint::Setpoint;
pub use simulator::{RawSolution, Simulator, SimulatorError};
pub use surrogate::ExtractionChpSurrogate;
pub use synthetic::LinearPlant;
