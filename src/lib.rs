//! # lmb_cycle_simulator
//!
//! The `lmb_cycle_simulator` crate computes the in-cylinder pressure of a single engine cylinder
//! during its closed high-pressure phase, from intake valve closing to exhaust valve opening.
//!
//! Each crank step couples piston kinematics, a Wiebe combustion law, Woschni wall heat
//! transfer and a first-order energy balance integrated with explicit Euler steps.
//! The combustion duration comes from a calibration curve over engine speed.
//!
//! ```no_run
//! use lmb_cycle_simulator as lmb;
//!
//! let config = lmb::SimulationConfig::reference();
//! let simulation = lmb::SimulationBuilder::from_config(&config)?.build_system()?;
//! let trace = simulation.run_cycle()?;
//! if let Some((angle, pressure)) = trace.peak_pressure() {
//!     println!("peak of {:.2} bar at {} CA deg", pressure / 1e5, angle);
//! }
//! # Ok::<(), lmb::SimError>(())
//! ```
//!
//! See [`doc::reference_engine`] for the input file format.

mod core;
pub mod doc;
pub mod engine;
pub mod numerics;
pub mod reaction;
pub mod zero_dim;

// Re-exporting
pub use crate::core::error::{SimError, SimResult};
pub use crate::core::system::Simulation;
pub use crate::core::system_builder::SimulationBuilder;
pub use crate::core::trace::{CrankSample, Trace};
pub use crate::core::traits::SaveData;
pub use crate::engine::calibration::{CalibrationTable, DurationMap, PiecewiseLinearMap, PolynomialMap};
pub use crate::engine::geometry::EngineGeometry;
pub use crate::engine::json_reader::SimulationConfig;
pub use crate::engine::operating_point::{Fuel, OperatingPoint};
pub use crate::reaction::combustion::{Combustion, NoCombustion, WiebeCombustion, WiebeFunction};
pub use crate::zero_dim::cylinder::{CrankWindow, Cylinder};
