//! # Example of the single-cylinder reference engine at 2000 RPM
//!
//! ## The engine.json file
//!
//! Lengths are given in millimetres, the clearance volume in cm³ and the fuel mass in mg per
//! cycle. Everything below `operating_point.fuel` is optional.
//!
//! ```text
//! {
//!     "name": "cyl_1",
//!     "engine": {
//!         "conrod": 183.2,
//!         "crank_radius": 43.15,
//!         "bore": 70.0,
//!         "clearance_volume": 32.64
//!     },
//!     "operating_point": {
//!         "speed": 2000.0,
//!         "spark_advance": 10.0,
//!         "fuel_mass": 40.03,
//!         "air_fuel_ratio": 7.8,
//!         "intake_pressure": 90700.0,
//!         "intake_temperature": 292.0,
//!         "fuel": "E22",
//!         "lhv": 24.65e6,
//!         "gas_constant": 287.0,
//!         "wiebe_exponent": 2.6,
//!         "burned_start": 0.1,
//!         "burned_end": 0.9
//!     },
//!     "calibration": {
//!         "model": "polynomial",
//!         "order": 1,
//!         "speeds": [1500.0, 2000.0, 2500.0],
//!         "durations": [15.4, 16.1, 17.9]
//!     },
//!     "simulation": {
//!         "crank_step": 0.5,
//!         "ivc": 180.0,
//!         "evo": 540.0,
//!         "num_cycles": 1
//!     }
//! }
//! ```
//!
//! `fuel` is either `"E22"` or `"E100"`; it selects the lower heating value, the stoichiometric
//! air-fuel ratio and, when `speeds`/`durations` are left out, the combustion-duration curve.
//! `lhv` and `stoich_air_fuel_ratio` override the preset values.
//! `engine.clearance_height` [mm] replaces the calibrated clearance height `Vc / (π·D/2)²` that
//! sets the combustion-chamber wall area, e.g. with the flat-head value `Vc / A_p`.
//! `model` is either `"polynomial"` (least-squares fit of degree `order`) or
//! `"piecewise_linear"`.
//!
//! ## Running it
//!
//! ```no_run
//! use lmb_cycle_simulator as lmb;
//!
//! fn main() -> Result<(), lmb::SimError> {
//!     let config = lmb::SimulationConfig::from_file("engine.json")?;
//!     let mut builder = lmb::SimulationBuilder::from_config(&config)?;
//!     builder.set_name("E22 @ 2000 RPM");
//!     let simulation = builder.build_system()?;
//!     println!("{}", simulation);
//!
//!     // Motored cycle of the same engine
//!     let mut motored = lmb::SimulationBuilder::from_config(&config)?;
//!     motored.set_combustion_model(Box::new(lmb::NoCombustion::new()));
//!     let motored = motored.build_system()?;
//!
//!     simulation.run_cycle()?.write_to_file("fired.txt")?;
//!     motored.run_cycle()?.write_to_file("motored.txt")?;
//!     Ok(())
//! }
//! ```
