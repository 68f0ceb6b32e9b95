//! Simulation assembly, results and the crate-wide error type
pub mod error;
pub mod system;
pub mod system_builder;
pub mod trace;
pub mod traits;
