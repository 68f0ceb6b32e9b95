//! Zero-dimensional cylinder model and its pressure integrator
pub mod cylinder;
pub mod integrator;
