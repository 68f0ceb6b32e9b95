//! Combustion, wall heat transfer and working-gas properties
pub mod combustion;
pub mod heat_transfer;
pub mod mixture;
