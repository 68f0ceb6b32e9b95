//! Worked examples
pub mod reference_engine;
