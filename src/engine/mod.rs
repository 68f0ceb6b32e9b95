//! Engine description: geometry, operating point, calibration and JSON input
pub mod calibration;
pub mod geometry;
pub mod json_reader;
pub mod operating_point;
