//! Engine-speed to combustion-duration maps
//!
//! The cycle driver only sees the `DurationMap` trait, so the interpolation scheme can be
//! swapped without touching the integration.

use crate::core::error::{SimError, SimResult};
use crate::numerics::polyfit::{polyfit, Polynomial};
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tabulated `(engine speed [RPM], combustion duration [CA deg])` pairs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CalibrationTable {
    speeds: Vec<f64>,
    durations: Vec<f64>,
}

impl CalibrationTable {
    pub fn new(speeds: Vec<f64>, durations: Vec<f64>) -> SimResult<CalibrationTable> {
        if speeds.len() != durations.len() {
            return Err(SimError::Calibration(format!(
                "{} speeds but {} durations",
                speeds.len(),
                durations.len()
            )));
        }
        if speeds.iter().chain(durations.iter()).any(|v| !v.is_finite()) {
            return Err(SimError::Calibration("calibration points must be finite".to_string()));
        }
        Ok(CalibrationTable { speeds, durations })
    }

    /// Only for tables known to be consistent.
    pub(crate) fn from_parts(speeds: Vec<f64>, durations: Vec<f64>) -> CalibrationTable {
        debug_assert_eq!(speeds.len(), durations.len());
        CalibrationTable { speeds, durations }
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// Lowest and highest calibrated speed.
    pub fn speed_range(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let min = self.speeds.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = self.speeds.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }

    fn check_speed(speed: f64, model: &str) -> SimResult<()> {
        if speed.is_finite() {
            Ok(())
        } else {
            Err(SimError::Calibration(format!(
                "{} map cannot be evaluated at engine speed {}",
                model, speed
            )))
        }
    }

    fn warn_if_outside(&self, speed: f64, model: &str) {
        if let Some((min, max)) = self.speed_range() {
            if speed < min || speed > max {
                warn!(
                    "{}: engine speed {} RPM is outside the calibrated range [{}, {}], extrapolating",
                    model, speed, min, max
                );
            }
        }
    }
}

/// Maps engine speed [RPM] to combustion duration [CA deg].
pub trait DurationMap: DynClone + Send + Sync {
    fn model_name(&self) -> &str;
    fn combustion_duration(&self, speed: f64) -> SimResult<f64>;
}

dyn_clone::clone_trait_object!(DurationMap);

/// Least-squares polynomial through the calibration table.
#[derive(Debug, Clone)]
pub struct PolynomialMap {
    table: CalibrationTable,
    polynomial: Polynomial,
}

impl PolynomialMap {
    /// Fits the table with a polynomial of degree `order`.
    /// Fails with `InsufficientCalibrationData` when the table has fewer than `order + 1` points.
    pub fn new(table: CalibrationTable, order: usize) -> SimResult<PolynomialMap> {
        let polynomial = polyfit(table.speeds(), table.durations(), order)?;
        Ok(PolynomialMap { table, polynomial })
    }

    pub fn order(&self) -> usize {
        self.polynomial.order()
    }

    pub fn table(&self) -> &CalibrationTable {
        &self.table
    }
}

impl DurationMap for PolynomialMap {
    fn model_name(&self) -> &str {
        "polynomial"
    }
    fn combustion_duration(&self, speed: f64) -> SimResult<f64> {
        CalibrationTable::check_speed(speed, self.model_name())?;
        self.table.warn_if_outside(speed, self.model_name());
        Ok(self.polynomial.eval(speed))
    }
}

/// Linear interpolation between neighbouring table points, held constant past the ends.
#[derive(Debug, Clone)]
pub struct PiecewiseLinearMap {
    table: CalibrationTable,
}

impl PiecewiseLinearMap {
    pub fn new(table: CalibrationTable) -> SimResult<PiecewiseLinearMap> {
        if table.len() < 2 {
            return Err(SimError::InsufficientCalibrationData {
                points: table.len(),
                required: 2,
            });
        }
        if table.speeds.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SimError::Calibration(
                "speeds must be strictly increasing for piecewise-linear interpolation".to_string(),
            ));
        }
        Ok(PiecewiseLinearMap { table })
    }
}

impl DurationMap for PiecewiseLinearMap {
    fn model_name(&self) -> &str {
        "piecewise linear"
    }
    fn combustion_duration(&self, speed: f64) -> SimResult<f64> {
        CalibrationTable::check_speed(speed, self.model_name())?;
        let speeds = self.table.speeds();
        let durations = self.table.durations();
        let last = speeds.len() - 1;
        if speed <= speeds[0] {
            self.table.warn_if_outside(speed, self.model_name());
            return Ok(durations[0]);
        }
        if speed >= speeds[last] {
            self.table.warn_if_outside(speed, self.model_name());
            return Ok(durations[last]);
        }
        // first index whose speed exceeds the query
        let upper = speeds.partition_point(|s| *s <= speed);
        let lower = upper - 1;
        let frac = (speed - speeds[lower]) / (speeds[upper] - speeds[lower]);
        Ok(durations[lower] + frac * (durations[upper] - durations[lower]))
    }
}
