use crate::core::error::{SimError, SimResult};
use crate::engine::calibration::{CalibrationTable, DurationMap, PiecewiseLinearMap, PolynomialMap};
use crate::engine::geometry::EngineGeometry;
use crate::engine::operating_point::{Fuel, OperatingPoint};
use crate::zero_dim::cylinder::CrankWindow;
use serde::{Deserialize, Serialize};

/// Complete simulation input as read from a `.json` file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_name")]
    pub name: String,
    pub engine: JsonEngine,
    pub operating_point: JsonOperatingPoint,
    #[serde(default)]
    pub calibration: JsonCalibration,
    #[serde(default)]
    pub simulation: JsonSimulation,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonEngine {
    pub conrod: f64,           // [mm]
    pub crank_radius: f64,     // [mm]
    pub bore: f64,             // [mm]
    pub clearance_volume: f64, // [cm³]
    /// Overrides the calibrated clearance height used for the wall area [mm]
    pub clearance_height: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonOperatingPoint {
    pub speed: f64,              // [RPM]
    pub spark_advance: f64,      // [CA deg]
    pub fuel_mass: f64,          // [mg/cycle]
    pub air_fuel_ratio: f64,
    pub intake_pressure: f64,    // [Pa]
    pub intake_temperature: f64, // [K]
    #[serde(default = "default_fuel")]
    pub fuel: Fuel,
    /// Overrides the preset lower heating value [J/kg]
    pub lhv: Option<f64>,
    /// Overrides the preset stoichiometric air-fuel ratio
    pub stoich_air_fuel_ratio: Option<f64>,
    #[serde(default = "default_gas_constant")]
    pub gas_constant: f64,
    #[serde(default = "default_wiebe_exponent")]
    pub wiebe_exponent: f64,
    #[serde(default = "default_burned_start")]
    pub burned_start: f64,
    #[serde(default = "default_burned_end")]
    pub burned_end: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationModel {
    Polynomial,
    PiecewiseLinear,
}

/// Combustion-duration calibration. Without `speeds`/`durations` the fuel preset curve is used.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonCalibration {
    #[serde(default = "default_calibration_model")]
    pub model: CalibrationModel,
    #[serde(default = "default_order")]
    pub order: usize,
    pub speeds: Option<Vec<f64>>,    // [RPM]
    pub durations: Option<Vec<f64>>, // [CA deg]
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JsonSimulation {
    #[serde(default = "default_crank_step")]
    pub crank_step: f64, // [CA deg]
    #[serde(default = "default_ivc")]
    pub ivc: f64, // [CA deg]
    #[serde(default = "default_evo")]
    pub evo: f64, // [CA deg]
    #[serde(default = "default_cycles")]
    pub num_cycles: usize,
}

fn default_name() -> String {
    "cyl_1".to_string()
}
fn default_fuel() -> Fuel {
    Fuel::E22
}
fn default_gas_constant() -> f64 {
    287.0
}
fn default_wiebe_exponent() -> f64 {
    2.6
}
fn default_burned_start() -> f64 {
    0.1
}
fn default_burned_end() -> f64 {
    0.9
}
fn default_calibration_model() -> CalibrationModel {
    CalibrationModel::Polynomial
}
fn default_order() -> usize {
    1
}
fn default_crank_step() -> f64 {
    0.5
}
fn default_ivc() -> f64 {
    180.0
}
fn default_evo() -> f64 {
    540.0
}
fn default_cycles() -> usize {
    1
}

impl Default for JsonCalibration {
    fn default() -> Self {
        JsonCalibration {
            model: default_calibration_model(),
            order: default_order(),
            speeds: None,
            durations: None,
        }
    }
}

impl Default for JsonSimulation {
    fn default() -> Self {
        JsonSimulation {
            crank_step: default_crank_step(),
            ivc: default_ivc(),
            evo: default_evo(),
            num_cycles: default_cycles(),
        }
    }
}

impl SimulationConfig {
    pub fn from_file(file_name: &str) -> SimResult<SimulationConfig> {
        let json_file = std::fs::read_to_string(file_name)?;
        SimulationConfig::from_json(&json_file)
    }

    pub fn from_json(text: &str) -> SimResult<SimulationConfig> {
        let data: SimulationConfig = serde_json::from_str(text)?;
        Ok(data)
    }

    /// The single-cylinder reference engine at 2000 RPM, 10° spark advance: E22 combustion-duration
    /// curve and stoichiometric ratio with a lower heating value of 24.65 MJ/kg.
    pub fn reference() -> SimulationConfig {
        SimulationConfig {
            name: default_name(),
            engine: JsonEngine {
                conrod: 183.2,
                crank_radius: 43.15,
                bore: 70.0,
                clearance_volume: 32.64,
                clearance_height: None,
            },
            operating_point: JsonOperatingPoint {
                speed: 2000.0,
                spark_advance: 10.0,
                fuel_mass: 40.03,
                air_fuel_ratio: 7.8,
                intake_pressure: 90700.0,
                intake_temperature: 292.0,
                fuel: Fuel::E22,
                lhv: Some(24.65e6),
                stoich_air_fuel_ratio: None,
                gas_constant: default_gas_constant(),
                wiebe_exponent: default_wiebe_exponent(),
                burned_start: default_burned_start(),
                burned_end: default_burned_end(),
            },
            calibration: JsonCalibration::default(),
            simulation: JsonSimulation::default(),
        }
    }

    /// Geometry in SI units.
    pub fn geometry(&self) -> SimResult<EngineGeometry> {
        let e = &self.engine;
        let geometry = EngineGeometry::new(
            e.conrod * 1e-3,
            e.crank_radius * 1e-3,
            e.bore * 1e-3,
            e.clearance_volume * 1e-6,
        )?;
        match e.clearance_height {
            Some(height) => geometry.with_clearance_height(height * 1e-3),
            None => Ok(geometry),
        }
    }

    pub fn operating_point(&self) -> SimResult<OperatingPoint> {
        let o = &self.operating_point;
        let op = OperatingPoint::new(
            o.speed,
            o.spark_advance,
            o.fuel_mass * 1e-6,
            o.air_fuel_ratio,
            o.intake_pressure,
            o.intake_temperature,
        )?
        .with_fuel(o.fuel);
        let op = op.with_fuel_properties(
            o.lhv.unwrap_or(o.fuel.lower_heating_value()),
            o.stoich_air_fuel_ratio.unwrap_or(o.fuel.stoich_air_fuel_ratio()),
        )?;
        op.with_gas_constant(o.gas_constant)?
            .with_wiebe_exponent(o.wiebe_exponent)?
            .with_burned_thresholds(o.burned_start, o.burned_end)
    }

    pub fn calibration_table(&self) -> SimResult<CalibrationTable> {
        match (&self.calibration.speeds, &self.calibration.durations) {
            (Some(speeds), Some(durations)) => CalibrationTable::new(speeds.clone(), durations.clone()),
            (None, None) => Ok(self.operating_point.fuel.combustion_duration_table()),
            _ => Err(SimError::Config(
                "calibration needs both `speeds` and `durations`, or neither".to_string(),
            )),
        }
    }

    pub fn duration_map(&self) -> SimResult<Box<dyn DurationMap>> {
        let table = self.calibration_table()?;
        let map: Box<dyn DurationMap> = match self.calibration.model {
            CalibrationModel::Polynomial => Box::new(PolynomialMap::new(table, self.calibration.order)?),
            CalibrationModel::PiecewiseLinear => Box::new(PiecewiseLinearMap::new(table)?),
        };
        Ok(map)
    }

    pub fn crank_window(&self) -> SimResult<CrankWindow> {
        let s = &self.simulation;
        CrankWindow::new(s.crank_step, s.ivc, s.evo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MINIMAL: &str = r#"{
        "engine": { "conrod": 183.2, "crank_radius": 43.15, "bore": 70.0, "clearance_volume": 32.64 },
        "operating_point": {
            "speed": 2000.0, "spark_advance": 10.0, "fuel_mass": 40.03,
            "air_fuel_ratio": 7.8, "intake_pressure": 90700.0, "intake_temperature": 292.0,
            "lhv": 24.65e6
        }
    }"#;

    #[test]
    fn minimal_file_takes_defaults() {
        let config = SimulationConfig::from_json(MINIMAL).unwrap();
        assert_eq!(config, SimulationConfig::reference());
    }

    #[test]
    fn converts_to_si_units() {
        let config = SimulationConfig::reference();
        let geo = config.geometry().unwrap();
        assert_relative_eq!(geo.crank_radius(), 0.04315, epsilon = 1e-15);
        assert_relative_eq!(geo.clearance_volume(), 32.64e-6, epsilon = 1e-18);
        let op = config.operating_point().unwrap();
        assert_relative_eq!(op.fuel_mass(), 40.03e-6, epsilon = 1e-18);
        assert_eq!(op.lower_heating_value(), 24.65e6);
        assert_eq!(op.stoich_air_fuel_ratio(), 13.2);
    }

    #[test]
    fn clearance_height_override_is_in_millimetres() {
        let mut config = SimulationConfig::reference();
        let calibrated = config.geometry().unwrap();
        assert_relative_eq!(calibrated.clearance_height(), 2.699692599253799e-3, max_relative = 1e-12);

        config.engine.clearance_height = Some(8.48);
        let geo = config.geometry().unwrap();
        assert_relative_eq!(geo.clearance_height(), 8.48e-3, max_relative = 1e-12);
        assert_eq!(geo.total_volume(), calibrated.total_volume());

        config.engine.clearance_height = Some(-1.0);
        assert!(matches!(config.geometry().unwrap_err(), SimError::Config(_)));
    }

    #[test]
    fn explicit_fuel_properties_override_preset() {
        let mut config = SimulationConfig::reference();
        config.operating_point.fuel = Fuel::E100;
        config.operating_point.lhv = Some(26.0e6);
        let op = config.operating_point().unwrap();
        assert_eq!(op.lower_heating_value(), 26.0e6);
        assert_eq!(op.stoich_air_fuel_ratio(), 8.5);
    }

    #[test]
    fn custom_calibration_table() {
        let text = MINIMAL.replacen(
            "\"engine\"",
            "\"calibration\": { \"model\": \"piecewise_linear\", \"speeds\": [1000, 3000], \"durations\": [10, 30] }, \"engine\"",
            1,
        );
        let config = SimulationConfig::from_json(&text).unwrap();
        let map = config.duration_map().unwrap();
        assert_eq!(map.model_name(), "piecewise linear");
        assert_relative_eq!(map.combustion_duration(2000.0).unwrap(), 20.0, epsilon = 1e-12);
    }

    #[test]
    fn half_specified_calibration_is_an_error() {
        let mut config = SimulationConfig::reference();
        config.calibration.speeds = Some(vec![1000.0, 2000.0]);
        assert!(matches!(config.duration_map().err().unwrap(), SimError::Config(_)));
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            SimulationConfig::from_json("{ \"engine\": 3 }").unwrap_err(),
            SimError::Json(_)
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/engine.json").unwrap_err(),
            SimError::Io(_)
        ));
    }
}
