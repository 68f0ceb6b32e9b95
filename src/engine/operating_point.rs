use crate::core::error::{ensure_positive, SimError, SimResult};
use crate::engine::calibration::CalibrationTable;
use serde::{Deserialize, Serialize};

/// Engine speeds [RPM] at which the combustion-duration curves of the fuel presets were measured.
pub const CALIBRATION_SPEEDS: [f64; 20] = [
    1500.0, 1750.0, 2000.0, 2250.0, 2500.0, 2750.0, 3000.0, 3250.0, 3500.0, 3750.0, 4000.0,
    4250.0, 4500.0, 4750.0, 5000.0, 5250.0, 5500.0, 5750.0, 6000.0, 6250.0,
];

const E100_DURATION: [f64; 20] = [
    14.315, 14.888, 15.514, 15.929, 17.006, 16.812, 16.52, 18.693, 18.096, 17.447, 18.361,
    18.349, 18.17, 17.988, 18.186, 17.908, 18.168, 18.861, 19.76, 20.953,
];

const E22_DURATION: [f64; 20] = [
    16.016, 16.366, 16.356, 16.838, 17.656, 17.445, 17.633, 18.533, 18.371, 17.848, 19.066,
    19.096, 19.256, 19.023, 19.261, 19.658, 20.383, 21.321, 21.291, 22.778,
];

/// Gasoline/ethanol blends with measured combustion-duration curves.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Fuel {
    /// Gasoline with 22% anhydrous ethanol
    E22,
    /// Hydrated ethanol
    E100,
}

impl Fuel {
    pub fn name(&self) -> &'static str {
        match self {
            Fuel::E22 => "E22",
            Fuel::E100 => "E100",
        }
    }

    /// [J/kg]
    pub fn lower_heating_value(&self) -> f64 {
        match self {
            Fuel::E22 => 38.92e6,
            Fuel::E100 => 24.65e6,
        }
    }

    pub fn stoich_air_fuel_ratio(&self) -> f64 {
        match self {
            Fuel::E22 => 13.2,
            Fuel::E100 => 8.5,
        }
    }

    /// Combustion duration [CA deg] against engine speed [RPM].
    pub fn combustion_duration_table(&self) -> CalibrationTable {
        let durations = match self {
            Fuel::E22 => E22_DURATION,
            Fuel::E100 => E100_DURATION,
        };
        CalibrationTable::from_parts(CALIBRATION_SPEEDS.to_vec(), durations.to_vec())
    }
}

/// Operating conditions held constant during a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatingPoint {
    speed: f64,              // [RPM]
    spark_advance: f64,      // [CA deg] before TDC
    fuel_mass: f64,          // [kg/cycle]
    air_fuel_ratio: f64,     // [-]
    intake_pressure: f64,    // [Pa]
    intake_temperature: f64, // [K]
    lower_heating_value: f64,   // [J/kg]
    stoich_air_fuel_ratio: f64, // [-]
    gas_constant: f64,       // [J/(kg.K)]
    wiebe_exponent: f64,     // [-]
    burned_start: f64,       // [-] burned fraction taken as start of combustion
    burned_end: f64,         // [-] burned fraction taken as end of combustion
}

impl OperatingPoint {
    /// Creates an `OperatingPoint` burning E22 in dry air (R = 287 J/(kg.K)) with a Wiebe
    /// exponent of 2.6 and the 10%-90% burned convention.
    pub fn new(
        speed: f64,
        spark_advance: f64,
        fuel_mass: f64,
        air_fuel_ratio: f64,
        intake_pressure: f64,
        intake_temperature: f64,
    ) -> SimResult<OperatingPoint> {
        ensure_positive("engine speed", speed)?;
        ensure_positive("air-fuel ratio", air_fuel_ratio)?;
        ensure_positive("intake pressure", intake_pressure)?;
        ensure_positive("intake temperature", intake_temperature)?;
        if !spark_advance.is_finite() {
            return Err(SimError::Config(format!(
                "spark advance must be finite, got {}",
                spark_advance
            )));
        }
        if !(fuel_mass >= 0.0) || !fuel_mass.is_finite() {
            return Err(SimError::Config(format!(
                "fuel mass cannot be lower than zero, got {}",
                fuel_mass
            )));
        }
        let fuel = Fuel::E22;
        Ok(OperatingPoint {
            speed,
            spark_advance,
            fuel_mass,
            air_fuel_ratio,
            intake_pressure,
            intake_temperature,
            lower_heating_value: fuel.lower_heating_value(),
            stoich_air_fuel_ratio: fuel.stoich_air_fuel_ratio(),
            gas_constant: 287.0,
            wiebe_exponent: 2.6,
            burned_start: 0.1,
            burned_end: 0.9,
        })
    }

    /// Takes heating value and stoichiometric ratio from a fuel preset.
    pub fn with_fuel(self, fuel: Fuel) -> OperatingPoint {
        OperatingPoint {
            lower_heating_value: fuel.lower_heating_value(),
            stoich_air_fuel_ratio: fuel.stoich_air_fuel_ratio(),
            ..self
        }
    }

    pub fn with_fuel_properties(
        self,
        lower_heating_value: f64,
        stoich_air_fuel_ratio: f64,
    ) -> SimResult<OperatingPoint> {
        if !(lower_heating_value >= 0.0) || !lower_heating_value.is_finite() {
            return Err(SimError::Config(format!(
                "lower heating value cannot be lower than zero, got {}",
                lower_heating_value
            )));
        }
        ensure_positive("stoichiometric air-fuel ratio", stoich_air_fuel_ratio)?;
        Ok(OperatingPoint {
            lower_heating_value,
            stoich_air_fuel_ratio,
            ..self
        })
    }

    pub fn with_gas_constant(self, gas_constant: f64) -> SimResult<OperatingPoint> {
        ensure_positive("gas constant", gas_constant)?;
        Ok(OperatingPoint {
            gas_constant,
            ..self
        })
    }

    pub fn with_wiebe_exponent(self, wiebe_exponent: f64) -> SimResult<OperatingPoint> {
        ensure_positive("Wiebe exponent", wiebe_exponent)?;
        Ok(OperatingPoint {
            wiebe_exponent,
            ..self
        })
    }

    /// Burned fractions that bound the combustion duration, `0 < start < end < 1`.
    pub fn with_burned_thresholds(self, start: f64, end: f64) -> SimResult<OperatingPoint> {
        if !(0.0 < start && start < end && end < 1.0) {
            return Err(SimError::Config(format!(
                "burned fraction thresholds must satisfy 0 < start < end < 1, got {} and {}",
                start, end
            )));
        }
        Ok(OperatingPoint {
            burned_start: start,
            burned_end: end,
            ..self
        })
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }
    pub fn spark_advance(&self) -> f64 {
        self.spark_advance
    }
    pub fn fuel_mass(&self) -> f64 {
        self.fuel_mass
    }
    pub fn air_fuel_ratio(&self) -> f64 {
        self.air_fuel_ratio
    }
    pub fn intake_pressure(&self) -> f64 {
        self.intake_pressure
    }
    pub fn intake_temperature(&self) -> f64 {
        self.intake_temperature
    }
    pub fn lower_heating_value(&self) -> f64 {
        self.lower_heating_value
    }
    pub fn stoich_air_fuel_ratio(&self) -> f64 {
        self.stoich_air_fuel_ratio
    }
    pub fn gas_constant(&self) -> f64 {
        self.gas_constant
    }
    pub fn wiebe_exponent(&self) -> f64 {
        self.wiebe_exponent
    }
    pub fn burned_start(&self) -> f64 {
        self.burned_start
    }
    pub fn burned_end(&self) -> f64 {
        self.burned_end
    }

    /// Crank angle [CA deg] at which the spark fires: TDC minus spark advance.
    pub fn ignition_angle(&self) -> f64 {
        360.0 - self.spark_advance
    }

    /// Heat released by burning the whole charge [J/cycle].
    pub fn max_heat_release(&self) -> f64 {
        self.fuel_mass * self.lower_heating_value
    }

    /// Actual over stoichiometric air mass. Independent of the fuel mass, so a motored
    /// run with zero fuel keeps a finite value.
    pub fn air_excess_factor(&self) -> f64 {
        self.air_fuel_ratio / self.stoich_air_fuel_ratio
    }

    /// `-ln(1 - x_start)`
    pub fn burned_start_const(&self) -> f64 {
        -(1.0 - self.burned_start).ln()
    }

    /// `-ln(1 - x_end)`
    pub fn burned_end_const(&self) -> f64 {
        -(1.0 - self.burned_end).ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> OperatingPoint {
        OperatingPoint::new(2000.0, 10.0, 40.03e-6, 7.8, 90700.0, 292.0).unwrap()
    }

    #[test]
    fn derived_quantities() {
        let op = reference();
        assert_eq!(op.ignition_angle(), 350.0);
        assert_relative_eq!(op.max_heat_release(), 40.03e-6 * 38.92e6, max_relative = 1e-12);
        assert_relative_eq!(op.air_excess_factor(), 7.8 / 13.2, max_relative = 1e-12);
        assert_relative_eq!(op.burned_start_const(), 0.105360516, epsilon = 1e-8);
        assert_relative_eq!(op.burned_end_const(), 2.302585093, epsilon = 1e-8);
    }

    #[test]
    fn fuel_preset_replaces_properties() {
        let op = reference().with_fuel(Fuel::E100);
        assert_eq!(op.lower_heating_value(), 24.65e6);
        assert_eq!(op.stoich_air_fuel_ratio(), 8.5);
        assert_eq!(op.speed(), 2000.0);
    }

    #[test]
    fn zero_fuel_is_allowed() {
        let op = OperatingPoint::new(2000.0, 10.0, 0.0, 7.8, 90700.0, 292.0).unwrap();
        assert_eq!(op.max_heat_release(), 0.0);
        assert!(op.air_excess_factor().is_finite());
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(OperatingPoint::new(0.0, 10.0, 40e-6, 7.8, 90700.0, 292.0).is_err());
        assert!(OperatingPoint::new(2000.0, 10.0, -1e-6, 7.8, 90700.0, 292.0).is_err());
        assert!(OperatingPoint::new(2000.0, f64::NAN, 40e-6, 7.8, 90700.0, 292.0).is_err());
        assert!(reference().with_burned_thresholds(0.9, 0.1).is_err());
        assert!(reference().with_burned_thresholds(0.0, 0.9).is_err());
        assert!(reference().with_wiebe_exponent(0.0).is_err());
        assert!(reference().with_fuel_properties(-1.0, 13.2).is_err());
    }

    #[test]
    fn presets_have_twenty_calibration_points() {
        for fuel in [Fuel::E22, Fuel::E100] {
            assert_eq!(fuel.combustion_duration_table().len(), 20);
        }
    }

    #[test]
    fn fuel_round_trips_through_json_name() {
        let fuel: Fuel = serde_json::from_str("\"E100\"").unwrap();
        assert_eq!(fuel, Fuel::E100);
        assert_eq!(serde_json::to_string(&Fuel::E22).unwrap(), "\"E22\"");
    }
}
