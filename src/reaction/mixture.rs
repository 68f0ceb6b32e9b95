#![allow(non_snake_case)]

/// Lumped in-cylinder charge, referenced to intake conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mixture {
    gas_const: f64,          // [J/(kg.K)]
    intake_pressure: f64,    // [Pa]
    intake_temperature: f64, // [K]
    reference_volume: f64,   // [m³] - total cylinder volume
}

impl Mixture {
    pub fn new(gas_const: f64, intake_pressure: f64, intake_temperature: f64, reference_volume: f64) -> Mixture {
        Mixture {
            gas_const,
            intake_pressure,
            intake_temperature,
            reference_volume,
        }
    }

    pub fn R(&self) -> f64 {
        self.gas_const
    }

    /// Ideal-gas temperature of the trapped charge at `press` [Pa] and `vol` [m³].
    pub fn temperature(&self, press: f64, vol: f64) -> f64 {
        press * vol * self.intake_temperature / (self.reference_volume * self.intake_pressure)
    }

    /// Specific heat at constant volume [J/(kg.K)]
    pub fn cv(&self, temp: f64) -> f64 {
        700.0 + 0.255 * temp
    }

    /// Polytropic exponent `1 + R/cv`
    pub fn k(&self, temp: f64) -> f64 {
        1.0 + self.gas_const / self.cv(temp)
    }
}
