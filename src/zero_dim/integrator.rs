//! First-order energy balance of the closed cylinder, integrated with explicit Euler steps
//! in the crank-angle domain.

use crate::core::error::{SimError, SimResult};

/// Energy exchanged during one crank step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBalance {
    pub heat_release_delta: f64, // [J] released by combustion
    pub wall_heat: f64,          // [J] lost to the walls
    pub burned_mass_delta: f64,  // [kg] change of unburned fuel mass (negative while burning)
    pub volume: f64,             // [m³]
    pub volume_delta: f64,       // [m³]
    pub pressure: f64,           // [Pa] at the start of the step
    pub cv: f64,                 // [J/(kg.K)]
}

/// `Δp = R/(cv·V)·[ΔQ - Q_wall + Δm - (1 + cv/R)·p·ΔV]`
pub fn pressure_delta(gas_const: f64, terms: &EnergyBalance) -> f64 {
    gas_const / (terms.cv * terms.volume)
        * (terms.heat_release_delta - terms.wall_heat + terms.burned_mass_delta
            - (1.0 + terms.cv / gas_const) * terms.pressure * terms.volume_delta)
}

/// Forward-Euler pressure update. The new pressure must stay finite and positive.
pub fn euler_step(gas_const: f64, terms: &EnergyBalance, angle: f64) -> SimResult<f64> {
    let press = terms.pressure + pressure_delta(gas_const, terms);
    ensure_physical(angle, "pressure", press)
}

/// Passes `value` through if it is finite and strictly positive.
pub fn ensure_physical(angle: f64, quantity: &'static str, value: f64) -> SimResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimError::NonPhysicalState {
            angle,
            quantity,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn adiabatic(volume_delta: f64) -> EnergyBalance {
        EnergyBalance {
            heat_release_delta: 0.0,
            wall_heat: 0.0,
            burned_mass_delta: 0.0,
            volume: 3e-4,
            volume_delta,
            pressure: 1e5,
            cv: 717.5,
        }
    }

    #[test]
    fn constant_volume_without_heat_keeps_pressure() {
        assert_eq!(pressure_delta(287.0, &adiabatic(0.0)), 0.0);
    }

    #[test]
    fn compression_follows_isentropic_slope() {
        // dp = -k·p·dV/V for an adiabatic step
        let terms = adiabatic(-1e-7);
        let k = 1.0 + 287.0 / terms.cv;
        let expected = -k * terms.pressure * terms.volume_delta / terms.volume;
        assert_relative_eq!(pressure_delta(287.0, &terms), expected, max_relative = 1e-12);
    }

    #[test]
    fn heat_release_raises_pressure() {
        let mut terms = adiabatic(0.0);
        terms.heat_release_delta = 10.0;
        // dp = R/(cv·V)·Q
        assert_relative_eq!(
            pressure_delta(287.0, &terms),
            287.0 / (717.5 * 3e-4) * 10.0,
            max_relative = 1e-12
        );
        terms.wall_heat = 10.0;
        assert_eq!(pressure_delta(287.0, &terms), 0.0);
    }

    #[test]
    fn negative_pressure_is_non_physical() {
        let mut terms = adiabatic(0.0);
        terms.wall_heat = 1e6;
        let err = euler_step(287.0, &terms, 362.5).unwrap_err();
        match err {
            SimError::NonPhysicalState { angle, quantity, value } => {
                assert_eq!(angle, 362.5);
                assert_eq!(quantity, "pressure");
                assert!(value < 0.0);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
