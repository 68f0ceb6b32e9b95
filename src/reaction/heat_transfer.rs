use std::f64::consts::PI;

/// Woschni-type convective heat loss to the cylinder walls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatTransfer {
    mean_piston_speed: f64, // [m/s]
    wall_temperature: f64,  // [K] - cycle-averaged
    sec_to_deg: f64,        // [s/CA deg]
}

impl HeatTransfer {
    /// `speed` in RPM, `crank_radius` and `bore` in meters.
    pub fn new(speed: f64, crank_radius: f64, bore: f64, air_excess_factor: f64) -> HeatTransfer {
        HeatTransfer {
            mean_piston_speed: mean_piston_speed(crank_radius, speed),
            wall_temperature: mean_wall_temperature(air_excess_factor, speed, bore),
            sec_to_deg: 1.0 / (360.0 * speed / 60.0),
        }
    }

    pub fn mean_piston_speed(&self) -> f64 {
        self.mean_piston_speed
    }

    pub fn wall_temperature(&self) -> f64 {
        self.wall_temperature
    }

    /// Convective coefficient [W/(m².K)]; `vol` [m³], `press` [Pa], `temp` [K].
    pub fn coefficient(&self, vol: f64, press: f64, temp: f64) -> f64 {
        130.0
            * vol.powf(-0.06)
            * (press * 1e-5).powf(0.8)
            * temp.powf(-0.4)
            * (self.mean_piston_speed + 1.4).powf(0.8)
    }

    /// Heat lost to the walls during one crank degree [J/CA deg]. Negative when the gas is
    /// colder than the walls.
    pub fn wall_loss(&self, vol: f64, press: f64, temp: f64, piston_disp: f64, clearance_height: f64) -> f64 {
        let area = chamber_area(piston_disp, clearance_height);
        self.sec_to_deg * self.coefficient(vol, press, temp) * area * (temp - self.wall_temperature)
    }
}

/// `4·R·N/60` [m/s]
pub fn mean_piston_speed(crank_radius: f64, speed: f64) -> f64 {
    4.0 * crank_radius * speed / 60.0
}

/// `360 + 9·λ^0.4·sqrt(N·bore)` [K]
pub fn mean_wall_temperature(air_excess_factor: f64, speed: f64, bore: f64) -> f64 {
    360.0 + 9.0 * air_excess_factor.powf(0.4) * (speed * bore).sqrt()
}

/// Flat-head approximation of the exposed chamber surface.
pub fn chamber_area(piston_disp: f64, clearance_height: f64) -> f64 {
    2.0 * PI * (piston_disp + clearance_height)
}
