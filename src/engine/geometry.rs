use crate::core::error::{ensure_positive, SimError, SimResult};
use std::f64::consts::PI;

/// Piston displacement from top-dead-center [m] at crank angle `angle` [CA deg].
///
/// `rod_ratio` is crank radius over connecting-rod length. Angles where
/// `rod_ratio²·sin²(angle) > 1` cannot be reached by the mechanism and yield
/// `SimError::InvalidGeometry`.
pub fn piston_displacement(angle: f64, crank_radius: f64, rod_ratio: f64) -> SimResult<f64> {
    let theta = angle.to_radians();
    let sin = theta.sin();
    let radicand = 1.0 - rod_ratio * rod_ratio * sin * sin;
    if !(radicand >= 0.0) {
        return Err(SimError::InvalidGeometry {
            angle,
            ratio: rod_ratio,
        });
    }
    let inv_ratio = 1.0 / rod_ratio;
    Ok(crank_radius * (1.0 + inv_ratio - theta.cos() - inv_ratio * radicand.sqrt()))
}

/// Instantaneous cylinder volume [m³] for a given piston displacement.
pub fn cylinder_volume(displacement: f64, clearance_volume: f64, piston_area: f64) -> f64 {
    clearance_volume + piston_area * displacement
}

/// Fixed cylinder geometry. All derived fields are computed once in `new`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineGeometry {
    conrod: f64,           // [m]
    crank_radius: f64,     // [m]
    bore: f64,             // [m]
    clearance_volume: f64, // [m³]
    clearance_height: f64, // [m]
    piston_area: f64,      // [m²]
    rod_ratio: f64,        // [-] crank radius / conrod
    max_displacement: f64, // [m] - stroke
    total_volume: f64,     // [m³] - clearance + swept volume
    clearance_area: f64,   // [m²]
}

impl EngineGeometry {
    /// Creates an `EngineGeometry`. Inputs must be in SI units.
    ///
    /// The clearance height is the calibrated value `Vc / (π·D/2)²` that feeds the wall area of
    /// the heat-transfer model. It is not the flat-head height `Vc / A_p`; use
    /// `with_clearance_height` to set that or any measured value.
    pub fn new(
        conrod: f64,
        crank_radius: f64,
        bore: f64,
        clearance_volume: f64,
    ) -> SimResult<EngineGeometry> {
        ensure_positive("connecting rod length", conrod)?;
        ensure_positive("crank radius", crank_radius)?;
        ensure_positive("piston diameter", bore)?;
        ensure_positive("clearance volume", clearance_volume)?;

        let piston_area = 0.25 * PI * bore * bore;
        let clearance_height = clearance_volume / (PI * bore / 2.0).powi(2);
        let max_displacement = 2.0 * crank_radius;
        Ok(EngineGeometry {
            conrod,
            crank_radius,
            bore,
            clearance_volume,
            clearance_height,
            piston_area,
            rod_ratio: crank_radius / conrod,
            max_displacement,
            total_volume: clearance_volume + max_displacement * piston_area,
            clearance_area: clearance_volume / clearance_height,
        })
    }

    /// Replaces the clearance height [m] used for the combustion-chamber wall area.
    pub fn with_clearance_height(self, clearance_height: f64) -> SimResult<EngineGeometry> {
        ensure_positive("clearance height", clearance_height)?;
        Ok(EngineGeometry {
            clearance_height,
            clearance_area: self.clearance_volume / clearance_height,
            ..self
        })
    }

    /// Piston displacement from TDC at `angle` [CA deg].
    pub fn displacement(&self, angle: f64) -> SimResult<f64> {
        piston_displacement(angle, self.crank_radius, self.rod_ratio)
    }

    /// Cylinder volume at `angle` [CA deg].
    pub fn volume(&self, angle: f64) -> SimResult<f64> {
        Ok(self.volume_at(self.displacement(angle)?))
    }

    pub fn volume_at(&self, displacement: f64) -> f64 {
        cylinder_volume(displacement, self.clearance_volume, self.piston_area)
    }

    pub fn conrod(&self) -> f64 {
        self.conrod
    }
    pub fn crank_radius(&self) -> f64 {
        self.crank_radius
    }
    pub fn bore(&self) -> f64 {
        self.bore
    }
    pub fn clearance_volume(&self) -> f64 {
        self.clearance_volume
    }
    pub fn clearance_height(&self) -> f64 {
        self.clearance_height
    }
    pub fn piston_area(&self) -> f64 {
        self.piston_area
    }
    pub fn rod_ratio(&self) -> f64 {
        self.rod_ratio
    }
    pub fn stroke(&self) -> f64 {
        self.max_displacement
    }
    pub fn total_volume(&self) -> f64 {
        self.total_volume
    }
    pub fn clearance_area(&self) -> f64 {
        self.clearance_area
    }
    pub fn swept_volume(&self) -> f64 {
        self.max_displacement * self.piston_area
    }
    pub fn compression_ratio(&self) -> f64 {
        self.total_volume / self.clearance_volume
    }
}

impl std::fmt::Display for EngineGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bore: {:.1} [mm] \t stroke: {:.1} [mm] \t conrod: {:.1} [mm]
        displacement: {:.1} [cm³] \t clearance: {:.2} [cm³] \t compression ratio: {:.2}",
            self.bore * 1e3,
            self.max_displacement * 1e3,
            self.conrod * 1e3,
            self.swept_volume() * 1e6,
            self.clearance_volume * 1e6,
            self.compression_ratio(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn reference() -> EngineGeometry {
        EngineGeometry::new(183.2e-3, 43.15e-3, 70e-3, 32.64e-6).unwrap()
    }

    #[test]
    fn derived_fields() {
        let geo = reference();
        assert_relative_eq!(geo.piston_area(), 3.848451e-3, max_relative = 1e-6);
        assert_relative_eq!(geo.stroke(), 86.3e-3, epsilon = 1e-12);
        assert_relative_eq!(geo.rod_ratio(), 43.15 / 183.2, epsilon = 1e-12);
        assert_relative_eq!(geo.clearance_height(), 2.699692599253799e-3, max_relative = 1e-12);
        assert_relative_eq!(
            geo.clearance_area(),
            (PI * 0.07 / 2.0).powi(2),
            max_relative = 1e-12
        );
        assert_relative_eq!(geo.compression_ratio(), 11.175, epsilon = 1e-3);
    }

    #[test]
    fn clearance_height_override() {
        let geo = reference();
        let flat = geo.clone().with_clearance_height(geo.clearance_volume() / geo.piston_area()).unwrap();
        assert_relative_eq!(flat.clearance_area(), geo.piston_area(), max_relative = 1e-12);
        // kinematics are untouched
        assert_eq!(flat.total_volume(), geo.total_volume());
        assert_eq!(flat.volume(90.0).unwrap(), geo.volume(90.0).unwrap());
        assert!(geo.with_clearance_height(0.0).is_err());
    }

    #[test]
    fn volume_limits() {
        let geo = reference();
        assert_relative_eq!(geo.volume(0.0).unwrap(), geo.clearance_volume(), epsilon = 1e-15);
        assert_relative_eq!(geo.volume(180.0).unwrap(), geo.total_volume(), max_relative = 1e-12);
        assert_relative_eq!(geo.volume(360.0).unwrap(), geo.clearance_volume(), max_relative = 1e-9);
    }

    #[test]
    fn bottom_dead_center_is_full_stroke() {
        let disp = piston_displacement(180.0, 0.04315, 0.04315 / 0.1832).unwrap();
        assert_relative_eq!(disp, 2.0 * 0.04315, epsilon = 1e-12);
    }

    #[test]
    fn unreachable_angle_is_invalid_geometry() {
        // conrod shorter than crank radius
        let err = piston_displacement(90.0, 0.05, 1.2).unwrap_err();
        assert!(matches!(err, SimError::InvalidGeometry { .. }));
        assert!(piston_displacement(0.0, 0.05, 1.2).is_ok());
    }

    #[test]
    fn rejects_non_positive_lengths() {
        assert!(EngineGeometry::new(0.0, 0.04, 0.07, 30e-6).is_err());
        assert!(EngineGeometry::new(0.18, -0.04, 0.07, 30e-6).is_err());
        assert!(EngineGeometry::new(0.18, 0.04, 0.07, 0.0).is_err());
    }
}
