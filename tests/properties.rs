//! Property-based tests for the kinematics and the Wiebe burn law.

use lmb_cycle_simulator::engine::geometry::{cylinder_volume, piston_displacement};
use lmb_cycle_simulator::{EngineGeometry, WiebeFunction};
use proptest::prelude::*;

// ── Kinematics ───────────────────────────────────────────────────────

proptest! {
    /// The piston sits at top dead centre at 0° and 360°.
    #[test]
    fn displacement_is_zero_at_tdc(
        crank_radius in 0.01f64..0.1,
        rod_ratio in 0.1f64..0.45,
    ) {
        for tdc in [0.0, 360.0, 720.0] {
            let disp = piston_displacement(tdc, crank_radius, rod_ratio).unwrap();
            prop_assert!(disp.abs() < 1e-12, "disp({}) = {}", tdc, disp);
        }
    }

    /// Displacement repeats every crank revolution.
    #[test]
    fn displacement_is_periodic(
        angle in 0.0f64..360.0,
        crank_radius in 0.01f64..0.1,
        rod_ratio in 0.1f64..0.45,
    ) {
        let d0 = piston_displacement(angle, crank_radius, rod_ratio).unwrap();
        let d1 = piston_displacement(angle + 360.0, crank_radius, rod_ratio).unwrap();
        prop_assert!((d0 - d1).abs() < 1e-12);
        prop_assert!(d0 >= -1e-12 && d0 <= 2.0 * crank_radius + 1e-12);
    }

    /// Volume never drops below the clearance volume and grows with displacement.
    #[test]
    fn volume_is_bounded_and_monotone(
        a in 0.0f64..0.2,
        b in 0.0f64..0.2,
        clearance in 1e-6f64..1e-4,
        bore in 0.03f64..0.15,
    ) {
        let area = std::f64::consts::PI * bore * bore / 4.0;
        let va = cylinder_volume(a, clearance, area);
        let vb = cylinder_volume(b, clearance, area);
        prop_assert!(va >= clearance);
        if a <= b {
            prop_assert!(va <= vb);
        } else {
            prop_assert!(va >= vb);
        }
    }

    /// Geometry built from valid primaries gives a volume inside [Vc, Vc + swept].
    #[test]
    fn geometry_volume_within_limits(angle in 180.0f64..540.0) {
        let geo = EngineGeometry::new(0.1832, 0.04315, 0.07, 32.64e-6).unwrap();
        let vol = geo.volume(angle).unwrap();
        prop_assert!(vol >= geo.clearance_volume() - 1e-15);
        prop_assert!(vol <= geo.total_volume() + 1e-15);
    }
}

// ── Wiebe burn law ───────────────────────────────────────────────────

proptest! {
    /// Nothing burns at the ignition point.
    #[test]
    fn wiebe_starts_at_zero(m in 0.5f64..4.0, duration in 10.0f64..80.0) {
        let wiebe = WiebeFunction::from_duration(m, duration, -(0.9f64).ln(), -(0.1f64).ln());
        prop_assert_eq!(wiebe.burned_mass_frac(0.0), 0.0);
    }

    /// The burned fraction never decreases with elapsed crank angle.
    #[test]
    fn wiebe_is_monotone(
        m in 0.5f64..4.0,
        duration in 10.0f64..80.0,
        x in 0.0f64..200.0,
        dx in 0.0f64..50.0,
    ) {
        let wiebe = WiebeFunction::from_duration(m, duration, -(0.9f64).ln(), -(0.1f64).ln());
        let lo = wiebe.burned_mass_frac(x);
        let hi = wiebe.burned_mass_frac(x + dx);
        prop_assert!(hi >= lo);
        prop_assert!((0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi));
    }

    /// Combustion is complete well after the calibrated duration.
    #[test]
    fn wiebe_tends_to_one(m in 0.5f64..4.0, duration in 10.0f64..80.0) {
        let wiebe = WiebeFunction::from_duration(m, duration, -(0.9f64).ln(), -(0.1f64).ln());
        prop_assert!(wiebe.burned_mass_frac(10.0 * duration) > 1.0 - 1e-9);
    }

    /// The 10 %–90 % burn takes the calibrated duration.
    #[test]
    fn wiebe_duration_is_recovered(m in 0.5f64..4.0, duration in 10.0f64..80.0) {
        let wiebe = WiebeFunction::from_duration(m, duration, -(0.9f64).ln(), -(0.1f64).ln());
        let span = wiebe.elapsed_at(0.9) - wiebe.elapsed_at(0.1);
        prop_assert!((span - duration).abs() < 1e-9 * duration);
    }
}
