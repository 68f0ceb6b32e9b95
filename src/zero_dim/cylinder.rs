use crate::core::error::{ensure_positive, SimError, SimResult};
use crate::core::trace::{CrankSample, Trace};
use crate::engine::calibration::DurationMap;
use crate::engine::geometry::EngineGeometry;
use crate::engine::operating_point::OperatingPoint;
use crate::reaction::combustion::{Combustion, CombustionSetup, WiebeFunction};
use crate::reaction::heat_transfer::HeatTransfer;
use crate::reaction::mixture::Mixture;
use crate::zero_dim::integrator::{self, EnergyBalance};
use ansi_term::Style;
use tracing::{debug, info};

/// Crank-angle range of the closed cycle and the fixed integration step, all in CA deg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrankWindow {
    step: f64,
    ivc: f64, // intake valve closing
    evo: f64, // exhaust valve opening
}

impl CrankWindow {
    pub fn new(step: f64, ivc: f64, evo: f64) -> SimResult<CrankWindow> {
        ensure_positive("crank step", step)?;
        if !ivc.is_finite() || !evo.is_finite() || evo <= ivc {
            return Err(SimError::Config(format!(
                "exhaust valve opening ({}) must come after intake valve closing ({})",
                evo, ivc
            )));
        }
        if step > evo - ivc {
            return Err(SimError::Config(format!(
                "crank step {} is larger than the closed cycle ({} CA deg)",
                step,
                evo - ivc
            )));
        }
        Ok(CrankWindow { step, ivc, evo })
    }

    pub fn step(&self) -> f64 {
        self.step
    }
    pub fn ivc(&self) -> f64 {
        self.ivc
    }
    pub fn evo(&self) -> f64 {
        self.evo
    }

    /// Number of steps from `ivc` up to and including `evo` when it falls on the grid.
    pub fn num_steps(&self) -> usize {
        ((self.evo - self.ivc) / self.step + 1e-9).floor() as usize
    }

    /// `ivc + step, ivc + 2·step, …`. Angles are computed from the step index so that
    /// rounding does not accumulate.
    pub fn angles(&self) -> impl Iterator<Item = f64> {
        let window = *self;
        (1..=window.num_steps()).map(move |k| window.ivc + k as f64 * window.step)
    }
}

impl Default for CrankWindow {
    fn default() -> Self {
        CrankWindow {
            step: 0.5,
            ivc: 180.0,
            evo: 540.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Initializing,
    Stepping,
    Complete,
}

/// Quantities computed once at the start of every cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleConstants {
    pub comb_duration: f64,     // [CA deg]
    pub mean_piston_speed: f64, // [m/s]
    pub wall_temperature: f64,  // [K]
    pub form_factor: f64,       // Wiebe `a`
}

/// Mutable state of one simulated cycle. Owned by `Cylinder::run_cycle` and dropped with it.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleState {
    phase: CyclePhase,
    crank_angle: f64,        // [CA deg]
    pressure: f64,           // [Pa]
    volume_prev: f64,        // [m³]
    mixture_temp: f64,       // [K]
    heat_release_prev: f64,  // [J]
    unburned_mass_prev: f64, // [kg]
    burned_mass_delta: f64,  // [kg]
    burned_fraction: f64,    // [-]
    constants: CycleConstants,
}

impl CycleState {
    pub fn phase(&self) -> CyclePhase {
        self.phase
    }
    pub fn crank_angle(&self) -> f64 {
        self.crank_angle
    }
    pub fn pressure(&self) -> f64 {
        self.pressure
    }
    pub fn mixture_temperature(&self) -> f64 {
        self.mixture_temp
    }
    pub fn heat_release(&self) -> f64 {
        self.heat_release_prev
    }
    pub fn burned_mass_delta(&self) -> f64 {
        self.burned_mass_delta
    }
    pub fn burned_fraction(&self) -> f64 {
        self.burned_fraction
    }
    pub fn constants(&self) -> &CycleConstants {
        &self.constants
    }
}

/// Single cylinder simulated over its closed high-pressure phase.
pub struct Cylinder {
    name: String,
    geometry: EngineGeometry,
    operating_point: OperatingPoint,
    window: CrankWindow,
    duration_map: Box<dyn DurationMap>,
    combustion: Box<dyn Combustion>,
    heat_transfer: HeatTransfer,
    mixture: Mixture,
}

impl Cylinder {
    pub fn new(
        name: String,
        geometry: EngineGeometry,
        operating_point: OperatingPoint,
        window: CrankWindow,
        duration_map: Box<dyn DurationMap>,
        combustion: Box<dyn Combustion>,
    ) -> Cylinder {
        let heat_transfer = HeatTransfer::new(
            operating_point.speed(),
            geometry.crank_radius(),
            geometry.bore(),
            operating_point.air_excess_factor(),
        );
        let mixture = Mixture::new(
            operating_point.gas_constant(),
            operating_point.intake_pressure(),
            operating_point.intake_temperature(),
            geometry.total_volume(),
        );
        Cylinder {
            name,
            geometry,
            operating_point,
            window,
            duration_map,
            combustion,
            heat_transfer,
            mixture,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn geometry(&self) -> &EngineGeometry {
        &self.geometry
    }
    pub fn operating_point(&self) -> &OperatingPoint {
        &self.operating_point
    }
    pub fn window(&self) -> &CrankWindow {
        &self.window
    }
    pub fn combustion_model(&self) -> &str {
        self.combustion.model_name()
    }

    pub fn set_combustion_model(&mut self, comb: Box<dyn Combustion>) {
        self.combustion = comb;
    }

    pub fn set_duration_map(&mut self, map: Box<dyn DurationMap>) {
        self.duration_map = map;
    }

    /// Simulates one closed cycle from IVC to EVO and returns its pressure trace.
    ///
    /// Every call starts from the intake state with its own `CycleState` and its own copy of
    /// the combustion model; nothing is carried over from previous cycles.
    pub fn run_cycle(&self) -> SimResult<Trace> {
        let mut combustion = self.combustion.clone();
        let mut state = self.initialize(&mut *combustion)?;

        state.phase = CyclePhase::Stepping;
        let mut trace = Trace::with_capacity(self.window.num_steps());
        for angle in self.window.angles() {
            let sample = self.step(&mut state, &mut *combustion, angle)?;
            trace.push(sample);
        }
        state.phase = CyclePhase::Complete;

        if let Some((angle, press)) = trace.peak_pressure() {
            info!(
                "{}: cycle complete, {} samples, peak {:.3} bar at {:.1} CA deg",
                self.name,
                trace.len(),
                press / 1e5,
                angle
            );
        }
        Ok(trace)
    }

    /// Computes the per-cycle constants and seeds the state at IVC. Geometry and calibration
    /// problems surface here, before any step is taken.
    fn initialize(&self, combustion: &mut dyn Combustion) -> SimResult<CycleState> {
        let volume_ivc = self.geometry.volume(self.window.ivc())?;
        for angle in self.window.angles() {
            self.geometry.displacement(angle)?;
        }

        let op = &self.operating_point;
        let comb_duration = self.duration_map.combustion_duration(op.speed())?;
        if !(comb_duration > 0.0) || !comb_duration.is_finite() {
            return Err(SimError::Calibration(format!(
                "{} map gives a combustion duration of {} CA deg at {} RPM",
                self.duration_map.model_name(),
                comb_duration,
                op.speed()
            )));
        }
        let wiebe = WiebeFunction::from_duration(
            op.wiebe_exponent(),
            comb_duration,
            op.burned_start_const(),
            op.burned_end_const(),
        );
        combustion.begin_cycle(&CombustionSetup {
            ignition_angle: op.ignition_angle(),
            wiebe,
        });

        let constants = CycleConstants {
            comb_duration,
            mean_piston_speed: self.heat_transfer.mean_piston_speed(),
            wall_temperature: self.heat_transfer.wall_temperature(),
            form_factor: wiebe.a(),
        };
        debug!(
            "{}: combustion duration {:.3} CA deg, mean piston speed {:.3} m/s, wall temperature {:.1} K, form factor {:.4e}",
            self.name,
            constants.comb_duration,
            constants.mean_piston_speed,
            constants.wall_temperature,
            constants.form_factor
        );

        Ok(CycleState {
            phase: CyclePhase::Initializing,
            crank_angle: self.window.ivc(),
            pressure: op.intake_pressure(),
            volume_prev: volume_ivc,
            mixture_temp: self
                .mixture
                .temperature(op.intake_pressure(), self.geometry.total_volume()),
            heat_release_prev: 0.0,
            unburned_mass_prev: op.fuel_mass(),
            burned_mass_delta: 0.0,
            burned_fraction: 0.0,
            constants,
        })
    }

    /// Advances `state` to `angle`: kinematics, combustion, wall heat, then pressure.
    fn step(
        &self,
        state: &mut CycleState,
        combustion: &mut dyn Combustion,
        angle: f64,
    ) -> SimResult<CrankSample> {
        let op = &self.operating_point;

        // Kinematics
        let piston_disp = self.geometry.displacement(angle)?;
        let vol = integrator::ensure_physical(angle, "volume", self.geometry.volume_at(piston_disp))?;
        let vol_delta = vol - state.volume_prev;

        // cv lags one step behind the mixture temperature
        let cv = self.mixture.cv(state.mixture_temp);
        let temp = integrator::ensure_physical(
            angle,
            "temperature",
            self.mixture.temperature(state.pressure, vol),
        )?;

        // Combustion
        let burned_fraction = combustion.burned_fraction(angle);
        let heat_release = op.max_heat_release() * burned_fraction;
        let unburned_mass = op.fuel_mass() * (1.0 - burned_fraction);
        let burned_mass_delta = unburned_mass - state.unburned_mass_prev;
        let heat_release_delta = heat_release - state.heat_release_prev;

        // Heat transfer
        let wall_heat = self.heat_transfer.wall_loss(
            vol,
            state.pressure,
            temp,
            piston_disp,
            self.geometry.clearance_height(),
        );

        // Pressure
        let terms = EnergyBalance {
            heat_release_delta,
            wall_heat,
            burned_mass_delta,
            volume: vol,
            volume_delta: vol_delta,
            pressure: state.pressure,
            cv,
        };
        let press = integrator::euler_step(self.mixture.R(), &terms, angle)?;

        state.crank_angle = angle;
        state.pressure = press;
        state.volume_prev = vol;
        state.mixture_temp = temp;
        state.heat_release_prev = heat_release;
        state.unburned_mass_prev = unburned_mass;
        state.burned_mass_delta = burned_mass_delta;
        state.burned_fraction = burned_fraction;

        Ok(CrankSample {
            angle,
            pressure: press,
            volume: vol,
            temperature: temp,
            burned_fraction,
        })
    }
}

impl std::fmt::Display for Cylinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = &self.operating_point;
        write!(
            f,
            "{}:
        combustion: `{}`
        {}
        {}
        speed: {:.0} [RPM] \t spark advance: {:.1} [CA deg] \t fuel mass: {:.2} [mg]
        intake: {:.0} [Pa] \t {:.1} [K] \t air-fuel ratio: {:.2}
        {}
        IVC: {:.1} [CA deg] \t EVO: {:.1} [CA deg] \t step: {} [CA deg]",
            Style::new().bold().paint(&self.name),
            self.combustion.model_name(),
            self.geometry,
            Style::new().underline().paint("  Operating point  "),
            op.speed(),
            op.spark_advance(),
            op.fuel_mass() * 1e6,
            op.intake_pressure(),
            op.intake_temperature(),
            op.air_fuel_ratio(),
            Style::new().underline().paint("    Crank window    "),
            self.window.ivc(),
            self.window.evo(),
            self.window.step(),
        )
    }
}
