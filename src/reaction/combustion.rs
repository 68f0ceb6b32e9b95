use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Combustion regime inside one cycle. The transition is one way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CombustionPhase {
    PreIgnition,
    Burning { ignition_angle: f64 },
}

/// Per-cycle inputs handed to a combustion model before the first crank step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombustionSetup {
    pub ignition_angle: f64, // [CA deg]
    pub wiebe: WiebeFunction,
}

pub trait Combustion: DynClone + Send + Sync {
    fn model_name(&self) -> &str;
    /// Rearms the model for a new cycle. Burning history of previous cycles is discarded.
    fn begin_cycle(&mut self, setup: &CombustionSetup);
    /// Returns the cumulative burned fuel fraction at `angle` [CA deg]. Must be called with
    /// increasing angles within a cycle.
    fn burned_fraction(&mut self, angle: f64) -> f64;
    fn phase(&self) -> CombustionPhase;
}

dyn_clone::clone_trait_object!(Combustion);

/// Single-zone Wiebe burn law started by the spark.
#[derive(Debug, Clone)]
pub struct WiebeCombustion {
    model_name: String,
    setup: Option<CombustionSetup>,
    phase: CombustionPhase,
}

impl WiebeCombustion {
    pub fn new() -> WiebeCombustion {
        WiebeCombustion {
            model_name: "Wiebe function".to_string(),
            setup: None,
            phase: CombustionPhase::PreIgnition,
        }
    }
}

impl Default for WiebeCombustion {
    fn default() -> Self {
        WiebeCombustion::new()
    }
}

impl Combustion for WiebeCombustion {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn begin_cycle(&mut self, setup: &CombustionSetup) {
        self.setup = Some(*setup);
        self.phase = CombustionPhase::PreIgnition;
    }

    fn burned_fraction(&mut self, angle: f64) -> f64 {
        let setup = match &self.setup {
            Some(s) => s,
            None => return 0.0,
        };
        if let CombustionPhase::PreIgnition = self.phase {
            if angle >= setup.ignition_angle {
                debug!("spark at {:.2} CA deg, combustion started", angle);
                self.phase = CombustionPhase::Burning {
                    ignition_angle: setup.ignition_angle,
                };
            }
        }
        match self.phase {
            CombustionPhase::PreIgnition => 0.0,
            CombustionPhase::Burning { ignition_angle } => {
                setup.wiebe.burned_mass_frac(angle - ignition_angle)
            }
        }
    }

    fn phase(&self) -> CombustionPhase {
        self.phase
    }
}

/// Motored engine: the charge never ignites.
#[derive(Debug, Clone)]
pub struct NoCombustion {
    model_name: String,
}

impl NoCombustion {
    pub fn new() -> NoCombustion {
        NoCombustion {
            model_name: "no combustion model".to_string(),
        }
    }
}

impl Default for NoCombustion {
    fn default() -> Self {
        NoCombustion::new()
    }
}

impl Combustion for NoCombustion {
    fn model_name(&self) -> &str {
        &self.model_name
    }
    fn begin_cycle(&mut self, _: &CombustionSetup) {}
    fn burned_fraction(&mut self, _: f64) -> f64 {
        0.0
    }
    fn phase(&self) -> CombustionPhase {
        CombustionPhase::PreIgnition
    }
}

/// `x(Δθ) = 1 - exp(-a·Δθ^(m+1))`, with `Δθ` the crank angle elapsed since ignition.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WiebeFunction {
    m: f64, // shape exponent
    a: f64, // form factor [CA deg^-(m+1)]
}

impl WiebeFunction {
    pub fn new(a: f64, m: f64) -> WiebeFunction {
        WiebeFunction { m, a }
    }

    /// Builds the function whose burned fraction goes from `x_start` to `x_end` within
    /// `comb_duration` [CA deg]; `start_const = -ln(1 - x_start)`, `end_const = -ln(1 - x_end)`.
    pub fn from_duration(m: f64, comb_duration: f64, start_const: f64, end_const: f64) -> WiebeFunction {
        WiebeFunction {
            m,
            a: WiebeFunction::form_factor(m, comb_duration, start_const, end_const),
        }
    }

    pub fn form_factor(m: f64, comb_duration: f64, start_const: f64, end_const: f64) -> f64 {
        let inv = 1.0 / (m + 1.0);
        (comb_duration / (end_const.powf(inv) - start_const.powf(inv))).powf(-(m + 1.0))
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn m(&self) -> f64 {
        self.m
    }

    pub fn burned_mass_frac(&self, elapsed: f64) -> f64 {
        if elapsed <= 0.0 {
            return 0.0;
        }
        1.0 - (-self.a * elapsed.powf(self.m + 1.0)).exp()
    }

    /// Crank angle elapsed since ignition at which the burned fraction reaches `x`.
    pub fn elapsed_at(&self, x: f64) -> f64 {
        (-(1.0 - x).ln() / self.a).powf(1.0 / (self.m + 1.0))
    }
}
