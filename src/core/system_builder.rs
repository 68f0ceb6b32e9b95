use super::system::Simulation;
use crate::core::error::{SimError, SimResult};
use crate::engine::calibration::DurationMap;
use crate::engine::geometry::EngineGeometry;
use crate::engine::json_reader::SimulationConfig;
use crate::engine::operating_point::OperatingPoint;
use crate::reaction::combustion::{Combustion, WiebeCombustion};
use crate::zero_dim::cylinder::{CrankWindow, Cylinder};

pub struct SimulationBuilder {
    name: String,
    geometry: Option<EngineGeometry>,
    operating_point: Option<OperatingPoint>,
    duration_map: Option<Box<dyn DurationMap>>,
    combustion: Box<dyn Combustion>,
    window: CrankWindow,
    num_cycles: usize,
}

impl SimulationBuilder {
    /// Creates a `SimulationBuilder`. Geometry, operating point and a combustion-duration map
    /// are mandatory; the combustion model defaults to `WiebeCombustion`, the crank window to
    /// 180°-540° in 0.5° steps and the run to a single cycle.
    /// Once the building is finished, the simulation is created with `build_system()`.
    pub fn new() -> SimulationBuilder {
        SimulationBuilder {
            name: "cyl_1".to_string(),
            geometry: None,
            operating_point: None,
            duration_map: None,
            combustion: Box::new(WiebeCombustion::new()),
            window: CrankWindow::default(),
            num_cycles: 1,
        }
    }

    /// Fills every field from a parsed configuration file.
    pub fn from_config(config: &SimulationConfig) -> SimResult<SimulationBuilder> {
        let mut builder = SimulationBuilder::new();
        builder
            .set_name(&config.name)
            .add_geometry(config.geometry()?)
            .add_operating_point(config.operating_point()?)
            .add_duration_map(config.duration_map()?)
            .set_crank_window(config.crank_window()?)
            .set_num_cycles(config.simulation.num_cycles);
        Ok(builder)
    }

    pub fn set_name<'a>(&'a mut self, name: &str) -> &'a mut Self {
        self.name = name.to_string();
        self
    }

    pub fn add_geometry<'a>(&'a mut self, geometry: EngineGeometry) -> &'a mut Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn add_operating_point<'a>(&'a mut self, operating_point: OperatingPoint) -> &'a mut Self {
        self.operating_point = Some(operating_point);
        self
    }

    pub fn add_duration_map<'a>(&'a mut self, map: Box<dyn DurationMap>) -> &'a mut Self {
        self.duration_map = Some(map);
        self
    }

    pub fn set_combustion_model<'a>(&'a mut self, comb: Box<dyn Combustion>) -> &'a mut Self {
        self.combustion = comb;
        self
    }

    pub fn set_crank_window<'a>(&'a mut self, window: CrankWindow) -> &'a mut Self {
        self.window = window;
        self
    }

    pub fn set_num_cycles<'a>(&'a mut self, num_cycles: usize) -> &'a mut Self {
        self.num_cycles = num_cycles;
        self
    }

    /// Build a `Simulation`. `SimulationBuilder` object is consumed in the process.
    pub fn build_system(self) -> SimResult<Simulation> {
        let geometry = self
            .geometry
            .ok_or_else(|| SimError::Config("engine geometry was not added".to_string()))?;
        let operating_point = self
            .operating_point
            .ok_or_else(|| SimError::Config("operating point was not added".to_string()))?;
        let duration_map = self.duration_map.ok_or_else(|| {
            SimError::Config("combustion-duration map was not added".to_string())
        })?;
        if self.num_cycles == 0 {
            return Err(SimError::Config("at least one cycle must be simulated".to_string()));
        }
        let cylinder = Cylinder::new(
            self.name,
            geometry,
            operating_point,
            self.window,
            duration_map,
            self.combustion,
        );
        Ok(Simulation::new(cylinder, self.num_cycles))
    }
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        SimulationBuilder::new()
    }
}
