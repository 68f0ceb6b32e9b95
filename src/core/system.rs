use crate::core::error::SimResult;
use crate::core::trace::Trace;
use crate::zero_dim::cylinder::Cylinder;
use tracing::info;

/// A configured cylinder plus the number of closed cycles to simulate.
pub struct Simulation {
    cylinder: Cylinder,
    num_cycles: usize,
}

impl Simulation {
    pub(crate) fn new(cylinder: Cylinder, num_cycles: usize) -> Simulation {
        Simulation {
            cylinder,
            num_cycles,
        }
    }

    pub fn cylinder(&self) -> &Cylinder {
        &self.cylinder
    }

    pub fn cylinder_mut(&mut self) -> &mut Cylinder {
        &mut self.cylinder
    }

    pub fn num_cycles(&self) -> usize {
        self.num_cycles
    }

    /// Runs `num_cycles` independent cycles and returns one trace per cycle.
    ///
    /// Cycles do not exchange any state, so every trace is identical for a given setup.
    pub fn run(&self) -> SimResult<Vec<Trace>> {
        let mut traces = Vec::with_capacity(self.num_cycles);
        for cycle in 0..self.num_cycles {
            info!(
                "{}: starting cycle {}/{}",
                self.cylinder.name(),
                cycle + 1,
                self.num_cycles
            );
            traces.push(self.cylinder.run_cycle()?);
        }
        Ok(traces)
    }

    /// Runs a single cycle.
    pub fn run_cycle(&self) -> SimResult<Trace> {
        self.cylinder.run_cycle()
    }
}

impl std::fmt::Display for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n        cycles: {}", self.cylinder, self.num_cycles)
    }
}
