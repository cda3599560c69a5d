/*!
 * Simulation Builder
 * Builder pattern for Simulation construction
 */

use super::config::SimConfig;
use super::engine::Simulation;
use crate::core::errors::ConfigResult;
use crate::core::types::{MemoryUnits, Seconds};

/// Builder for Simulation
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    config: SimConfig,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration; later `with_*` calls still apply
    pub fn with_config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cores(mut self, cores: usize) -> Self {
        self.config.cores = cores;
        self
    }

    pub fn with_memory_capacity(mut self, capacity: MemoryUnits) -> Self {
        self.config.memory_capacity = capacity;
        self
    }

    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    pub fn with_consumers(mut self, consumers: usize) -> Self {
        self.config.consumers = consumers;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn with_settle_delay(mut self, secs: Seconds) -> Self {
        self.config.settle_delay_secs = secs;
        self
    }

    /// Only processes added through `spawn_process` enter the queue
    pub fn without_spawning(mut self) -> Self {
        self.config.spawn.enabled = false;
        self
    }

    /// Validate the configuration and assemble the simulation
    pub fn build(self) -> ConfigResult<Simulation> {
        Simulation::new(self.config)
    }
}
