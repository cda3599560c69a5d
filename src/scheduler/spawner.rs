/*!
 * Process Spawner
 * Randomized process generation with tiered memory requirements
 */

use super::types::{SecondsRange, SpawnConfig};
use crate::core::types::{MemoryUnits, Seconds};
use crate::process::ProcessSpec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Memory tier: cumulative probability threshold and inclusive size range
type MemoryTier = (f64, MemoryUnits, MemoryUnits);

/// Standard processes mostly need little memory
const STANDARD_MEMORY_TIERS: [MemoryTier; 4] =
    [(0.60, 1, 2), (0.85, 3, 5), (0.97, 6, 8), (1.0, 9, 12)];

/// IO-capable processes skew heavier
const IO_MEMORY_TIERS: [MemoryTier; 4] =
    [(0.50, 3, 5), (0.80, 6, 8), (0.95, 9, 12), (1.0, 13, 16)];

/// Draws spawn deadlines and process descriptions
#[derive(Debug, Clone)]
pub struct Spawner {
    config: SpawnConfig,
    memory_capacity: MemoryUnits,
    rng: StdRng,
}

impl Spawner {
    /// Create a spawner; a seed makes the sequence reproducible
    pub fn new(config: SpawnConfig, memory_capacity: MemoryUnits, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            memory_capacity,
            rng,
        }
    }

    pub fn config(&self) -> &SpawnConfig {
        &self.config
    }

    /// Time until the next spawn, uniform over the configured interval
    pub fn next_interval(&mut self) -> Seconds {
        self.uniform(self.config.interval_secs)
    }

    /// Describe a new process
    pub fn next_spec(&mut self) -> ProcessSpec {
        let io_capable = self.rng.gen_bool(self.config.io_probability.clamp(0.0, 1.0));
        let spec = if io_capable {
            let memory = self.memory_from(&IO_MEMORY_TIERS);
            let exec = self.uniform(self.config.io_exec_secs);
            let io = self.uniform(self.config.io_time_secs);
            ProcessSpec::io(memory, exec, io)
        } else {
            let memory = self.memory_from(&STANDARD_MEMORY_TIERS);
            let exec = self.uniform(self.config.standard_exec_secs);
            ProcessSpec::standard(memory, exec)
        };
        spec.with_patience(self.config.patience_secs)
    }

    fn uniform(&mut self, range: SecondsRange) -> Seconds {
        if range.max <= range.min {
            return range.min;
        }
        self.rng.gen_range(range.min..=range.max)
    }

    fn memory_from(&mut self, tiers: &[MemoryTier]) -> MemoryUnits {
        let roll: f64 = self.rng.gen();
        let (_, lo, hi) = tiers
            .iter()
            .copied()
            .find(|(threshold, _, _)| roll < *threshold)
            .unwrap_or(tiers[tiers.len() - 1]);
        let memory = self.rng.gen_range(lo..=hi);
        // Anything larger than the pool could never be scheduled
        memory.clamp(1, self.memory_capacity.max(1))
    }
}
