/*!
 * Simulation Configuration
 * Defaults, JSON file loading, environment overrides and validation
 *
 * Sources, later overriding earlier:
 * - `core::limits` defaults
 * - JSON file (`SimConfig::load`)
 * - environment (`SIM_CORES`, `SIM_MEMORY`, `SIM_BUFFER`, `SIM_CONSUMERS`,
 *   `SIM_SEED`, `SIM_SPAWN_ENABLED`)
 */

use crate::consumer::ConsumerConfig;
use crate::core::errors::{ConfigError, ConfigResult};
use crate::core::limits::{
    DEFAULT_BUFFER_CAPACITY, DEFAULT_COMPLETION_SCORE, DEFAULT_CONSUMERS, DEFAULT_CORES,
    DEFAULT_FCFS_PENALTY, DEFAULT_INITIAL_VITALITY, DEFAULT_JOIN_TIMEOUT,
    DEFAULT_MEMORY_CAPACITY, DEFAULT_PATIENCE_PENALTY, DEFAULT_SETTLE_DELAY_SECS,
};
use crate::core::types::{MemoryUnits, Seconds};
use crate::scheduler::SpawnConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Full simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SimConfig {
    pub cores: usize,
    pub memory_capacity: MemoryUnits,
    pub buffer_capacity: usize,
    pub consumers: usize,
    /// Delay before a buffered process may be consumed
    pub settle_delay_secs: Seconds,
    pub initial_vitality: i64,
    /// Vitality lost per expired process
    pub patience_penalty: i64,
    /// Vitality lost per attempt to schedule a process that is not at the head
    pub fcfs_penalty: i64,
    /// Score gained per consumed process
    pub completion_score: u64,
    /// Bounded wait for worker threads during `stop()`
    pub join_timeout_ms: u64,
    /// Fixed seed for reproducible spawning; entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub spawn: SpawnConfig,
    pub consumer: ConsumerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            cores: DEFAULT_CORES,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            consumers: DEFAULT_CONSUMERS,
            settle_delay_secs: DEFAULT_SETTLE_DELAY_SECS,
            initial_vitality: DEFAULT_INITIAL_VITALITY,
            patience_penalty: DEFAULT_PATIENCE_PENALTY,
            fcfs_penalty: DEFAULT_FCFS_PENALTY,
            completion_score: DEFAULT_COMPLETION_SCORE,
            join_timeout_ms: DEFAULT_JOIN_TIMEOUT.as_millis() as u64,
            seed: None,
            spawn: SpawnConfig::default(),
            consumer: ConsumerConfig::default(),
        }
    }
}

impl SimConfig {
    /// Read a JSON config file; missing keys keep their defaults
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded simulation config");
        Ok(config)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> ConfigResult<Self> {
        Self::default().with_env()
    }

    /// Apply `SIM_*` environment overrides
    pub fn with_env(self) -> ConfigResult<Self> {
        self.with_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any `SIM_*` lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "SIM_CORES")? {
            self.cores = v;
        }
        if let Some(v) = parse_var(&lookup, "SIM_MEMORY")? {
            self.memory_capacity = v;
        }
        if let Some(v) = parse_var(&lookup, "SIM_BUFFER")? {
            self.buffer_capacity = v;
        }
        if let Some(v) = parse_var(&lookup, "SIM_CONSUMERS")? {
            self.consumers = v;
        }
        if let Some(v) = parse_var(&lookup, "SIM_SEED")? {
            self.seed = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "SIM_SPAWN_ENABLED")? {
            self.spawn.enabled = v;
        }
        Ok(self)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.cores == 0 {
            return Err(ConfigError::invalid("cores", "must be at least 1"));
        }
        if self.memory_capacity == 0 {
            return Err(ConfigError::invalid("memory_capacity", "must be at least 1"));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::invalid("buffer_capacity", "must be at least 1"));
        }
        if self.consumers == 0 {
            return Err(ConfigError::invalid("consumers", "must be at least 1"));
        }
        if !(self.settle_delay_secs.is_finite() && self.settle_delay_secs > 0.0) {
            return Err(ConfigError::invalid("settle_delay_secs", "must be positive"));
        }
        if self.initial_vitality <= 0 {
            return Err(ConfigError::invalid("initial_vitality", "must be positive"));
        }
        if self.patience_penalty < 0 || self.fcfs_penalty < 0 {
            return Err(ConfigError::invalid("penalties", "must not be negative"));
        }

        let spawn = &self.spawn;
        if spawn.max_queue == 0 {
            return Err(ConfigError::invalid("spawn.max_queue", "must be at least 1"));
        }
        if !spawn.interval_secs.is_valid() || spawn.interval_secs.min <= 0.0 {
            return Err(ConfigError::invalid(
                "spawn.interval_secs",
                format!("{:?} is not a positive ascending range", spawn.interval_secs),
            ));
        }
        if !(0.0..=1.0).contains(&spawn.io_probability) {
            return Err(ConfigError::invalid(
                "spawn.io_probability",
                format!("{} is outside [0, 1]", spawn.io_probability),
            ));
        }
        if !(spawn.patience_secs.is_finite() && spawn.patience_secs > 0.0) {
            return Err(ConfigError::invalid("spawn.patience_secs", "must be positive"));
        }
        for (field, range) in [
            ("spawn.standard_exec_secs", spawn.standard_exec_secs),
            ("spawn.io_exec_secs", spawn.io_exec_secs),
            ("spawn.io_time_secs", spawn.io_time_secs),
        ] {
            if !range.is_valid() || range.min <= 0.0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("{:?} is not a positive ascending range", range),
                ));
            }
        }

        if self.consumer.min_latency_ms > self.consumer.max_latency_ms {
            return Err(ConfigError::invalid(
                "consumer",
                "min_latency_ms exceeds max_latency_ms",
            ));
        }
        Ok(())
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> ConfigResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Env { var, value }),
    }
}
