/*!
 * Scheduler Types
 * Spawn configuration and queue errors
 */

use crate::core::limits::{
    DEFAULT_IO_PROBABILITY, DEFAULT_MAX_QUEUE, DEFAULT_MAX_SPAWN_INTERVAL_SECS,
    DEFAULT_MIN_SPAWN_INTERVAL_SECS, DEFAULT_PATIENCE_SECS, IO_EXEC_SECS, IO_TIME_SECS,
    STANDARD_EXEC_SECS,
};
use crate::core::types::Seconds;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Scheduler operation result
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Scheduling queue full: {capacity} processes waiting")]
    QueueFull { capacity: usize },

    #[error("Invalid process: {reason}")]
    InvalidSpec { reason: String },
}

/// Inclusive range of seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondsRange {
    pub min: Seconds,
    pub max: Seconds,
}

impl SecondsRange {
    pub const fn new(min: Seconds, max: Seconds) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

impl From<(Seconds, Seconds)> for SecondsRange {
    fn from((min, max): (Seconds, Seconds)) -> Self {
        Self { min, max }
    }
}

/// Spawner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SpawnConfig {
    /// Whether the queue synthesizes processes on its own
    pub enabled: bool,
    /// Maximum number of queued processes
    pub max_queue: usize,
    pub interval_secs: SecondsRange,
    /// Probability that a spawned process is IO-capable
    pub io_probability: f64,
    pub patience_secs: Seconds,
    pub standard_exec_secs: SecondsRange,
    pub io_exec_secs: SecondsRange,
    pub io_time_secs: SecondsRange,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_queue: DEFAULT_MAX_QUEUE,
            interval_secs: SecondsRange::new(
                DEFAULT_MIN_SPAWN_INTERVAL_SECS,
                DEFAULT_MAX_SPAWN_INTERVAL_SECS,
            ),
            io_probability: DEFAULT_IO_PROBABILITY,
            patience_secs: DEFAULT_PATIENCE_SECS,
            standard_exec_secs: STANDARD_EXEC_SECS.into(),
            io_exec_secs: IO_EXEC_SECS.into(),
            io_time_secs: IO_TIME_SECS.into(),
        }
    }
}
