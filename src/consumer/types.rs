/*!
 * Consumer Types
 * Configuration, status and the completion hook for consumer workers
 */

use crate::core::limits::{DEFAULT_MAX_CONSUME_MS, DEFAULT_MIN_CONSUME_MS};
use crate::core::types::WorkerId;
use crate::process::{Process, ProcessSnapshot};
use serde::{Deserialize, Serialize};

/// Consumer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ConsumerConfig {
    /// Simulated consumption latency lower bound (milliseconds)
    pub min_latency_ms: u64,
    /// Simulated consumption latency upper bound (milliseconds)
    pub max_latency_ms: u64,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: DEFAULT_MIN_CONSUME_MS,
            max_latency_ms: DEFAULT_MAX_CONSUME_MS,
        }
    }
}

/// Receives every process a worker finishes consuming
///
/// Called from worker threads. Implementations must not block on the
/// hand-off buffer.
pub trait ConsumptionHandler: Send + Sync {
    fn on_consumed(&self, worker: WorkerId, process: Process);
}

impl<F> ConsumptionHandler for F
where
    F: Fn(WorkerId, Process) + Send + Sync,
{
    fn on_consumed(&self, worker: WorkerId, process: Process) {
        self(worker, process)
    }
}

/// Display view of one worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ConsumerSnapshot {
    pub id: WorkerId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<ProcessSnapshot>,
    pub consumed: u64,
}

impl ConsumerSnapshot {
    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }
}
