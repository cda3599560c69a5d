/*!
 * Simulation Limits and Constants
 *
 * Centralized location for the tunables that shape a game.
 * Every value here is the default for a `SimConfig` field.
 */

use std::time::Duration;

// =============================================================================
// RESOURCES
// =============================================================================

/// Number of CPU cores
pub const DEFAULT_CORES: usize = 4;

/// Memory pool capacity (simulated GB)
pub const DEFAULT_MEMORY_CAPACITY: u32 = 16;

/// Hand-off buffer capacity
pub const DEFAULT_BUFFER_CAPACITY: usize = 5;

/// Number of consumer workers draining the hand-off buffer
pub const DEFAULT_CONSUMERS: usize = 2;

/// Settle delay before a buffered entity may be consumed
pub const DEFAULT_SETTLE_DELAY_SECS: f64 = 1.5;

// =============================================================================
// SCORING
// =============================================================================

/// Starting vitality
pub const DEFAULT_INITIAL_VITALITY: i64 = 100;

/// Vitality lost when a queued entity runs out of patience
pub const DEFAULT_PATIENCE_PENALTY: i64 = 10;

/// Vitality lost when a non-head entity is dragged onto a core
pub const DEFAULT_FCFS_PENALTY: i64 = 5;

/// Score gained per consumed entity
pub const DEFAULT_COMPLETION_SCORE: u64 = 20;

// =============================================================================
// SPAWNING
// =============================================================================

/// Maximum number of queued entities
pub const DEFAULT_MAX_QUEUE: usize = 10;

/// Spawn interval lower bound
pub const DEFAULT_MIN_SPAWN_INTERVAL_SECS: f64 = 3.0;

/// Spawn interval upper bound
pub const DEFAULT_MAX_SPAWN_INTERVAL_SECS: f64 = 5.0;

/// Chance that a spawned entity is IO-capable
pub const DEFAULT_IO_PROBABILITY: f64 = 0.5;

/// Patience every spawned entity starts with
pub const DEFAULT_PATIENCE_SECS: f64 = 15.0;

/// Execution time range for standard entities
pub const STANDARD_EXEC_SECS: (f64, f64) = (2.0, 4.0);

/// Execution time range for IO-capable entities
pub const IO_EXEC_SECS: (f64, f64) = (3.0, 6.0);

/// IO time range for IO-capable entities
pub const IO_TIME_SECS: (f64, f64) = (2.0, 5.0);

// =============================================================================
// CONSUMERS & THREADS
// =============================================================================

/// Simulated consumption latency lower bound
pub const DEFAULT_MIN_CONSUME_MS: u64 = 500;

/// Simulated consumption latency upper bound
pub const DEFAULT_MAX_CONSUME_MS: u64 = 1500;

/// Bounded wait when joining worker threads on stop
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_millis(1000);

/// Poll interval while waiting for a worker thread to finish
pub const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Undelivered events held per subscriber before new ones are dropped
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

// =============================================================================
// DRIVER
// =============================================================================

/// Tick rate of the demo driver
pub const TARGET_TICKS_PER_SEC: u64 = 60;

/// Largest delta the demo driver hands to `tick` (30 FPS equivalent)
pub const MAX_TICK_DELTA_SECS: f64 = 1.0 / 30.0;
