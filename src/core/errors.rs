/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::core::types::{CoreId, MemoryUnits, ProcessId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// Re-export subsystem errors so callers can match on everything from one place
pub use crate::buffer::BufferError;
pub use crate::memory::MemoryError;
pub use crate::process::ProcessError;
pub use crate::scheduler::SchedulerError;

/// Why a user action was refused
///
/// Rejections never mutate simulation state, with one exception: dragging a
/// queued process that is not at the head costs the FCFS penalty.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "reason", content = "details", rename_all = "snake_case")]
pub enum ActionRejection {
    #[error("Simulation is not running")]
    #[diagnostic(
        code(action::not_running),
        help("Call start() before issuing actions.")
    )]
    NotRunning,

    #[error("Core {core_id} does not exist")]
    #[diagnostic(code(action::unknown_core), help("Core ids run from 0 to cores - 1."))]
    UnknownCore { core_id: CoreId },

    #[error("Process {process_id} is not in the queue")]
    #[diagnostic(
        code(action::not_in_queue),
        help("The process may have expired or already been scheduled.")
    )]
    NotInQueue { process_id: ProcessId },

    #[error("Process {process_id} is not at the head of the queue (head: {head:?})")]
    #[diagnostic(
        code(action::not_at_head),
        help("Only the first process in the queue may be scheduled. FCFS violations cost vitality.")
    )]
    NotAtHead {
        process_id: ProcessId,
        head: Option<ProcessId>,
    },

    #[error("Core {core_id} is busy with process {occupant}")]
    #[diagnostic(code(action::core_busy), help("Pick a free core."))]
    CoreBusy { core_id: CoreId, occupant: ProcessId },

    #[error("IO slot is busy with process {occupant}")]
    #[diagnostic(
        code(action::io_slot_busy),
        help("Wait for the current IO to finish and move that process back to a core.")
    )]
    IoSlotBusy { occupant: ProcessId },

    #[error("Insufficient memory: requested {requested}, available {available}")]
    #[diagnostic(
        code(action::insufficient_memory),
        help("Wait for running processes to finish and release memory.")
    )]
    InsufficientMemory {
        requested: MemoryUnits,
        available: MemoryUnits,
    },

    #[error("Process {process_id} is not where the action expects it")]
    #[diagnostic(
        code(action::wrong_occupant),
        help("The process has moved since the action began. Refresh the view.")
    )]
    WrongOccupant { process_id: ProcessId },

    #[error("Process {process_id} does not perform IO")]
    #[diagnostic(code(action::not_io_capable))]
    NotIoCapable { process_id: ProcessId },

    #[error("Process {process_id} is not waiting for IO")]
    #[diagnostic(
        code(action::io_not_pending),
        help("IO-capable processes pause for IO halfway through execution.")
    )]
    IoNotPending { process_id: ProcessId },

    #[error("IO for process {process_id} has not finished")]
    #[diagnostic(code(action::io_not_ready), help("Wait for the IO timer to run out."))]
    IoNotReady { process_id: ProcessId },
}

/// Configuration result
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid or unreadable configuration
#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    #[diagnostic(code(config::read_failed), help("Check that the file exists and is readable."))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}")]
    #[diagnostic(code(config::parse_failed), help("The config file must be a JSON object."))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value {value:?} for environment variable {var}")]
    #[diagnostic(code(config::invalid_env))]
    Env { var: &'static str, value: String },

    #[error("Invalid configuration: {field} {reason}")]
    #[diagnostic(code(config::invalid))]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Simulation result
pub type SimResult<T> = Result<T, SimError>;

/// Unified simulation error
#[derive(Error, Debug, Diagnostic)]
pub enum SimError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Action(#[from] ActionRejection),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Scheduling queue full ({capacity} processes waiting)")]
    #[diagnostic(
        code(sim::queue_full),
        help("Schedule or let queued processes expire before adding more.")
    )]
    QueueFull { capacity: usize },

    #[error("Invalid process: {reason}")]
    #[diagnostic(
        code(sim::invalid_process),
        help("Memory must fit the pool and every time must be finite and positive.")
    )]
    InvalidProcess { reason: String },

    #[error("Vitality depleted")]
    #[diagnostic(
        code(sim::vitality_depleted),
        help("The previous run ended in game over. Call reset() before starting again.")
    )]
    VitalityDepleted,

    #[error("Failed to spawn thread: {0}")]
    #[diagnostic(code(sim::thread_spawn), help("The OS may be out of thread resources."))]
    ThreadSpawn(#[source] std::io::Error),
}

impl From<SchedulerError> for SimError {
    fn from(err: SchedulerError) -> Self {
        match err {
            SchedulerError::QueueFull { capacity } => SimError::QueueFull { capacity },
            SchedulerError::InvalidSpec { reason } => SimError::InvalidProcess { reason },
        }
    }
}
