/*!
 * Process Types
 * Lifecycle states and errors for simulated processes
 */

use crate::core::types::ProcessId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Process operation result
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Process errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    #[error("Invalid state transition for process {id}: {from:?} -> {to:?}")]
    InvalidStateTransition {
        id: ProcessId,
        from: ProcessState,
        to: ProcessState,
    },
}

/// Lifecycle state, owned by whichever container currently holds the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Waiting in the scheduling queue
    Queued,
    /// Resident on a CPU core (possibly paused for IO)
    OnCore,
    /// Occupying the IO slot
    InIo,
    /// IO finished, still parked in the IO slot until moved back to a core
    IoAwaitingCore,
    /// Waiting in the hand-off buffer
    InBuffer,
    /// Drained by a consumer worker
    Consumed,
}

impl ProcessState {
    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(self, next: ProcessState) -> bool {
        use ProcessState::*;
        matches!(
            (self, next),
            (Queued, OnCore)
                | (OnCore, InIo)
                | (InIo, IoAwaitingCore)
                | (IoAwaitingCore, OnCore)
                | (OnCore, InBuffer)
                | (InBuffer, Consumed)
        )
    }
}

/// Display/validation view of the lifecycle
///
/// Identical to [`ProcessState`] except that an IO-capable process sitting on a
/// core with its execution paused is reported as `IoPending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Queued,
    OnCore,
    IoPending,
    InIo,
    IoAwaitingCore,
    InBuffer,
    Consumed,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let label = match self {
            Phase::Queued => "QUEUED",
            Phase::OnCore => "ON_CORE",
            Phase::IoPending => "IO_PENDING",
            Phase::InIo => "IN_IO",
            Phase::IoAwaitingCore => "IO_AWAITING_CORE",
            Phase::InBuffer => "IN_BUFFER",
            Phase::Consumed => "CONSUMED",
        };
        write!(f, "{}", label)
    }
}

/// Variant tag carried in snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindTag {
    Standard,
    Io,
}

/// Outcome of advancing a process's execution timer by one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStep {
    /// Still running
    Running,
    /// Paused for IO, timer untouched
    Paused,
    /// Crossed the halfway mark; execution is now paused for IO
    IoTriggered,
    /// Remaining execution time reached zero
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_transitions() {
        use ProcessState::*;
        assert!(Queued.can_transition_to(OnCore));
        assert!(OnCore.can_transition_to(InIo));
        assert!(InIo.can_transition_to(IoAwaitingCore));
        assert!(IoAwaitingCore.can_transition_to(OnCore));
        assert!(OnCore.can_transition_to(InBuffer));
        assert!(InBuffer.can_transition_to(Consumed));
    }

    #[test]
    fn test_rejected_transitions() {
        use ProcessState::*;
        assert!(!Queued.can_transition_to(InBuffer));
        assert!(!InIo.can_transition_to(OnCore));
        assert!(!InBuffer.can_transition_to(OnCore));
        assert!(!Consumed.can_transition_to(Queued));
        assert!(!OnCore.can_transition_to(OnCore));
    }
}
