/*!
 * CPU Types
 * Shared types for single-occupant slots (cores and the IO slot)
 */

use crate::core::types::{CoreId, ProcessId};
use crate::process::{Process, ProcessError, ProcessSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why an assignment was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssignFailure {
    #[error("slot already occupied by process {occupant}")]
    Busy { occupant: ProcessId },

    #[error("process is not IO-capable")]
    NotIoCapable,

    #[error(transparent)]
    InvalidState(#[from] ProcessError),
}

/// Failed assignment; the process is handed back untouched
#[derive(Error, Debug)]
#[error("cannot assign process {}: {reason}", .process.id())]
pub struct AssignError {
    pub reason: AssignFailure,
    pub process: Process,
}

impl AssignError {
    pub(crate) fn new(reason: AssignFailure, process: Process) -> Self {
        Self { reason, process }
    }

    pub fn into_process(self) -> Process {
        self.process
    }
}

/// Display view of a CPU core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CoreSnapshot {
    pub id: CoreId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<ProcessSnapshot>,
    pub progress: f64,
}

/// Display view of the IO slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IoSlotSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupant: Option<ProcessSnapshot>,
    pub progress: f64,
}
