/*!
 * Buffer Types
 * Errors and snapshots for the hand-off buffer
 */

use crate::process::{Process, ProcessSnapshot};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Buffer operation result
pub type BufferResult<T> = Result<T, BufferError>;

/// Buffer errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("Hand-off buffer is shut down")]
    ShutDown,

    #[error("Timed out waiting on hand-off buffer")]
    TimedOut,
}

/// Failed `put`; the process is handed back so it is never dropped silently
#[derive(Error, Debug)]
#[error("cannot buffer process {}: {reason}", .process.id())]
pub struct PutError {
    pub reason: BufferError,
    pub process: Process,
}

impl PutError {
    pub(crate) fn new(reason: BufferError, process: Process) -> Self {
        Self { reason, process }
    }

    pub fn into_process(self) -> Process {
        self.process
    }
}

/// Display view of the buffer, head first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BufferSnapshot {
    pub capacity: usize,
    pub items: Vec<ProcessSnapshot>,
    pub shut_down: bool,
}
