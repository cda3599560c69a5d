/*!
 * Process Entity
 * The unit of simulated work and its timers
 *
 * A `Process` is moved between containers (queue, core, IO slot, buffer,
 * consumer) by value, so it is never held by two of them at once.
 */

use super::types::{ExecutionStep, KindTag, Phase, ProcessError, ProcessResult, ProcessState};
use crate::core::limits::DEFAULT_PATIENCE_SECS;
use crate::core::types::{progress_ratio, MemoryUnits, ProcessId, Seconds};
use serde::{Deserialize, Serialize};

/// IO bookkeeping carried only by IO-capable processes
#[derive(Debug, Clone, PartialEq)]
pub struct IoProfile {
    total: Seconds,
    remaining: Seconds,
    completed: bool,
    paused_for_io: bool,
}

impl IoProfile {
    fn new(total: Seconds) -> Self {
        Self {
            total,
            remaining: total,
            completed: false,
            paused_for_io: false,
        }
    }

    pub fn total(&self) -> Seconds {
        self.total
    }

    pub fn remaining(&self) -> Seconds {
        self.remaining
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_paused_for_io(&self) -> bool {
        self.paused_for_io
    }

    pub fn progress(&self) -> f64 {
        progress_ratio(self.total, self.remaining)
    }
}

/// Closed set of process variants
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessKind {
    /// Runs start to finish on a core
    Standard,
    /// Pauses halfway through execution and must visit the IO slot
    Io(IoProfile),
}

/// Caller-facing description of a process to create
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSpec {
    pub memory: MemoryUnits,
    pub exec_secs: Seconds,
    pub patience_secs: Seconds,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_secs: Option<Seconds>,
}

impl ProcessSpec {
    pub fn standard(memory: MemoryUnits, exec_secs: Seconds) -> Self {
        Self {
            memory,
            exec_secs,
            patience_secs: DEFAULT_PATIENCE_SECS,
            io_secs: None,
        }
    }

    pub fn io(memory: MemoryUnits, exec_secs: Seconds, io_secs: Seconds) -> Self {
        Self {
            memory,
            exec_secs,
            patience_secs: DEFAULT_PATIENCE_SECS,
            io_secs: Some(io_secs),
        }
    }

    pub fn with_patience(mut self, patience_secs: Seconds) -> Self {
        self.patience_secs = patience_secs;
        self
    }
}

/// A simulated process
#[derive(Debug, Clone, PartialEq)]
pub struct Process {
    id: ProcessId,
    memory: MemoryUnits,
    exec_total: Seconds,
    exec_remaining: Seconds,
    patience_total: Seconds,
    patience_remaining: Seconds,
    state: ProcessState,
    settle_total: Seconds,
    settle_remaining: Seconds,
    ready: bool,
    completed: bool,
    memory_reserved: bool,
    kind: ProcessKind,
}

impl Process {
    pub fn new(id: ProcessId, spec: &ProcessSpec) -> Self {
        let kind = match spec.io_secs {
            Some(io) => ProcessKind::Io(IoProfile::new(io.max(0.0))),
            None => ProcessKind::Standard,
        };
        Self {
            id,
            memory: spec.memory,
            exec_total: spec.exec_secs.max(0.0),
            exec_remaining: spec.exec_secs.max(0.0),
            patience_total: spec.patience_secs.max(0.0),
            patience_remaining: spec.patience_secs.max(0.0),
            state: ProcessState::Queued,
            settle_total: 0.0,
            settle_remaining: 0.0,
            ready: false,
            completed: false,
            memory_reserved: false,
            kind,
        }
    }

    // --- Accessors ---

    pub fn id(&self) -> ProcessId {
        self.id
    }

    pub fn memory(&self) -> MemoryUnits {
        self.memory
    }

    pub fn kind(&self) -> &ProcessKind {
        &self.kind
    }

    /// Capability query used by cores and action validation
    pub fn supports_io(&self) -> bool {
        matches!(self.kind, ProcessKind::Io(_))
    }

    pub fn io(&self) -> Option<&IoProfile> {
        match &self.kind {
            ProcessKind::Io(profile) => Some(profile),
            ProcessKind::Standard => None,
        }
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            ProcessState::Queued => Phase::Queued,
            ProcessState::OnCore if self.is_paused_for_io() => Phase::IoPending,
            ProcessState::OnCore => Phase::OnCore,
            ProcessState::InIo => Phase::InIo,
            ProcessState::IoAwaitingCore => Phase::IoAwaitingCore,
            ProcessState::InBuffer => Phase::InBuffer,
            ProcessState::Consumed => Phase::Consumed,
        }
    }

    pub fn exec_total(&self) -> Seconds {
        self.exec_total
    }

    pub fn exec_remaining(&self) -> Seconds {
        self.exec_remaining
    }

    pub fn exec_progress(&self) -> f64 {
        progress_ratio(self.exec_total, self.exec_remaining)
    }

    pub fn patience_total(&self) -> Seconds {
        self.patience_total
    }

    pub fn patience_remaining(&self) -> Seconds {
        self.patience_remaining
    }

    pub fn is_paused_for_io(&self) -> bool {
        self.io().is_some_and(IoProfile::is_paused_for_io)
    }

    pub fn is_io_completed(&self) -> bool {
        self.io().is_some_and(IoProfile::is_completed)
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn settle_remaining(&self) -> Seconds {
        self.settle_remaining
    }

    pub fn settle_progress(&self) -> f64 {
        if self.ready {
            return 1.0;
        }
        progress_ratio(self.settle_total, self.settle_remaining)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn holds_memory(&self) -> bool {
        self.memory_reserved
    }

    // --- Lifecycle ---

    /// Move to `next`, enforcing the lifecycle graph
    pub(crate) fn transition(&mut self, next: ProcessState) -> ProcessResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ProcessError::InvalidStateTransition {
                id: self.id,
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Count patience down while queued
    ///
    /// Returns `true` once patience has run out.
    pub(crate) fn decrement_patience(&mut self, delta: Seconds) -> bool {
        if self.state != ProcessState::Queued {
            return false;
        }
        self.patience_remaining = (self.patience_remaining - delta.max(0.0)).max(0.0);
        self.patience_remaining <= 0.0
    }

    /// Advance the execution timer by one tick
    ///
    /// IO-capable processes that have not done their IO yet never drop below
    /// the halfway mark, so one oversized delta cannot skip the IO trip.
    pub(crate) fn advance_execution(&mut self, delta: Seconds) -> ExecutionStep {
        let half = self.exec_total / 2.0;
        let mut next = (self.exec_remaining - delta.max(0.0)).max(0.0);

        match &mut self.kind {
            ProcessKind::Io(io) if io.paused_for_io => return ExecutionStep::Paused,
            ProcessKind::Io(io) if !io.completed => {
                next = next.max(half.min(self.exec_remaining));
                self.exec_remaining = next;
                if self.exec_remaining <= half {
                    io.paused_for_io = true;
                    return ExecutionStep::IoTriggered;
                }
                return ExecutionStep::Running;
            }
            _ => {}
        }

        self.exec_remaining = next;
        if self.exec_remaining <= 0.0 {
            ExecutionStep::Finished
        } else {
            ExecutionStep::Running
        }
    }

    /// Advance the IO timer while in the IO slot
    ///
    /// Returns `true` on the tick that completes the IO work; the process then
    /// waits in `IoAwaitingCore` until it is moved back to a core.
    pub(crate) fn advance_io(&mut self, delta: Seconds) -> bool {
        if self.state != ProcessState::InIo {
            return false;
        }
        let ProcessKind::Io(io) = &mut self.kind else {
            return false;
        };
        if io.completed {
            return false;
        }
        io.remaining = (io.remaining - delta.max(0.0)).max(0.0);
        if io.remaining > 0.0 {
            return false;
        }
        io.completed = true;
        self.state = ProcessState::IoAwaitingCore;
        true
    }

    /// Clear the IO pause so execution resumes on the next tick
    pub(crate) fn resume_after_io(&mut self) {
        if let ProcessKind::Io(io) = &mut self.kind {
            io.paused_for_io = false;
        }
    }

    pub(crate) fn reserve_memory(&mut self) {
        self.memory_reserved = true;
    }

    /// Hand back the memory reservation, at most once
    pub(crate) fn take_reservation(&mut self) -> Option<MemoryUnits> {
        if !self.memory_reserved {
            return None;
        }
        self.memory_reserved = false;
        Some(self.memory)
    }

    /// Start the post-hand-off settle countdown
    pub(crate) fn begin_settle(&mut self, delay: Seconds) {
        self.settle_total = delay.max(0.0);
        self.settle_remaining = self.settle_total;
        self.ready = self.settle_total <= 0.0;
    }

    /// Returns `true` on the tick the process becomes ready for consumption
    pub(crate) fn advance_settle(&mut self, delta: Seconds) -> bool {
        if self.ready {
            return false;
        }
        self.settle_remaining = (self.settle_remaining - delta.max(0.0)).max(0.0);
        if self.settle_remaining <= 0.0 {
            self.ready = true;
            return true;
        }
        false
    }

    pub(crate) fn mark_consumed(&mut self) -> ProcessResult<()> {
        self.transition(ProcessState::Consumed)?;
        self.completed = true;
        Ok(())
    }

    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            id: self.id,
            kind: if self.supports_io() {
                KindTag::Io
            } else {
                KindTag::Standard
            },
            phase: self.phase(),
            memory: self.memory,
            exec_total: self.exec_total,
            exec_remaining: self.exec_remaining,
            patience_total: self.patience_total,
            patience_remaining: self.patience_remaining,
            io_total: self.io().map(IoProfile::total),
            io_remaining: self.io().map(IoProfile::remaining),
            io_completed: self.is_io_completed(),
            settle_progress: self.settle_progress(),
            ready: self.ready,
        }
    }
}

impl std::fmt::Display for Process {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Process{{id={}, memory={}, patience={:.1}, exec={:.1}/{:.1}",
            self.id, self.memory, self.patience_remaining, self.exec_remaining, self.exec_total
        )?;
        if let Some(io) = self.io() {
            write!(f, ", io={:.1}/{:.1}", io.remaining, io.total)?;
        }
        write!(f, ", phase={}}}", self.phase())
    }
}

/// Read-only copy of a process for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessSnapshot {
    pub id: ProcessId,
    pub kind: KindTag,
    pub phase: Phase,
    pub memory: MemoryUnits,
    pub exec_total: Seconds,
    pub exec_remaining: Seconds,
    pub patience_total: Seconds,
    pub patience_remaining: Seconds,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_total: Option<Seconds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub io_remaining: Option<Seconds>,
    pub io_completed: bool,
    pub settle_progress: f64,
    pub ready: bool,
}

impl ProcessSnapshot {
    pub fn exec_progress(&self) -> f64 {
        progress_ratio(self.exec_total, self.exec_remaining)
    }

    pub fn io_progress(&self) -> Option<f64> {
        match (self.io_total, self.io_remaining) {
            (Some(total), Some(remaining)) => Some(progress_ratio(total, remaining)),
            _ => None,
        }
    }

    pub fn patience_ratio(&self) -> f64 {
        1.0 - progress_ratio(self.patience_total, self.patience_remaining)
    }
}
