/*!
 * CPU Core
 * Single-occupant execution slot
 *
 * A core advances its occupant's execution timer every tick, pauses IO-capable
 * processes at the halfway mark and detaches finished processes before
 * reporting them, so a completion callback never observes a core that still
 * holds the finished process.
 */

use super::types::{AssignError, AssignFailure, CoreSnapshot};
use crate::core::types::{CoreId, Seconds};
use crate::process::{ExecutionStep, Process, ProcessSnapshot, ProcessState};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, info};

/// Something a core tick produced, dispatched after the slot lock is released
enum CoreEvent {
    Completed(Process),
    IoRequired(ProcessSnapshot),
}

/// A CPU core
#[derive(Debug, Clone)]
pub struct CpuCore {
    id: CoreId,
    slot: Arc<Mutex<Option<Process>>>,
}

impl CpuCore {
    pub fn new(id: CoreId) -> Self {
        Self {
            id,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> CoreId {
        self.id
    }

    /// Lock the core for a multi-step check-then-commit
    pub fn lock(&self) -> CoreGuard<'_> {
        CoreGuard {
            id: self.id,
            slot: self.slot.lock(),
        }
    }

    pub fn is_free(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Place `process` on the core; fails without mutation if occupied
    pub fn assign(&self, process: Process) -> Result<(), AssignError> {
        self.lock().assign(process)
    }

    /// Detach the current occupant, if any
    pub fn remove(&self) -> Option<Process> {
        self.lock().remove()
    }

    /// Drop any occupant without running callbacks
    pub fn clear(&self) {
        self.slot.lock().take();
    }

    /// Advance the occupant by `delta` seconds
    ///
    /// `on_completed` receives the detached process once its execution time
    /// reaches zero. `on_io_required` fires once per IO cycle when an
    /// IO-capable process crosses its halfway mark. Neither callback runs
    /// with the core locked.
    pub fn tick<C, R>(&self, delta: Seconds, on_completed: C, on_io_required: R)
    where
        C: FnOnce(CoreId, Process),
        R: FnOnce(CoreId, ProcessSnapshot),
    {
        let event = {
            let mut slot = self.slot.lock();
            let Some(process) = slot.as_mut() else {
                return;
            };
            match process.advance_execution(delta) {
                ExecutionStep::Running | ExecutionStep::Paused => None,
                ExecutionStep::IoTriggered => {
                    info!(
                        core_id = self.id,
                        process_id = process.id(),
                        "Process reached IO trigger point, pausing execution"
                    );
                    Some(CoreEvent::IoRequired(process.snapshot()))
                }
                ExecutionStep::Finished => slot.take().map(CoreEvent::Completed),
            }
        };

        match event {
            Some(CoreEvent::Completed(process)) => {
                info!(core_id = self.id, process_id = process.id(), "Process finished execution");
                on_completed(self.id, process);
            }
            Some(CoreEvent::IoRequired(snapshot)) => on_io_required(self.id, snapshot),
            None => {}
        }
    }

    pub fn occupant(&self) -> Option<ProcessSnapshot> {
        self.slot.lock().as_ref().map(Process::snapshot)
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        let slot = self.slot.lock();
        CoreSnapshot {
            id: self.id,
            occupant: slot.as_ref().map(Process::snapshot),
            progress: slot.as_ref().map_or(0.0, Process::exec_progress),
        }
    }
}

/// Exclusive access to a core
pub struct CoreGuard<'a> {
    id: CoreId,
    slot: MutexGuard<'a, Option<Process>>,
}

impl CoreGuard<'_> {
    pub fn id(&self) -> CoreId {
        self.id
    }

    pub fn is_free(&self) -> bool {
        self.slot.is_none()
    }

    pub fn occupant(&self) -> Option<&Process> {
        self.slot.as_ref()
    }

    pub fn assign(&mut self, mut process: Process) -> Result<(), AssignError> {
        if let Some(occupant) = self.slot.as_ref() {
            debug!(
                core_id = self.id,
                occupant = occupant.id(),
                process_id = process.id(),
                "Core busy, assignment refused"
            );
            let occupant = occupant.id();
            return Err(AssignError::new(AssignFailure::Busy { occupant }, process));
        }
        if let Err(e) = process.transition(ProcessState::OnCore) {
            return Err(AssignError::new(e.into(), process));
        }
        info!(core_id = self.id, process_id = process.id(), "Assigned process to core");
        *self.slot = Some(process);
        Ok(())
    }

    pub fn remove(&mut self) -> Option<Process> {
        let removed = self.slot.take();
        if let Some(process) = &removed {
            debug!(core_id = self.id, process_id = process.id(), "Removed process from core");
        }
        removed
    }

    /// Put back a process removed by an aborted commit, state untouched
    pub(crate) fn restore(&mut self, process: Process) {
        debug_assert!(self.slot.is_none());
        *self.slot = Some(process);
    }
}
