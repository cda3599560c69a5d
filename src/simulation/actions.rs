/*!
 * User Actions
 * Validated state transitions triggered from the input layer
 *
 * Every action re-checks all of its preconditions under the locks it
 * commits with, so a check made at drag-start cannot go stale by
 * drag-release. A rejected action leaves state untouched; the one
 * deliberate side effect is the FCFS penalty for dragging a queued process
 * that is not at the head.
 */

use super::engine::Simulation;
use crate::core::errors::ActionRejection;
use crate::core::types::{CoreId, ProcessId};
use crate::cpu::CpuCore;
use crate::memory::MemoryError;
use crate::monitoring::{Counter, SimEvent, StopReason};
use crate::process::ProcessState;
use tracing::{error, info, warn};

type ActionResult = Result<(), ActionRejection>;

impl Simulation {
    /// Move the queue head onto a free core
    ///
    /// Requires the process to be at the queue head, the core to be free and
    /// enough memory for the process. Memory is reserved on success.
    pub fn move_queue_to_core(&self, process_id: ProcessId, core_id: CoreId) -> ActionResult {
        let result = self.try_queue_to_core(process_id, core_id);

        if let Err(ActionRejection::NotAtHead { .. }) = &result {
            self.shared.stats.incr(Counter::FcfsViolations);
            warn!(process_id, "FCFS violation, applying penalty");
            if self.penalize(self.shared.config.fcfs_penalty) {
                self.stop_with(StopReason::VitalityDepleted);
            }
        }
        self.finish_action("move_queue_to_core", process_id, core_id, result, || {
            SimEvent::AssignedToCore {
                process_id,
                core_id,
            }
        })
    }

    /// Move a process paused for IO from its core into the IO slot
    pub fn move_core_to_io(&self, process_id: ProcessId, core_id: CoreId) -> ActionResult {
        let result = self.try_core_to_io(process_id, core_id);
        if result.is_ok() {
            self.shared.stats.incr(Counter::IoTrips);
        }
        self.finish_action("move_core_to_io", process_id, core_id, result, || {
            SimEvent::MovedToIo {
                process_id,
                core_id,
            }
        })
    }

    /// Move a process whose IO has finished back onto a free core
    pub fn move_io_to_core(&self, process_id: ProcessId, core_id: CoreId) -> ActionResult {
        let result = self.try_io_to_core(process_id, core_id);
        self.finish_action("move_io_to_core", process_id, core_id, result, || {
            SimEvent::ReturnedToCore {
                process_id,
                core_id,
            }
        })
    }

    fn finish_action<E>(
        &self,
        action: &'static str,
        process_id: ProcessId,
        core_id: CoreId,
        result: ActionResult,
        event: E,
    ) -> ActionResult
    where
        E: FnOnce() -> SimEvent,
    {
        let s = &self.shared;
        match &result {
            Ok(()) => {
                info!(action, process_id, core_id, "Action applied");
                s.events.publish(event());
            }
            Err(rejection) => {
                s.stats.incr(Counter::RejectedActions);
                warn!(action, process_id, core_id, %rejection, "Action rejected");
            }
        }
        result
    }

    fn core(&self, core_id: CoreId) -> Result<&CpuCore, ActionRejection> {
        if !self.is_running() {
            return Err(ActionRejection::NotRunning);
        }
        self.shared
            .cores
            .get(core_id)
            .ok_or(ActionRejection::UnknownCore { core_id })
    }

    fn try_queue_to_core(&self, process_id: ProcessId, core_id: CoreId) -> ActionResult {
        let s = &self.shared;
        let core = self.core(core_id)?;

        let mut queue = s.queue.lock();
        let Some(head) = queue.head() else {
            return Err(ActionRejection::NotInQueue { process_id });
        };
        if head.id() != process_id {
            return if queue.contains(process_id) {
                Err(ActionRejection::NotAtHead {
                    process_id,
                    head: Some(head.id()),
                })
            } else {
                Err(ActionRejection::NotInQueue { process_id })
            };
        }
        let required = head.memory();

        let mut slot = core.lock();
        if let Some(occupant) = slot.occupant() {
            return Err(ActionRejection::CoreBusy {
                core_id,
                occupant: occupant.id(),
            });
        }

        s.memory.allocate(required).map_err(|e| match e {
            MemoryError::Insufficient {
                requested,
                available,
                ..
            } => ActionRejection::InsufficientMemory {
                requested,
                available,
            },
        })?;

        let Some(mut process) = queue.take_head() else {
            s.memory.release(required);
            return Err(ActionRejection::NotInQueue { process_id });
        };
        process.reserve_memory();
        if let Err(e) = slot.assign(process) {
            error!(process_id, error = %e, "Core assignment failed after validation, rolling back");
            let mut process = e.into_process();
            if let Some(units) = process.take_reservation() {
                s.memory.release(units);
            }
            queue.restore_head(process);
            return Err(ActionRejection::WrongOccupant { process_id });
        }
        s.stats.incr(Counter::Assigned);
        Ok(())
    }

    fn try_core_to_io(&self, process_id: ProcessId, core_id: CoreId) -> ActionResult {
        let s = &self.shared;
        let core = self.core(core_id)?;

        let mut slot = core.lock();
        let occupant = slot
            .occupant()
            .filter(|p| p.id() == process_id)
            .ok_or(ActionRejection::WrongOccupant { process_id })?;
        if !occupant.supports_io() {
            return Err(ActionRejection::NotIoCapable { process_id });
        }
        if !occupant.is_paused_for_io() || occupant.is_io_completed() {
            return Err(ActionRejection::IoNotPending { process_id });
        }

        let mut io = s.io.lock();
        if let Some(busy) = io.occupant() {
            return Err(ActionRejection::IoSlotBusy {
                occupant: busy.id(),
            });
        }

        let Some(process) = slot.remove() else {
            return Err(ActionRejection::WrongOccupant { process_id });
        };
        if let Err(e) = io.assign(process) {
            error!(process_id, error = %e, "IO assignment failed after validation, rolling back");
            slot.restore(e.into_process());
            return Err(ActionRejection::WrongOccupant { process_id });
        }
        Ok(())
    }

    fn try_io_to_core(&self, process_id: ProcessId, core_id: CoreId) -> ActionResult {
        let s = &self.shared;
        let core = self.core(core_id)?;

        let mut slot = core.lock();
        let mut io = s.io.lock();
        let occupant = io
            .occupant()
            .filter(|p| p.id() == process_id)
            .ok_or(ActionRejection::WrongOccupant { process_id })?;
        if !occupant.is_io_completed() || occupant.state() != ProcessState::IoAwaitingCore {
            return Err(ActionRejection::IoNotReady { process_id });
        }
        if let Some(busy) = slot.occupant() {
            return Err(ActionRejection::CoreBusy {
                core_id,
                occupant: busy.id(),
            });
        }

        let Some(mut process) = io.remove() else {
            return Err(ActionRejection::WrongOccupant { process_id });
        };
        process.resume_after_io();
        if let Err(e) = slot.assign(process) {
            error!(process_id, error = %e, "Core assignment failed after validation, rolling back");
            io.restore(e.into_process());
            return Err(ActionRejection::WrongOccupant { process_id });
        }
        Ok(())
    }
}
