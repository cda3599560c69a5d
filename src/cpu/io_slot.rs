/*!
 * IO Slot
 * Single-occupant IO resource
 *
 * Finishing IO does not vacate the slot: the process waits in
 * `IoAwaitingCore` until it is explicitly moved back to a core.
 */

use super::types::{AssignError, AssignFailure, IoSlotSnapshot};
use crate::core::types::Seconds;
use crate::process::{IoProfile, Process, ProcessSnapshot, ProcessState};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use tracing::{debug, info};

/// The IO slot
#[derive(Debug, Clone, Default)]
pub struct IoSlot {
    slot: Arc<Mutex<Option<Process>>>,
}

impl IoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the slot for a multi-step check-then-commit
    pub fn lock(&self) -> IoSlotGuard<'_> {
        IoSlotGuard {
            slot: self.slot.lock(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn assign(&self, process: Process) -> Result<(), AssignError> {
        self.lock().assign(process)
    }

    pub fn remove(&self) -> Option<Process> {
        self.lock().remove()
    }

    pub fn clear(&self) {
        self.slot.lock().take();
    }

    /// Advance the occupant's IO timer
    ///
    /// `on_io_completed` fires once, on the tick the IO work finishes, after
    /// the slot lock is released.
    pub fn tick<F>(&self, delta: Seconds, on_io_completed: F)
    where
        F: FnOnce(ProcessSnapshot),
    {
        let finished = {
            let mut slot = self.slot.lock();
            match slot.as_mut() {
                Some(process) => process.advance_io(delta).then(|| process.snapshot()),
                None => None,
            }
        };

        if let Some(snapshot) = finished {
            info!(process_id = snapshot.id, "IO finished, waiting to be moved back to a core");
            on_io_completed(snapshot);
        }
    }

    pub fn occupant(&self) -> Option<ProcessSnapshot> {
        self.slot.lock().as_ref().map(Process::snapshot)
    }

    pub fn snapshot(&self) -> IoSlotSnapshot {
        let slot = self.slot.lock();
        IoSlotSnapshot {
            occupant: slot.as_ref().map(Process::snapshot),
            progress: slot
                .as_ref()
                .and_then(Process::io)
                .map_or(0.0, IoProfile::progress),
        }
    }
}

/// Exclusive access to the IO slot
pub struct IoSlotGuard<'a> {
    slot: MutexGuard<'a, Option<Process>>,
}

impl IoSlotGuard<'_> {
    pub fn is_busy(&self) -> bool {
        self.slot.is_some()
    }

    pub fn occupant(&self) -> Option<&Process> {
        self.slot.as_ref()
    }

    pub fn assign(&mut self, mut process: Process) -> Result<(), AssignError> {
        if let Some(occupant) = self.slot.as_ref() {
            let occupant = occupant.id();
            debug!(occupant, process_id = process.id(), "IO slot busy, assignment refused");
            return Err(AssignError::new(AssignFailure::Busy { occupant }, process));
        }
        if !process.supports_io() {
            return Err(AssignError::new(AssignFailure::NotIoCapable, process));
        }
        if let Err(e) = process.transition(ProcessState::InIo) {
            return Err(AssignError::new(e.into(), process));
        }
        info!(process_id = process.id(), "Assigned process to IO slot");
        *self.slot = Some(process);
        Ok(())
    }

    pub fn remove(&mut self) -> Option<Process> {
        let removed = self.slot.take();
        if let Some(process) = &removed {
            debug!(process_id = process.id(), "Removed process from IO slot");
        }
        removed
    }

    pub(crate) fn restore(&mut self, process: Process) {
        debug_assert!(self.slot.is_none());
        *self.slot = Some(process);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{Phase, ProcessSpec};
    use std::cell::Cell;

    fn paused_io_process(io_secs: f64) -> Process {
        let mut p = Process::new(1, &ProcessSpec::io(2, 2.0, io_secs));
        p.transition(ProcessState::OnCore).unwrap();
        p.advance_execution(1.0);
        p
    }

    #[test]
    fn test_rejects_standard_process() {
        let slot = IoSlot::new();
        let mut p = Process::new(1, &ProcessSpec::standard(1, 1.0));
        p.transition(ProcessState::OnCore).unwrap();
        let err = slot.assign(p).unwrap_err();
        assert_eq!(err.reason, AssignFailure::NotIoCapable);
        assert!(!slot.is_busy());
    }

    #[test]
    fn test_completion_does_not_vacate() {
        let slot = IoSlot::new();
        slot.assign(paused_io_process(2.0)).unwrap();

        let fired = Cell::new(0);
        for _ in 0..4 {
            slot.tick(1.0, |snapshot| {
                assert_eq!(snapshot.phase, Phase::IoAwaitingCore);
                fired.set(fired.get() + 1);
            });
        }
        assert_eq!(fired.get(), 1);
        assert!(slot.is_busy());
        let occupant = slot.occupant().unwrap();
        assert!(occupant.io_completed);
        assert_eq!(occupant.io_remaining, Some(0.0));
    }

    #[test]
    fn test_busy_slot_refuses_second_process() {
        let slot = IoSlot::new();
        slot.assign(paused_io_process(2.0)).unwrap();
        let err = slot.assign(paused_io_process(2.0)).unwrap_err();
        assert_eq!(err.reason, AssignFailure::Busy { occupant: 1 });
    }

    #[test]
    fn test_snapshot_progress() {
        let slot = IoSlot::new();
        slot.assign(paused_io_process(4.0)).unwrap();
        slot.tick(1.0, |_| {});
        assert_eq!(slot.snapshot().progress, 0.25);
        assert!(slot.remove().is_some());
        assert_eq!(slot.snapshot().progress, 0.0);
    }
}
