/*!
 * Autopilot
 * Scripted player for headless runs
 *
 * Applies the three user actions greedily, in an order that frees resources
 * before they are needed: finished IO back to a core, paused processes into
 * the IO slot, then the queue head onto any free core with enough memory.
 */

use crate::process::Phase;
use crate::simulation::Simulation;
use tracing::debug;

/// Actions taken by one [`Autopilot::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutopilotStep {
    pub returned_from_io: usize,
    pub moved_to_io: usize,
    pub scheduled: usize,
}

impl AutopilotStep {
    pub fn total(&self) -> usize {
        self.returned_from_io + self.moved_to_io + self.scheduled
    }
}

#[derive(Debug, Default)]
pub struct Autopilot {
    totals: AutopilotStep,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything done since creation
    pub fn totals(&self) -> AutopilotStep {
        self.totals
    }

    pub fn step(&mut self, sim: &Simulation) -> AutopilotStep {
        let mut step = AutopilotStep::default();
        if !sim.is_running() {
            return step;
        }

        if let Some(process) = sim.io_slot().occupant.filter(|p| p.io_completed) {
            let free = sim.cores().into_iter().find(|c| c.occupant.is_none());
            if let Some(core) = free {
                if sim.move_io_to_core(process.id, core.id).is_ok() {
                    step.returned_from_io += 1;
                }
            }
        }

        if sim.io_slot().occupant.is_none() {
            let pending = sim.cores().into_iter().find_map(|c| {
                c.occupant
                    .filter(|p| p.phase == Phase::IoPending)
                    .map(|p| (p.id, c.id))
            });
            if let Some((process_id, core_id)) = pending {
                if sim.move_core_to_io(process_id, core_id).is_ok() {
                    step.moved_to_io += 1;
                }
            }
        }

        loop {
            let Some(head) = sim.queue().into_iter().next() else {
                break;
            };
            if sim.memory_stats().available < head.memory {
                debug!(process_id = head.id, memory = head.memory, "Autopilot waiting for memory");
                break;
            }
            let Some(core) = sim.cores().into_iter().find(|c| c.occupant.is_none()) else {
                break;
            };
            if sim.move_queue_to_core(head.id, core.id).is_err() {
                break;
            }
            step.scheduled += 1;
        }

        self.totals.returned_from_io += step.returned_from_io;
        self.totals.moved_to_io += step.moved_to_io;
        self.totals.scheduled += step.scheduled;
        step
    }
}
