/*!
 * Scheduling Queue
 * Strict FIFO of waiting processes with patience expiry and timed spawning
 */

use super::spawner::Spawner;
use super::types::{SchedulerError, SchedulerResult, SpawnConfig};
use crate::core::types::{MemoryUnits, ProcessId, Seconds};
use crate::process::{IdAllocator, Process, ProcessSnapshot, ProcessSpec};
use parking_lot::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

struct QueueState {
    processes: VecDeque<Process>,
    spawner: Spawner,
    /// Countdown to the next spawn; stays at or below zero while the queue is full
    until_spawn: Seconds,
    spawning: bool,
}

/// The scheduling queue
#[derive(Clone)]
pub struct ScheduleQueue {
    state: Arc<Mutex<QueueState>>,
    ids: IdAllocator,
    capacity: usize,
    memory_capacity: MemoryUnits,
}

impl ScheduleQueue {
    pub fn new(
        config: SpawnConfig,
        memory_capacity: MemoryUnits,
        ids: IdAllocator,
        seed: Option<u64>,
    ) -> Self {
        let capacity = config.max_queue;
        let spawning = config.enabled;
        let mut spawner = Spawner::new(config, memory_capacity, seed);
        let until_spawn = spawner.next_interval();
        Self {
            state: Arc::new(Mutex::new(QueueState {
                processes: VecDeque::with_capacity(capacity),
                spawner,
                until_spawn,
                spawning,
            })),
            ids,
            capacity,
            memory_capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.state.lock().processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().processes.is_empty()
    }

    /// Lock the queue for a multi-step check-then-commit
    pub fn lock(&self) -> QueueGuard<'_> {
        QueueGuard {
            state: self.state.lock(),
        }
    }

    /// Advance patience countdowns and the spawn timer
    ///
    /// Expired processes are removed and handed to `on_expired` one by one;
    /// a newly spawned process is reported to `on_spawned`. Callbacks run
    /// after the queue lock is released.
    pub fn tick<E, S>(&self, delta: Seconds, mut on_expired: E, on_spawned: S)
    where
        E: FnMut(Process),
        S: FnOnce(ProcessSnapshot),
    {
        let (expired, spawned) = {
            let mut state = self.state.lock();

            let mut expired = Vec::new();
            let mut kept = VecDeque::with_capacity(state.processes.len());
            for mut process in state.processes.drain(..) {
                if process.decrement_patience(delta) {
                    expired.push(process);
                } else {
                    kept.push_back(process);
                }
            }
            state.processes = kept;

            let mut spawned = None;
            if state.spawning {
                state.until_spawn -= delta;
                if state.until_spawn <= 0.0 {
                    if state.processes.len() < self.capacity {
                        let spec = state.spawner.next_spec();
                        let process = Process::new(self.ids.next(), &spec);
                        spawned = Some(process.snapshot());
                        state.processes.push_back(process);
                        state.until_spawn = state.spawner.next_interval();
                    } else {
                        debug!(capacity = self.capacity, "Queue full, deferring spawn");
                    }
                }
            }
            (expired, spawned)
        };

        for process in expired {
            info!(process_id = process.id(), "Patience ran out, removing from queue");
            on_expired(process);
        }
        if let Some(snapshot) = spawned {
            info!(
                process_id = snapshot.id,
                memory = snapshot.memory,
                exec_secs = snapshot.exec_total,
                io_secs = ?snapshot.io_total,
                "Spawned process"
            );
            on_spawned(snapshot);
        }
    }

    /// Append a caller-described process
    ///
    /// Rejects zero memory, memory beyond the pool, and times that are not
    /// finite and positive.
    pub fn spawn(&self, spec: &ProcessSpec) -> SchedulerResult<ProcessSnapshot> {
        validate_spec(spec, self.memory_capacity)?;
        let mut state = self.state.lock();
        if state.processes.len() >= self.capacity {
            return Err(SchedulerError::QueueFull {
                capacity: self.capacity,
            });
        }
        let process = Process::new(self.ids.next(), spec);
        let snapshot = process.snapshot();
        state.processes.push_back(process);
        Ok(snapshot)
    }

    pub fn is_at_head(&self, id: ProcessId) -> bool {
        self.lock().is_at_head(id)
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.lock().contains(id)
    }

    pub fn take_head(&self) -> Option<Process> {
        self.lock().take_head()
    }

    pub fn head(&self) -> Option<ProcessSnapshot> {
        self.state.lock().processes.front().map(Process::snapshot)
    }

    pub fn set_spawning(&self, enabled: bool) {
        self.state.lock().spawning = enabled;
    }

    pub fn snapshot(&self) -> Vec<ProcessSnapshot> {
        self.state
            .lock()
            .processes
            .iter()
            .map(Process::snapshot)
            .collect()
    }

    /// Empty the queue and redraw the spawn deadline
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.processes.clear();
        state.until_spawn = state.spawner.next_interval();
        state.spawning = state.spawner.config().enabled;
    }
}

fn validate_spec(spec: &ProcessSpec, memory_capacity: MemoryUnits) -> SchedulerResult<()> {
    let invalid = |reason: String| Err(SchedulerError::InvalidSpec { reason });

    if spec.memory == 0 || spec.memory > memory_capacity {
        return invalid(format!(
            "memory {} outside 1..={}",
            spec.memory, memory_capacity
        ));
    }
    let times = [
        ("exec_secs", Some(spec.exec_secs)),
        ("patience_secs", Some(spec.patience_secs)),
        ("io_secs", spec.io_secs),
    ];
    for (field, value) in times {
        if let Some(secs) = value {
            if !secs.is_finite() || secs <= 0.0 {
                return invalid(format!("{} must be finite and positive, got {}", field, secs));
            }
        }
    }
    Ok(())
}

/// Exclusive access to the queue
pub struct QueueGuard<'a> {
    state: MutexGuard<'a, QueueState>,
}

impl QueueGuard<'_> {
    pub fn head(&self) -> Option<&Process> {
        self.state.processes.front()
    }

    pub fn is_at_head(&self, id: ProcessId) -> bool {
        self.head().is_some_and(|p| p.id() == id)
    }

    pub fn contains(&self, id: ProcessId) -> bool {
        self.state.processes.iter().any(|p| p.id() == id)
    }

    pub fn take_head(&mut self) -> Option<Process> {
        self.state.processes.pop_front()
    }

    /// Put a process back at the head after an aborted commit
    pub(crate) fn restore_head(&mut self, process: Process) {
        self.state.processes.push_front(process);
    }
}
