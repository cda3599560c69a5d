/*!
 * Simulation Engine
 * Owns every resource, drives the timed tick and the thread lifecycle
 *
 * Tick order: scheduling queue, hand-off buffer, cores, IO slot.
 *
 * Lock order for anything that holds two resources at once:
 * queue -> core -> IO slot -> memory. Callbacks from components always run
 * with their locks released, so they may call back into the simulation.
 */

use super::config::SimConfig;
use super::snapshot::{SimSnapshot, TickReport};
use super::vitality::Vitality;
use crate::buffer::{BufferError, BufferSnapshot, HandoffBuffer};
use crate::consumer::{ConsumerPool, ConsumerSnapshot, ConsumptionHandler};
use crate::core::errors::{ConfigResult, SimError, SimResult};
use crate::core::thread::join_until;
use crate::core::types::{CoreId, Seconds, WorkerId};
use crate::cpu::{CoreSnapshot, CpuCore, IoSlot, IoSlotSnapshot};
use crate::memory::{MemoryPool, MemoryStats};
use crate::monitoring::{
    generate_run_id, span_operation, Counter, EventBus, SimEvent, SimStats, SimStatsSnapshot,
    StopReason,
};
use crate::process::{IdAllocator, Process, ProcessSnapshot, ProcessSpec, ProcessState};
use crate::scheduler::ScheduleQueue;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Seed offset so consumer latency draws differ from spawner draws
const CONSUMER_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

pub(super) struct Shared {
    pub(super) config: SimConfig,
    pub(super) ids: IdAllocator,
    pub(super) memory: MemoryPool,
    pub(super) queue: ScheduleQueue,
    pub(super) cores: Vec<CpuCore>,
    pub(super) io: IoSlot,
    pub(super) buffer: HandoffBuffer,
    consumers: Mutex<Option<ConsumerPool>>,
    handoffs: Mutex<Vec<JoinHandle<()>>>,
    vitality: Vitality,
    score: AtomicU64,
    running: AtomicBool,
    stop_reason: Mutex<Option<StopReason>>,
    run_id: Mutex<Option<Uuid>>,
    pub(super) events: EventBus,
    pub(super) stats: SimStats,
}

/// The simulation
///
/// Cheap to clone; clones share state. Safe to drive `tick` from one thread
/// while actions and snapshots come from others.
#[derive(Clone)]
pub struct Simulation {
    pub(super) shared: Arc<Shared>,
}

impl Simulation {
    /// Validate `config` and build every component in its initial state
    pub fn new(config: SimConfig) -> ConfigResult<Self> {
        config.validate()?;

        let ids = IdAllocator::new();
        let memory = MemoryPool::new(config.memory_capacity);
        let queue = ScheduleQueue::new(
            config.spawn.clone(),
            config.memory_capacity,
            ids.clone(),
            config.seed,
        );
        let cores = (0..config.cores).map(CpuCore::new).collect();
        let buffer = HandoffBuffer::new(config.buffer_capacity, config.settle_delay_secs);
        let vitality = Vitality::new(config.initial_vitality);

        info!(
            cores = config.cores,
            memory = config.memory_capacity,
            buffer = config.buffer_capacity,
            consumers = config.consumers,
            seed = ?config.seed,
            "Simulation initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                ids,
                memory,
                queue,
                cores,
                io: IoSlot::new(),
                buffer,
                consumers: Mutex::new(None),
                handoffs: Mutex::new(Vec::new()),
                vitality,
                score: AtomicU64::new(0),
                running: AtomicBool::new(false),
                stop_reason: Mutex::new(None),
                run_id: Mutex::new(None),
                events: EventBus::new(),
                stats: SimStats::new(),
            }),
        })
    }

    pub fn builder() -> super::SimulationBuilder {
        super::SimulationBuilder::new()
    }

    // --- Lifecycle ---

    /// Start consumer workers and begin accepting ticks and actions
    ///
    /// No-op when already running. Refuses to start with depleted vitality;
    /// `reset()` first.
    pub fn start(&self) -> SimResult<()> {
        let s = &self.shared;
        let mut consumers = s.consumers.lock();
        if s.running.load(Ordering::Acquire) {
            return Ok(());
        }
        if s.vitality.is_depleted() {
            return Err(SimError::VitalityDepleted);
        }

        s.buffer.reopen();
        let run_id = generate_run_id();
        let handler: Arc<dyn ConsumptionHandler> = Arc::new(CompletionHandler {
            shared: Arc::downgrade(s),
        });

        s.running.store(true, Ordering::Release);
        let pool = match ConsumerPool::spawn(
            s.config.consumers,
            s.buffer.clone(),
            handler,
            s.config.consumer.clone(),
            s.config.seed.map(|seed| seed ^ CONSUMER_SEED_SALT),
        ) {
            Ok(pool) => pool,
            Err(e) => {
                s.running.store(false, Ordering::Release);
                s.buffer.shutdown();
                error!(error = %e, "Failed to start consumer workers");
                return Err(SimError::ThreadSpawn(e));
            }
        };
        *consumers = Some(pool);
        drop(consumers);

        *s.run_id.lock() = Some(run_id);
        *s.stop_reason.lock() = None;
        info!(%run_id, consumers = s.config.consumers, "Simulation started");
        s.events.publish(SimEvent::Started { run_id });
        Ok(())
    }

    /// Stop the run; no-op when already stopped
    pub fn stop(&self) {
        self.stop_with(StopReason::Requested);
    }

    /// Returns `true` if this call performed the stop
    pub(super) fn stop_with(&self, reason: StopReason) -> bool {
        let s = &self.shared;
        let mut consumers = s.consumers.lock();
        if !s.running.swap(false, Ordering::AcqRel) {
            return false;
        }
        let run_id = *s.run_id.lock();
        let span = span_operation("stop", run_id);
        let _entered = span.enter();

        *s.stop_reason.lock() = Some(reason);
        s.buffer.shutdown();

        let timeout = s.config.join_timeout();
        if let Some(mut pool) = consumers.take() {
            pool.shutdown(timeout);
        }
        drop(consumers);

        let handoffs: Vec<_> = s.handoffs.lock().drain(..).collect();
        let deadline = Instant::now() + timeout;
        for handle in handoffs {
            join_until(handle, deadline);
        }

        info!(run_id = ?run_id, ?reason, "Simulation stopped");
        s.events.publish(SimEvent::Stopped { reason });
        true
    }

    /// Stop, then return every component to its initial state
    pub fn reset(&self) {
        self.stop();
        let s = &self.shared;
        let span = span_operation("reset", *s.run_id.lock());
        let _entered = span.enter();

        s.queue.reset();
        for core in &s.cores {
            core.clear();
        }
        s.io.clear();
        s.buffer.clear();
        s.memory.reset();
        s.ids.reset();
        s.vitality.reset();
        s.score.store(0, Ordering::Release);
        s.stats.reset();
        *s.stop_reason.lock() = None;
        *s.run_id.lock() = None;
        info!("Simulation reset");
    }

    // --- Tick ---

    /// Advance the simulation by `delta` seconds
    ///
    /// Callers clamp oversized deltas. Ignored while not running.
    pub fn tick(&self, delta: Seconds) -> TickReport {
        let mut report = TickReport::default();
        if !self.is_running() {
            return report;
        }
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        let s = &self.shared;
        s.stats.incr(Counter::Ticks);

        let mut depleted = false;
        let mut expired = Vec::new();
        let mut spawned = None;
        s.queue.tick(
            delta,
            |process| {
                s.stats.incr(Counter::Expired);
                s.events.publish(SimEvent::Expired {
                    process_id: process.id(),
                });
                expired.push(process.id());
                depleted |= self.penalize(s.config.patience_penalty);
            },
            |snapshot| {
                s.stats.incr(Counter::Spawned);
                spawned = Some(snapshot.id);
                s.events.publish(SimEvent::Spawned { process: snapshot });
            },
        );
        report.expired = expired;
        report.spawned = spawned;

        report.buffer_head_ready = s.buffer.tick(delta);

        for core in &s.cores {
            let mut completed = None;
            let mut io_required = None;
            core.tick(
                delta,
                |core_id, process| {
                    completed = Some(process.id());
                    self.hand_off(core_id, process);
                },
                |core_id, snapshot| {
                    io_required = Some(snapshot.id);
                    s.events.publish(SimEvent::IoRequired {
                        process: snapshot,
                        core_id,
                    });
                },
            );
            report.completed.extend(completed);
            report.io_required.extend(io_required);
        }

        let mut io_completed = None;
        s.io.tick(delta, |snapshot| {
            io_completed = Some(snapshot.id);
            s.events.publish(SimEvent::IoCompleted { process: snapshot });
        });
        report.io_completed = io_completed;

        if depleted && self.stop_with(StopReason::VitalityDepleted) {
            warn!("Vitality depleted, game over");
            report.stopped = Some(StopReason::VitalityDepleted);
        }
        report
    }

    /// Release memory and move a finished process into the hand-off buffer
    ///
    /// The put is tried without waiting first; if the buffer is full (or
    /// earlier hand-offs are still waiting) it moves to its own thread so a
    /// full buffer never stalls the tick.
    fn hand_off(&self, core_id: CoreId, mut process: Process) {
        let s = &self.shared;
        let process_id = process.id();

        if let Some(units) = process.take_reservation() {
            s.memory.release(units);
        }
        if let Err(e) = process.transition(ProcessState::InBuffer) {
            error!(process_id, error = %e, "Finished process in unexpected state, dropping");
            return;
        }
        s.stats.incr(Counter::CpuCompleted);
        s.events.publish(SimEvent::CpuCompleted {
            process_id,
            core_id,
        });

        let mut handoffs = s.handoffs.lock();
        handoffs.retain(|h| !h.is_finished());
        if handoffs.is_empty() {
            match s.buffer.put_timeout(process, Duration::ZERO) {
                Ok(()) => {
                    record_buffered(&s.stats, &s.events, process_id);
                    return;
                }
                Err(e) if e.reason == BufferError::ShutDown => {
                    record_handoff_failure(&s.stats, process_id);
                    return;
                }
                Err(e) => process = e.into_process(),
            }
        }

        let buffer = s.buffer.clone();
        let stats = s.stats.clone();
        let events = s.events.clone();
        let spawned = thread::Builder::new()
            .name(format!("handoff-{}", process_id))
            .spawn(move || match buffer.put(process) {
                Ok(()) => record_buffered(&stats, &events, process_id),
                Err(_) => record_handoff_failure(&stats, process_id),
            });
        match spawned {
            Ok(handle) => {
                debug!(process_id, pending = handoffs.len() + 1, "Buffer full, hand-off deferred");
                handoffs.push(handle);
            }
            Err(e) => {
                error!(process_id, error = %e, "Failed to spawn hand-off thread");
                s.stats.incr(Counter::HandoffFailures);
            }
        }
    }

    /// Apply a vitality penalty; returns `true` if this one depleted it
    pub(super) fn penalize(&self, amount: i64) -> bool {
        let s = &self.shared;
        if amount <= 0 || !self.is_running() {
            return false;
        }
        let penalty = s.vitality.penalize(amount);
        s.events.publish(SimEvent::VitalityChanged {
            vitality: penalty.remaining,
            delta: -amount,
        });
        info!(vitality = penalty.remaining, penalty = amount, "Vitality reduced");
        penalty.depleted_now
    }

    /// A consumer finished with `process`
    fn complete_consumption(&self, worker_id: WorkerId, mut process: Process) {
        let s = &self.shared;
        let process_id = process.id();
        if !self.is_running() {
            debug!(process_id, worker_id, "Consumption reported after stop, ignoring");
            return;
        }
        if let Err(e) = process.mark_consumed() {
            warn!(process_id, worker_id, error = %e, "Consumed process in unexpected state");
            return;
        }

        let delta = s.config.completion_score;
        let score = s.score.fetch_add(delta, Ordering::AcqRel) + delta;
        s.stats.incr(Counter::Consumed);
        s.events.publish(SimEvent::Consumed {
            process_id,
            worker_id,
        });
        s.events.publish(SimEvent::ScoreChanged { score, delta });
        debug!(process_id, worker_id, score, "Process consumed");
    }

    // --- Queue injection ---

    /// Append a caller-described process to the queue
    pub fn spawn_process(&self, spec: ProcessSpec) -> SimResult<ProcessSnapshot> {
        let s = &self.shared;
        let snapshot = s.queue.spawn(&spec)?;
        s.stats.incr(Counter::Spawned);
        info!(process_id = snapshot.id, memory = snapshot.memory, "Process added to queue");
        s.events.publish(SimEvent::Spawned {
            process: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Pause or resume automatic spawning
    pub fn set_spawning(&self, enabled: bool) {
        self.shared.queue.set_spawning(enabled);
    }

    // --- Read-only accessors ---

    pub fn config(&self) -> &SimConfig {
        &self.shared.config
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn run_id(&self) -> Option<Uuid> {
        *self.shared.run_id.lock()
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        *self.shared.stop_reason.lock()
    }

    pub fn vitality(&self) -> i64 {
        self.shared.vitality.get()
    }

    pub fn score(&self) -> u64 {
        self.shared.score.load(Ordering::Acquire)
    }

    pub fn memory_stats(&self) -> MemoryStats {
        self.shared.memory.stats()
    }

    pub fn cores(&self) -> Vec<CoreSnapshot> {
        self.shared.cores.iter().map(CpuCore::snapshot).collect()
    }

    pub fn io_slot(&self) -> IoSlotSnapshot {
        self.shared.io.snapshot()
    }

    pub fn queue(&self) -> Vec<ProcessSnapshot> {
        self.shared.queue.snapshot()
    }

    pub fn buffer(&self) -> BufferSnapshot {
        self.shared.buffer.snapshot()
    }

    pub fn consumers(&self) -> Vec<ConsumerSnapshot> {
        self.shared
            .consumers
            .lock()
            .as_ref()
            .map(ConsumerPool::snapshot)
            .unwrap_or_default()
    }

    pub fn stats(&self) -> SimStatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            run_id: self.run_id(),
            running: self.is_running(),
            stop_reason: self.stop_reason(),
            vitality: self.vitality(),
            score: self.score(),
            memory: self.memory_stats(),
            cores: self.cores(),
            io_slot: self.io_slot(),
            queue: self.queue(),
            buffer: self.buffer(),
            consumers: self.consumers(),
            stats: self.stats(),
        }
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> flume::Receiver<SimEvent> {
        self.shared.events.subscribe()
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("running", &self.is_running())
            .field("vitality", &self.vitality())
            .field("score", &self.score())
            .finish_non_exhaustive()
    }
}

fn record_buffered(stats: &SimStats, events: &EventBus, process_id: u64) {
    stats.incr(Counter::Buffered);
    events.publish(SimEvent::Buffered { process_id });
    debug!(process_id, "Process handed off to buffer");
}

fn record_handoff_failure(stats: &SimStats, process_id: u64) {
    stats.incr(Counter::HandoffFailures);
    debug!(process_id, "Buffer shut down during hand-off, process dropped");
}

/// Routes consumer completions back into the simulation
///
/// Holds a weak reference so the worker threads never keep a dropped
/// simulation alive.
struct CompletionHandler {
    shared: Weak<Shared>,
}

impl ConsumptionHandler for CompletionHandler {
    fn on_consumed(&self, worker: WorkerId, process: Process) {
        match self.shared.upgrade() {
            Some(shared) => Simulation { shared }.complete_consumption(worker, process),
            None => debug!(worker_id = worker, "Simulation dropped, discarding consumed process"),
        }
    }
}
