/*!
 * Simulation Statistics
 * Lock-free counters updated from the tick thread, actions and consumers
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Counters {
    spawned: AtomicU64,
    expired: AtomicU64,
    assigned: AtomicU64,
    io_trips: AtomicU64,
    cpu_completed: AtomicU64,
    buffered: AtomicU64,
    consumed: AtomicU64,
    fcfs_violations: AtomicU64,
    rejected_actions: AtomicU64,
    handoff_failures: AtomicU64,
    ticks: AtomicU64,
}

/// Which counter to bump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    Spawned,
    Expired,
    Assigned,
    IoTrips,
    CpuCompleted,
    Buffered,
    Consumed,
    FcfsViolations,
    RejectedActions,
    HandoffFailures,
    Ticks,
}

/// Shared counters
#[derive(Debug, Clone, Default)]
pub struct SimStats {
    counters: Arc<Counters>,
}

impl SimStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, counter: Counter) -> &AtomicU64 {
        let c = &self.counters;
        match counter {
            Counter::Spawned => &c.spawned,
            Counter::Expired => &c.expired,
            Counter::Assigned => &c.assigned,
            Counter::IoTrips => &c.io_trips,
            Counter::CpuCompleted => &c.cpu_completed,
            Counter::Buffered => &c.buffered,
            Counter::Consumed => &c.consumed,
            Counter::FcfsViolations => &c.fcfs_violations,
            Counter::RejectedActions => &c.rejected_actions,
            Counter::HandoffFailures => &c.handoff_failures,
            Counter::Ticks => &c.ticks,
        }
    }

    #[inline]
    pub fn incr(&self, counter: Counter) {
        self.counter(counter).fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn get(&self, counter: Counter) -> u64 {
        self.counter(counter).load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        for counter in [
            Counter::Spawned,
            Counter::Expired,
            Counter::Assigned,
            Counter::IoTrips,
            Counter::CpuCompleted,
            Counter::Buffered,
            Counter::Consumed,
            Counter::FcfsViolations,
            Counter::RejectedActions,
            Counter::HandoffFailures,
            Counter::Ticks,
        ] {
            self.counter(counter).store(0, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> SimStatsSnapshot {
        SimStatsSnapshot {
            spawned: self.get(Counter::Spawned),
            expired: self.get(Counter::Expired),
            assigned: self.get(Counter::Assigned),
            io_trips: self.get(Counter::IoTrips),
            cpu_completed: self.get(Counter::CpuCompleted),
            buffered: self.get(Counter::Buffered),
            consumed: self.get(Counter::Consumed),
            fcfs_violations: self.get(Counter::FcfsViolations),
            rejected_actions: self.get(Counter::RejectedActions),
            handoff_failures: self.get(Counter::HandoffFailures),
            ticks: self.get(Counter::Ticks),
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimStatsSnapshot {
    pub spawned: u64,
    pub expired: u64,
    pub assigned: u64,
    pub io_trips: u64,
    pub cpu_completed: u64,
    pub buffered: u64,
    pub consumed: u64,
    pub fcfs_violations: u64,
    pub rejected_actions: u64,
    pub handoff_failures: u64,
    pub ticks: u64,
}
