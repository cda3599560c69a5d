/*!
 * Simulation Events
 * Fan-out of state changes to any number of subscribers
 *
 * This is how IO-required and IO-completed notifications reach the display
 * layer. Publishing never blocks: each subscriber channel is bounded, events
 * for a subscriber that has fallen behind are dropped, and disconnected
 * subscribers are removed on the next publish.
 */

use crate::core::limits::EVENT_CHANNEL_CAPACITY;
use crate::core::types::{CoreId, ProcessId, WorkerId};
use crate::process::ProcessSnapshot;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Why a simulation run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// `stop()` or `reset()` was called
    Requested,
    /// Vitality reached zero
    VitalityDepleted,
}

/// One observable change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Started { run_id: Uuid },
    Stopped { reason: StopReason },
    Spawned { process: ProcessSnapshot },
    Expired { process_id: ProcessId },
    AssignedToCore { process_id: ProcessId, core_id: CoreId },
    IoRequired { process: ProcessSnapshot, core_id: CoreId },
    MovedToIo { process_id: ProcessId, core_id: CoreId },
    IoCompleted { process: ProcessSnapshot },
    ReturnedToCore { process_id: ProcessId, core_id: CoreId },
    CpuCompleted { process_id: ProcessId, core_id: CoreId },
    Buffered { process_id: ProcessId },
    Consumed { process_id: ProcessId, worker_id: WorkerId },
    VitalityChanged { vitality: i64, delta: i64 },
    ScoreChanged { score: u64, delta: u64 },
}

/// Subscriber registry
#[derive(Debug, Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<flume::Sender<SimEvent>>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bus whose subscribers each buffer at most `capacity` undelivered events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self) -> flume::Receiver<SimEvent> {
        let (tx, rx) = flume::bounded(self.capacity);
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    pub fn publish(&self, event: SimEvent) {
        let mut subscribers = self.subscribers.lock();
        if subscribers.is_empty() {
            return;
        }
        subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(flume::TrySendError::Full(_)) => {
                debug!("Event subscriber lagging, dropping event");
                true
            }
            Err(flume::TrySendError::Disconnected(_)) => false,
        });
    }
}
