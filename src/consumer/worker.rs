/*!
 * Consumer Worker
 * Long-lived thread that drains the hand-off buffer
 *
 * Loop: block-take a ready process, simulate consumption latency, report the
 * process to the completion handler, repeat. Buffer shutdown or the stop
 * signal ends the loop; a process interrupted mid-consumption goes back to
 * the head of the buffer.
 */

use super::types::{ConsumerConfig, ConsumerSnapshot, ConsumptionHandler};
use crate::buffer::{BufferError, HandoffBuffer};
use crate::core::signal::StopSignal;
use crate::core::thread::panic_message;
use crate::core::types::WorkerId;
use crate::process::ProcessSnapshot;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Default)]
struct WorkerStatus {
    current: Option<ProcessSnapshot>,
    consumed: u64,
}

/// Handle to one consumer thread
pub struct ConsumerWorker {
    id: WorkerId,
    status: Arc<Mutex<WorkerStatus>>,
    handle: Option<JoinHandle<()>>,
}

impl ConsumerWorker {
    /// Start a worker thread
    pub fn spawn(
        id: WorkerId,
        buffer: HandoffBuffer,
        handler: Arc<dyn ConsumptionHandler>,
        config: ConsumerConfig,
        stop: StopSignal,
        seed: Option<u64>,
    ) -> std::io::Result<Self> {
        let status = Arc::new(Mutex::new(WorkerStatus::default()));
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(id as u64)),
            None => StdRng::from_entropy(),
        };
        let context = WorkerContext {
            id,
            buffer,
            handler,
            config,
            stop,
            status: Arc::clone(&status),
            rng,
        };
        let handle = thread::Builder::new()
            .name(format!("consumer-{}", id))
            .spawn(move || context.run())?;

        Ok(Self {
            id,
            status,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub(crate) fn take_handle(&mut self) -> Option<JoinHandle<()>> {
        self.handle.take()
    }

    pub fn snapshot(&self) -> ConsumerSnapshot {
        let status = self.status.lock();
        ConsumerSnapshot {
            id: self.id,
            current: status.current.clone(),
            consumed: status.consumed,
        }
    }
}

struct WorkerContext {
    id: WorkerId,
    buffer: HandoffBuffer,
    handler: Arc<dyn ConsumptionHandler>,
    config: ConsumerConfig,
    stop: StopSignal,
    status: Arc<Mutex<WorkerStatus>>,
    rng: StdRng,
}

impl WorkerContext {
    fn run(mut self) {
        info!(worker_id = self.id, "Consumer started");
        while !self.stop.is_stopped() {
            let process = match self.buffer.take() {
                Ok(process) => process,
                Err(BufferError::ShutDown) => {
                    debug!(worker_id = self.id, "Buffer shut down, leaving loop");
                    break;
                }
                Err(BufferError::TimedOut) => continue,
            };

            let process_id = process.id();
            self.status.lock().current = Some(process.snapshot());
            debug!(worker_id = self.id, process_id, "Took process from buffer");

            let latency = self.latency();
            if !self.stop.sleep(latency) {
                match self.buffer.restore_front(process) {
                    Ok(()) => info!(
                        worker_id = self.id,
                        process_id, "Stopped mid-consumption, process returned to buffer"
                    ),
                    Err(_) => warn!(
                        worker_id = self.id,
                        process_id, "Stopped mid-consumption with buffer full, dropping process"
                    ),
                }
                self.status.lock().current = None;
                break;
            }

            let handler = Arc::clone(&self.handler);
            let worker = self.id;
            let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
                handler.on_consumed(worker, process);
            }));
            if let Err(payload) = outcome {
                error!(
                    worker_id = self.id,
                    process_id,
                    panic = %panic_message(payload.as_ref()),
                    "Consumption handler panicked"
                );
            }

            let mut status = self.status.lock();
            status.current = None;
            status.consumed += 1;
            drop(status);
            info!(
                worker_id = self.id,
                process_id,
                latency_ms = latency.as_millis() as u64,
                "Consumed process"
            );
        }
        info!(worker_id = self.id, "Consumer stopped");
    }

    fn latency(&mut self) -> Duration {
        let ConsumerConfig {
            min_latency_ms,
            max_latency_ms,
        } = self.config;
        let ms = if max_latency_ms <= min_latency_ms {
            min_latency_ms
        } else {
            self.rng.gen_range(min_latency_ms..=max_latency_ms)
        };
        Duration::from_millis(ms)
    }
}
