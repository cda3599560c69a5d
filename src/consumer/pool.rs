/*!
 * Consumer Pool
 * Owns the consumer workers and their shutdown
 */

use super::types::{ConsumerConfig, ConsumerSnapshot, ConsumptionHandler};
use super::worker::ConsumerWorker;
use crate::buffer::HandoffBuffer;
use crate::core::signal::StopSignal;
use crate::core::thread::{join_until, JoinOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Result of stopping the pool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolShutdown {
    pub joined: usize,
    pub panicked: usize,
    pub detached: usize,
}

/// N consumer workers bound to one hand-off buffer
pub struct ConsumerPool {
    workers: Vec<ConsumerWorker>,
    buffer: HandoffBuffer,
    stop: StopSignal,
}

impl ConsumerPool {
    /// Start `count` workers
    ///
    /// If a thread fails to start, the ones already running are stopped
    /// before the error is returned.
    pub fn spawn(
        count: usize,
        buffer: HandoffBuffer,
        handler: Arc<dyn ConsumptionHandler>,
        config: ConsumerConfig,
        seed: Option<u64>,
    ) -> std::io::Result<Self> {
        let stop = StopSignal::new();
        let mut pool = Self {
            workers: Vec::with_capacity(count),
            buffer: buffer.clone(),
            stop: stop.clone(),
        };
        for id in 0..count {
            match ConsumerWorker::spawn(
                id,
                buffer.clone(),
                Arc::clone(&handler),
                config.clone(),
                stop.clone(),
                seed,
            ) {
                Ok(worker) => pool.workers.push(worker),
                Err(e) => {
                    pool.shutdown(Duration::from_millis(100));
                    return Err(e);
                }
            }
        }
        info!(workers = count, "Consumer pool started");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Signal every worker, unblock the buffer and join with a bounded wait
    pub fn shutdown(&mut self, timeout: Duration) -> PoolShutdown {
        self.stop.stop();
        self.buffer.shutdown();

        let deadline = Instant::now() + timeout;
        let mut outcome = PoolShutdown::default();
        for worker in &mut self.workers {
            let Some(handle) = worker.take_handle() else {
                continue;
            };
            match join_until(handle, deadline) {
                JoinOutcome::Joined => outcome.joined += 1,
                JoinOutcome::Panicked => outcome.panicked += 1,
                JoinOutcome::Detached => outcome.detached += 1,
            }
        }
        info!(
            joined = outcome.joined,
            panicked = outcome.panicked,
            detached = outcome.detached,
            "Consumer pool stopped"
        );
        outcome
    }

    pub fn snapshot(&self) -> Vec<ConsumerSnapshot> {
        self.workers.iter().map(ConsumerWorker::snapshot).collect()
    }
}

impl Drop for ConsumerPool {
    fn drop(&mut self) {
        if self.workers.iter_mut().any(|w| w.take_handle().is_some()) {
            // Handles already taken are detached; just make sure the threads exit
            self.stop.stop();
            self.buffer.shutdown();
        }
    }
}
