/*!
 * Hand-off Buffer
 * Bounded multi-producer/multi-consumer queue with a settle-delay gate
 *
 * One mutex guards the contents; two condvars carry the "not full" and
 * "head ready" conditions. Readiness is a head-of-line gate: a taker never
 * skips a head that is still settling, which keeps hand-off order intact.
 */

use super::types::{BufferError, BufferResult, BufferSnapshot, PutError};
use crate::core::types::Seconds;
use crate::process::Process;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

struct BufferState {
    items: VecDeque<Process>,
    shut_down: bool,
}

impl BufferState {
    fn head_ready(&self) -> bool {
        self.items.front().is_some_and(Process::is_ready)
    }
}

struct Inner {
    state: Mutex<BufferState>,
    not_full: Condvar,
    ready: Condvar,
    capacity: usize,
    settle_delay: Seconds,
}

/// The hand-off buffer
#[derive(Clone)]
pub struct HandoffBuffer {
    inner: Arc<Inner>,
}

impl HandoffBuffer {
    pub fn new(capacity: usize, settle_delay: Seconds) -> Self {
        debug!(capacity, settle_delay, "Hand-off buffer initialized");
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(BufferState {
                    items: VecDeque::with_capacity(capacity),
                    shut_down: false,
                }),
                not_full: Condvar::new(),
                ready: Condvar::new(),
                capacity,
                settle_delay,
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn settle_delay(&self) -> Seconds {
        self.inner.settle_delay
    }

    pub fn len(&self) -> usize {
        self.inner.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().items.is_empty()
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.state.lock().shut_down
    }

    /// Live handles to this buffer, this one included
    #[cfg(test)]
    pub(crate) fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Append `process`, blocking while the buffer is full
    ///
    /// Starts the process's settle delay. Fails with `ShutDown` once the
    /// buffer is shut down, handing the process back.
    pub fn put(&self, process: Process) -> Result<(), PutError> {
        self.put_until(process, None)
    }

    /// Like [`put`](Self::put) but gives up after `timeout`
    pub fn put_timeout(&self, process: Process, timeout: Duration) -> Result<(), PutError> {
        self.put_until(process, Some(Instant::now() + timeout))
    }

    /// Remove the head, blocking until it exists and has settled
    pub fn take(&self) -> BufferResult<Process> {
        self.take_until(None)
    }

    /// Like [`take`](Self::take) but gives up after `timeout`
    pub fn take_timeout(&self, timeout: Duration) -> BufferResult<Process> {
        self.take_until(Some(Instant::now() + timeout))
    }

    fn put_until(&self, mut process: Process, deadline: Option<Instant>) -> Result<(), PutError> {
        let mut state = self.inner.state.lock();
        loop {
            if state.shut_down {
                return Err(PutError::new(BufferError::ShutDown, process));
            }
            if state.items.len() < self.inner.capacity {
                break;
            }
            debug!(process_id = process.id(), "Buffer full, waiting to put");
            if !Self::wait(&self.inner.not_full, &mut state, deadline) {
                if state.shut_down {
                    return Err(PutError::new(BufferError::ShutDown, process));
                }
                if state.items.len() >= self.inner.capacity {
                    return Err(PutError::new(BufferError::TimedOut, process));
                }
            }
        }

        process.begin_settle(self.inner.settle_delay);
        debug!(process_id = process.id(), len = state.items.len() + 1, "Put process into buffer");
        state.items.push_back(process);
        drop(state);
        self.inner.ready.notify_all();
        Ok(())
    }

    fn take_until(&self, deadline: Option<Instant>) -> BufferResult<Process> {
        let mut state = self.inner.state.lock();
        loop {
            if state.shut_down {
                return Err(BufferError::ShutDown);
            }
            if state.head_ready() {
                break;
            }
            if !Self::wait(&self.inner.ready, &mut state, deadline) {
                if state.shut_down {
                    return Err(BufferError::ShutDown);
                }
                if !state.head_ready() {
                    return Err(BufferError::TimedOut);
                }
            }
        }

        let process = state.items.pop_front().ok_or(BufferError::TimedOut)?;
        let next_ready = state.head_ready();
        debug!(process_id = process.id(), len = state.items.len(), "Took process from buffer");
        drop(state);

        self.inner.not_full.notify_one();
        if next_ready {
            self.inner.ready.notify_one();
        }
        Ok(process)
    }

    /// Wait on `condvar`; returns `false` if the deadline passed
    fn wait(condvar: &Condvar, state: &mut MutexGuard<'_, BufferState>, deadline: Option<Instant>) -> bool {
        match deadline {
            Some(deadline) => !condvar.wait_until(state, deadline).timed_out(),
            None => {
                condvar.wait(state);
                true
            }
        }
    }

    /// Advance every resident's settle delay
    ///
    /// Returns `true` if the head became ready on this tick, in which case
    /// blocked takers are woken.
    pub fn tick(&self, delta: Seconds) -> bool {
        let mut state = self.inner.state.lock();
        let was_ready = state.head_ready();
        for process in state.items.iter_mut() {
            process.advance_settle(delta);
        }
        let now_ready = state.head_ready();
        drop(state);

        if !was_ready && now_ready {
            debug!("Buffer head became ready, waking consumers");
            self.inner.ready.notify_all();
            return true;
        }
        false
    }

    /// Unblock every waiting `put`/`take`; later calls fail fast
    pub fn shutdown(&self) {
        self.inner.state.lock().shut_down = true;
        self.inner.not_full.notify_all();
        self.inner.ready.notify_all();
        debug!("Hand-off buffer shut down");
    }

    /// Put a taken process back at the head
    ///
    /// Works on a shut-down buffer so a consumer interrupted by `stop()` can
    /// return its process for the next run. Never exceeds capacity: when the
    /// buffer has filled up since the take, the process is handed back.
    pub(crate) fn restore_front(&self, process: Process) -> Result<(), Process> {
        let mut state = self.inner.state.lock();
        if state.items.len() >= self.inner.capacity {
            return Err(process);
        }
        debug!(process_id = process.id(), "Process returned to buffer head");
        state.items.push_front(process);
        let ready = state.head_ready() && !state.shut_down;
        drop(state);
        if ready {
            self.inner.ready.notify_one();
        }
        Ok(())
    }

    /// Revoke a shutdown, keeping the contents
    pub fn reopen(&self) {
        self.inner.state.lock().shut_down = false;
    }

    /// Drop the contents and revoke any shutdown
    pub fn clear(&self) {
        {
            let mut state = self.inner.state.lock();
            state.items.clear();
            state.shut_down = false;
        }
        self.inner.not_full.notify_all();
        debug!("Hand-off buffer cleared");
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        let state = self.inner.state.lock();
        BufferSnapshot {
            capacity: self.inner.capacity,
            items: state.items.iter().map(Process::snapshot).collect(),
            shut_down: state.shut_down,
        }
    }
}
