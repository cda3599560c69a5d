/*!
 * Thread Helpers
 * Bounded joins for worker threads
 */

use super::limits::JOIN_POLL_INTERVAL;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::warn;

/// How a bounded join ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Thread exited normally
    Joined,
    /// Thread exited by panicking
    Panicked,
    /// Deadline passed; the thread was detached
    Detached,
}

/// Join `handle`, giving up at `deadline`
///
/// Rust threads cannot be cancelled from outside, so a thread still running
/// at the deadline is detached and left to observe its stop signal.
pub fn join_until(handle: JoinHandle<()>, deadline: Instant) -> JoinOutcome {
    let name = handle.thread().name().unwrap_or("<unnamed>").to_string();
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(thread = %name, "Thread did not exit before deadline, detaching");
            return JoinOutcome::Detached;
        }
        thread::sleep(JOIN_POLL_INTERVAL);
    }
    match handle.join() {
        Ok(()) => JoinOutcome::Joined,
        Err(_) => {
            warn!(thread = %name, "Thread panicked before join");
            JoinOutcome::Panicked
        }
    }
}

/// Extract a printable message from a panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
