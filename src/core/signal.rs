/*!
 * Stop Signal
 * Cooperative cancellation flag that sleeping threads can wait on
 */

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Default)]
struct SignalState {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

/// Shared stop flag
///
/// Unlike a bare `AtomicBool`, a stopped signal also wakes threads parked in
/// [`StopSignal::sleep`], so simulated delays end promptly on shutdown.
#[derive(Clone, Default)]
pub struct StopSignal {
    state: Arc<SignalState>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        *self.state.stopped.lock() = true;
        self.state.condvar.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        *self.state.stopped.lock()
    }

    /// Sleep for `duration` unless stopped first
    ///
    /// Returns `true` if the full duration elapsed, `false` if the signal
    /// fired.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut stopped = self.state.stopped.lock();
        while !*stopped {
            if self.state.condvar.wait_until(&mut stopped, deadline).timed_out() {
                return !*stopped;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sleep_runs_full_duration() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(signal.sleep(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_stop_interrupts_sleep() {
        let signal = StopSignal::new();
        let sleeper = {
            let signal = signal.clone();
            thread::spawn(move || {
                let start = Instant::now();
                (signal.sleep(Duration::from_secs(10)), start.elapsed())
            })
        };
        thread::sleep(Duration::from_millis(20));
        signal.stop();
        let (completed, elapsed) = sleeper.join().unwrap();
        assert!(!completed);
        assert!(elapsed < Duration::from_secs(5));
        assert!(signal.is_stopped());
    }
}
