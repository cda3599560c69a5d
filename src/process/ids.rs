/*!
 * Process ID Allocation
 * Monotonic id counter owned by the simulation, reset between runs
 */

use crate::core::types::ProcessId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Shared monotonic id counter
///
/// Cloning shares the counter, so the spawner and manual injection draw from
/// one sequence.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: Arc<AtomicU64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id; the first id handed out after a reset is 1
    #[inline]
    pub fn next(&self) -> ProcessId {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Last id handed out (0 if none)
    pub fn last(&self) -> ProcessId {
        self.last.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.last.store(0, Ordering::Relaxed);
    }
}
