/*!
 * Memory Pool
 * Capacity-bounded integer allocator shared by the cores
 */

use super::types::{MemoryError, MemoryResult, MemoryStats};
use crate::core::types::MemoryUnits;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Simulated memory pool
///
/// All operations run under one mutex, so a check followed by an allocate in
/// another thread can still fail; callers that need check-then-commit use
/// [`MemoryPool::allocate`] directly and treat its error as the check.
#[derive(Debug, Clone)]
pub struct MemoryPool {
    capacity: MemoryUnits,
    available: Arc<Mutex<MemoryUnits>>,
}

impl MemoryPool {
    pub fn new(capacity: MemoryUnits) -> Self {
        debug!(capacity, "Memory pool initialized");
        Self {
            capacity,
            available: Arc::new(Mutex::new(capacity)),
        }
    }

    pub fn capacity(&self) -> MemoryUnits {
        self.capacity
    }

    pub fn available(&self) -> MemoryUnits {
        *self.available.lock()
    }

    pub fn used(&self) -> MemoryUnits {
        self.capacity - self.available()
    }

    /// Non-mutating capacity check
    pub fn has_capacity(&self, amount: MemoryUnits) -> bool {
        *self.available.lock() >= amount
    }

    /// Reserve `amount`; on failure the pool is unchanged
    pub fn allocate(&self, amount: MemoryUnits) -> MemoryResult<()> {
        let mut available = self.available.lock();
        if *available < amount {
            let err = MemoryError::Insufficient {
                requested: amount,
                available: *available,
                capacity: self.capacity,
            };
            drop(available);
            debug!(error = %err, "Allocation refused");
            return Err(err);
        }
        *available -= amount;
        debug!(amount, available = *available, "Allocated memory");
        Ok(())
    }

    /// Return `amount` to the pool, clamping at capacity
    pub fn release(&self, amount: MemoryUnits) {
        if amount == 0 {
            return;
        }
        let mut available = self.available.lock();
        let restored = available.saturating_add(amount);
        if restored > self.capacity {
            warn!(
                amount,
                available = restored,
                capacity = self.capacity,
                "Released more memory than capacity, clamping"
            );
            *available = self.capacity;
        } else {
            *available = restored;
        }
        debug!(amount, available = *available, "Released memory");
    }

    /// Restore full capacity
    pub fn reset(&self) {
        *self.available.lock() = self.capacity;
    }

    pub fn stats(&self) -> MemoryStats {
        let available = self.available();
        let used = self.capacity - available;
        let usage_percentage = if self.capacity == 0 {
            0.0
        } else {
            used as f64 / self.capacity as f64 * 100.0
        };
        MemoryStats {
            capacity: self.capacity,
            used,
            available,
            usage_percentage,
        }
    }
}
