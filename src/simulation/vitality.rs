/*!
 * Vitality
 * Shared health counter; reaching zero ends the run
 */

use std::sync::atomic::{AtomicI64, Ordering};

/// Result of applying a penalty
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Penalty {
    pub remaining: i64,
    /// Set only on the call that took vitality to zero
    pub depleted_now: bool,
}

#[derive(Debug)]
pub struct Vitality {
    value: AtomicI64,
    initial: i64,
}

impl Vitality {
    pub fn new(initial: i64) -> Self {
        Self {
            value: AtomicI64::new(initial),
            initial,
        }
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Acquire)
    }

    pub fn is_depleted(&self) -> bool {
        self.get() <= 0
    }

    /// Subtract `amount`, clamping at zero
    pub fn penalize(&self, amount: i64) -> Penalty {
        let amount = amount.max(0);
        // fetch_update with a closure that always returns Some cannot fail
        let previous = match self.value.fetch_update(Ordering::AcqRel, Ordering::Acquire, |v| {
            Some((v - amount).max(0))
        }) {
            Ok(v) | Err(v) => v,
        };
        let remaining = (previous - amount).max(0);
        Penalty {
            remaining,
            depleted_now: previous > 0 && remaining == 0,
        }
    }

    pub fn reset(&self) {
        self.value.store(self.initial, Ordering::Release);
    }
}
