/*!
 * CPU Module
 * Execution resources: cores and the IO slot
 */

pub mod cpu_core;
pub mod io_slot;
pub mod types;

// Re-export for convenience
pub use cpu_core::{CoreGuard, CpuCore};
pub use io_slot::{IoSlot, IoSlotGuard};
pub use types::*;
