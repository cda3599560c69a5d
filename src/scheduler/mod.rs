/*!
 * Scheduler Module
 * FIFO scheduling queue and process spawner
 */

pub mod queue;
pub mod spawner;
pub mod types;

// Re-export for convenience
pub use queue::{QueueGuard, ScheduleQueue};
pub use spawner::Spawner;
pub use types::*;
