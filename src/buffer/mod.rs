/*!
 * Buffer Module
 * Bounded hand-off between cores and consumer workers
 */

pub mod handoff;
pub mod types;

// Re-export for convenience
pub use handoff::HandoffBuffer;
pub use types::*;
