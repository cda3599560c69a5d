/*!
 * Process Module
 * Simulated processes, their lifecycle and id allocation
 */

pub mod entity;
pub mod ids;
pub mod types;

// Re-export for convenience
pub use entity::{IoProfile, Process, ProcessKind, ProcessSnapshot, ProcessSpec};
pub use ids::IdAllocator;
pub use types::*;
