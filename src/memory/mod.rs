/*!
 * Memory Module
 * Simulated memory pool
 */

pub mod pool;
pub mod types;

// Re-export for convenience
pub use pool::MemoryPool;
pub use types::*;
