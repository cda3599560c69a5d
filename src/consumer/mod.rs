/*!
 * Consumer Module
 * Worker threads that drain the hand-off buffer
 */

pub mod pool;
pub mod types;
pub mod worker;

// Re-export for convenience
pub use pool::{ConsumerPool, PoolShutdown};
pub use types::*;
pub use worker::ConsumerWorker;
