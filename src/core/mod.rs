/*!
 * Core Module
 * Shared types, limits, error handling and thread plumbing
 */

pub mod errors;
pub mod limits;
pub mod signal;
pub mod thread;
pub mod types;

// Re-export for convenience
pub use errors::*;
pub use signal::StopSignal;
pub use thread::{join_until, panic_message, JoinOutcome};
pub use types::*;
