/*!
 * Core Types
 * Common types used across the simulation
 */

/// Process ID type (monotonic, unique within one simulation run)
pub type ProcessId = u64;

/// CPU core index
pub type CoreId = usize;

/// Consumer worker index
pub type WorkerId = usize;

/// Simulated memory units (the game talks about GB)
pub type MemoryUnits = u32;

/// Simulated time in seconds
pub type Seconds = f64;

/// Progress through a countdown in `[0.0, 1.0]`
///
/// Returns 1.0 for a zero-length countdown so display code never divides by zero.
#[inline]
pub fn progress_ratio(total: Seconds, remaining: Seconds) -> f64 {
    if total <= 0.0 {
        return 1.0;
    }
    (1.0 - remaining / total).clamp(0.0, 1.0)
}
