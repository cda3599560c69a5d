/*!
 * Monitoring
 * Structured tracing, counters and the event bus
 */

mod events;
mod stats;
mod tracer;

pub use events::{EventBus, SimEvent, StopReason};
pub use stats::{Counter, SimStats, SimStatsSnapshot};
pub use tracer::{generate_run_id, init_tracing, span_operation, OperationSpan};
