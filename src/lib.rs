/*!
 * Scheduler Simulation Kernel
 * CPU/IO/memory scheduling game engine exposed as a library
 */

pub mod autopilot;
pub mod buffer;
pub mod consumer;
pub mod core;
pub mod cpu;
pub mod memory;
pub mod monitoring;
pub mod process;
pub mod scheduler;
pub mod simulation;

// Re-exports
pub use autopilot::{Autopilot, AutopilotStep};
pub use buffer::{BufferError, BufferSnapshot, HandoffBuffer, PutError};
pub use consumer::{ConsumerConfig, ConsumerPool, ConsumerSnapshot, ConsumptionHandler};
pub use crate::core::errors::{ActionRejection, ConfigError, SimError, SimResult};
pub use cpu::{CoreSnapshot, CpuCore, IoSlot, IoSlotSnapshot};
pub use memory::{MemoryError, MemoryPool, MemoryStats};
pub use monitoring::{init_tracing, EventBus, SimEvent, SimStatsSnapshot, StopReason};
pub use process::{Phase, Process, ProcessSnapshot, ProcessSpec, ProcessState};
pub use scheduler::{ScheduleQueue, SpawnConfig};
pub use simulation::{SimConfig, SimSnapshot, Simulation, SimulationBuilder, TickReport};
