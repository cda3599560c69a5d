/*!
 * Simulation
 * The orchestrator and everything needed to configure and observe it
 */

mod actions;
pub mod builder;
pub mod config;
pub mod engine;
pub mod snapshot;
pub mod vitality;

// Re-export for convenience
pub use builder::SimulationBuilder;
pub use config::SimConfig;
pub use engine::Simulation;
pub use snapshot::{SimSnapshot, TickReport};
pub use vitality::{Penalty, Vitality};
