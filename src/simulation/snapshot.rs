/*!
 * Snapshots
 * Read-only views handed to the display layer
 */

use crate::buffer::BufferSnapshot;
use crate::consumer::ConsumerSnapshot;
use crate::core::types::ProcessId;
use crate::cpu::{CoreSnapshot, IoSlotSnapshot};
use crate::memory::MemoryStats;
use crate::monitoring::{SimStatsSnapshot, StopReason};
use crate::process::ProcessSnapshot;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything a frame needs to draw, captured component by component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    pub running: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    pub vitality: i64,
    pub score: u64,
    pub memory: MemoryStats,
    pub cores: Vec<CoreSnapshot>,
    pub io_slot: IoSlotSnapshot,
    pub queue: Vec<ProcessSnapshot>,
    pub buffer: BufferSnapshot,
    pub consumers: Vec<ConsumerSnapshot>,
    pub stats: SimStatsSnapshot,
}

impl SimSnapshot {
    /// Memory held by processes on cores or in the IO slot
    pub fn resident_memory(&self) -> u32 {
        self.cores
            .iter()
            .filter_map(|c| c.occupant.as_ref())
            .chain(self.io_slot.occupant.as_ref())
            .map(|p| p.memory)
            .sum()
    }

    pub fn free_cores(&self) -> impl Iterator<Item = &CoreSnapshot> {
        self.cores.iter().filter(|c| c.occupant.is_none())
    }
}

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub expired: Vec<ProcessId>,
    pub spawned: Option<ProcessId>,
    pub completed: Vec<ProcessId>,
    pub io_required: Vec<ProcessId>,
    pub io_completed: Option<ProcessId>,
    /// The buffer head became consumable on this tick
    pub buffer_head_ready: bool,
    pub stopped: Option<StopReason>,
}
