/*!
 * Memory Types
 * Common types for the memory pool
 */

use crate::core::types::MemoryUnits;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Insufficient memory: requested {requested}, available {available} ({capacity} total)")]
    Insufficient {
        requested: MemoryUnits,
        available: MemoryUnits,
        capacity: MemoryUnits,
    },
}

/// Memory statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub capacity: MemoryUnits,
    pub used: MemoryUnits,
    pub available: MemoryUnits,
    pub usage_percentage: f64,
}
