//! Scratch buffer configuration.

use crate::error::ConfigError;

/// Default scratch capacity in samples (one maximal audio cycle).
pub const MAX_CYCLE_LENGTH: usize = 4096;

/// Largest capacity a scratch buffer may be configured with.
pub const CAPACITY_LIMIT: usize = 1 << 20;

/// Construction parameters for a [`ScratchBuffer`](crate::ScratchBuffer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScratchConfig {
    /// Fixed number of samples the buffer holds. Never changes after
    /// construction.
    pub capacity: usize,
}

impl ScratchConfig {
    /// Config with an explicit capacity. Call [`validate`](Self::validate)
    /// (or construct through `ScratchBuffer::with_config`) to check it.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }

    /// Check the capacity is within `1..=CAPACITY_LIMIT`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.capacity > CAPACITY_LIMIT {
            return Err(ConfigError::CapacityTooLarge {
                configured: self.capacity,
                limit: CAPACITY_LIMIT,
            });
        }
        Ok(())
    }
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_CYCLE_LENGTH,
        }
    }
}
