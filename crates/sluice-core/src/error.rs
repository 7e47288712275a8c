//! Error types for scratch transfers and configuration.
//!
//! Every condition the boundary used to treat as fatal is a variant here,
//! so callers on either side of the interop layer can decide how to react.

use std::error::Error;
use std::fmt;

/// Errors from a transfer or reduction against a sample region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferError {
    /// The requested count is larger than the scratch buffer can hold.
    CapacityExceeded {
        /// Number of samples the caller asked to move.
        requested: usize,
        /// Fixed capacity of the scratch buffer.
        capacity: usize,
    },
    /// The external region could not be resolved to accessible memory.
    InvalidRegion {
        /// Why the region was rejected.
        reason: String,
    },
    /// The external region holds fewer samples than requested.
    RegionTooShort {
        /// Number of samples the caller asked to move.
        requested: usize,
        /// Number of samples the region actually holds.
        available: usize,
    },
    /// The runtime-mediated copy call reported a failure.
    ArrayAccess {
        /// Description reported by the runtime adapter.
        reason: String,
    },
}

impl TransferError {
    pub(crate) fn invalid_region(reason: impl Into<String>) -> Self {
        Self::InvalidRegion {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => write!(
                f,
                "count {requested} exceeds the scratch capacity of {capacity}"
            ),
            Self::InvalidRegion { reason } => write!(f, "invalid region: {reason}"),
            Self::RegionTooShort {
                requested,
                available,
            } => write!(
                f,
                "region holds {available} samples but {requested} were requested"
            ),
            Self::ArrayAccess { reason } => write!(f, "array copy failed: {reason}"),
        }
    }
}

impl Error for TransferError {}

/// Errors detected during [`ScratchConfig::validate()`](crate::ScratchConfig::validate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Capacity is zero.
    ZeroCapacity,
    /// Capacity is above [`CAPACITY_LIMIT`](crate::CAPACITY_LIMIT).
    CapacityTooLarge {
        /// The configured capacity.
        configured: usize,
        /// The largest accepted capacity.
        limit: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "scratch capacity must be at least 1"),
            Self::CapacityTooLarge { configured, limit } => {
                write!(f, "scratch capacity {configured} exceeds the limit of {limit}")
            }
        }
    }
}

impl Error for ConfigError {}
