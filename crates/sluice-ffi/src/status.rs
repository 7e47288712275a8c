//! C-compatible status codes.
//!
//! [`SluiceStatus`] is a `repr(i32)` enum covering every condition a
//! boundary call can report. Conversions from the core error types are
//! provided so entry points can `?`-style map failures to codes.

use sluice_core::{ConfigError, TransferError};

/// C-compatible status code returned by all FFI functions.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SluiceStatus {
    /// Success.
    Ok = 0,
    /// Scratch handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// External region could not be resolved (null or misaligned pointer,
    /// missing callback).
    InvalidRegion = -2,
    /// Requested count exceeds the scratch capacity.
    CapacityExceeded = -3,
    /// Requested count exceeds the external region's length.
    RegionTooShort = -4,
    /// A runtime region-copy callback reported failure.
    ArrayAccessFailed = -5,
    /// Scratch configuration is invalid.
    ConfigError = -6,
    /// An output pointer is null or an argument is otherwise unusable.
    InvalidArgument = -7,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -8,
    /// The scratch buffer is in use by a call that is running a host
    /// callback on this thread, so waiting for it would never return.
    Busy = -9,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&TransferError> for SluiceStatus {
    fn from(e: &TransferError) -> Self {
        match e {
            TransferError::CapacityExceeded { .. } => SluiceStatus::CapacityExceeded,
            TransferError::InvalidRegion { .. } => SluiceStatus::InvalidRegion,
            TransferError::RegionTooShort { .. } => SluiceStatus::RegionTooShort,
            TransferError::ArrayAccess { .. } => SluiceStatus::ArrayAccessFailed,
        }
    }
}

impl From<&ConfigError> for SluiceStatus {
    fn from(_e: &ConfigError) -> Self {
        SluiceStatus::ConfigError
    }
}
