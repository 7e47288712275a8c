//! C FFI bindings for the Sluice scratch transfer buffer.
//!
//! Exposes scratch buffers as opaque `u64` handles plus the four transfer
//! entry points (direct write/read, array-copy write/read) and the direct
//! Euclidean norm. Every entry point returns an `i32` [`SluiceStatus`]
//! instead of aborting the host process, and catches panics before they
//! cross the boundary.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body returning an `i32` status, mapping a panic to
/// [`SluiceStatus::Panicked`].
macro_rules! ffi_guard {
    ($body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(code) => code,
            Err(_) => {
                log::warn!("sluice: panic caught at the C boundary");
                $crate::status::SluiceStatus::Panicked as i32
            }
        }
    };
}

/// Like `ffi_guard!` for entry points returning a bare value; a panic
/// yields `$fallback`.
macro_rules! ffi_guard_or {
    ($fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(_) => {
                log::warn!("sluice: panic caught at the C boundary");
                $fallback
            }
        }
    };
}

/// Lock a mutex inside an `ffi_guard!` body, returning
/// [`SluiceStatus::InternalError`] if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::SluiceStatus::InternalError as i32,
        }
    };
}

/// Unwrap a `Result<T, TransferError>` inside an `ffi_guard!` body,
/// returning the matching status code on error.
macro_rules! ffi_try {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => return $crate::status::SluiceStatus::from(&e) as i32,
        }
    };
}

mod handle;
pub mod norm;
pub mod raw;
pub mod scratch;
pub mod status;

pub use norm::{sluice_norm, sluice_norm_direct};
pub use raw::SluiceArrayOps;
pub use scratch::{
    sluice_read_array, sluice_read_direct, sluice_scratch_capacity_get, sluice_scratch_create,
    sluice_scratch_destroy, sluice_write_array, sluice_write_direct,
};
pub use status::SluiceStatus;
