//! Euclidean norm over a caller-supplied direct region.
//!
//! The norm reads the caller's samples in place; no scratch buffer is
//! involved, so `count` is bounded by `src_len` alone.

use sluice_core::{region_norm, DirectRegion};

use crate::raw::direct_slice;
use crate::status::SluiceStatus;

/// Euclidean norm of `src[..count]`, written to `*out`.
///
/// Returns `InvalidRegion` for a null or misaligned `src`, `RegionTooShort`
/// if `count > src_len`, and `InvalidArgument` if `out` is null. `*out` is
/// only written on success.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_norm_direct(
    src: *const f32,
    src_len: usize,
    count: usize,
    out: *mut f32,
) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return SluiceStatus::InvalidArgument as i32;
        }
        // SAFETY: src points to src_len valid samples per caller contract.
        let view = ffi_try!(unsafe { direct_slice(src, src_len) });
        let norm = ffi_try!(region_norm(&DirectRegion::new(view), count));
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = norm };
        SluiceStatus::Ok as i32
    })
}

/// Euclidean norm of `src[..count]`.
///
/// **Ambiguity warning:** returns `0.0` both for an all-zero region and for
/// any rejected call. Prefer [`sluice_norm_direct`] for unambiguous error
/// detection.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_norm(src: *const f32, src_len: usize, count: usize) -> f32 {
    ffi_guard_or!(0.0, {
        // SAFETY: src points to src_len valid samples per caller contract.
        unsafe { direct_slice(src, src_len) }
            .and_then(|view| region_norm(&DirectRegion::new(view), count))
            .unwrap_or(0.0)
    })
}
