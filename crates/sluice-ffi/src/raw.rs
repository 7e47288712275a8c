//! Adapters from C-side handles to core sample regions.
//!
//! Direct regions arrive as `(pointer, length)` pairs and become zero-copy
//! slices after a null/alignment/size check. Array-copy regions arrive as a
//! [`SluiceArrayOps`] callback table: the host runtime keeps ownership of
//! the array and moves samples only through its own region-copy calls.

use std::ffi::c_void;
use std::mem::{align_of, size_of};

use sluice_core::{ArrayAccess, TransferError};

/// Reject null, misaligned, or address-space-overflowing regions.
fn check_pointer(addr: usize, len: usize) -> Result<(), TransferError> {
    if addr == 0 {
        return Err(TransferError::InvalidRegion {
            reason: "sample pointer is null".into(),
        });
    }
    if addr % align_of::<f32>() != 0 {
        return Err(TransferError::InvalidRegion {
            reason: format!("sample pointer {addr:#x} is not f32-aligned"),
        });
    }
    if len > isize::MAX as usize / size_of::<f32>() {
        return Err(TransferError::InvalidRegion {
            reason: format!("region length {len} overflows the address space"),
        });
    }
    Ok(())
}

/// Borrow `len` samples at `ptr` as a read-only slice.
///
/// # Safety
///
/// If `ptr` is non-null it must point to `len` initialised `f32` values that
/// stay valid and unaliased by writers for `'a`.
#[allow(unsafe_code)]
pub(crate) unsafe fn direct_slice<'a>(
    ptr: *const f32,
    len: usize,
) -> Result<&'a [f32], TransferError> {
    check_pointer(ptr as usize, len)?;
    // SAFETY: non-null, aligned, size-checked; validity per caller contract.
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Borrow `len` samples at `ptr` as a mutable slice.
///
/// # Safety
///
/// If `ptr` is non-null it must point to `len` `f32` values that stay valid
/// and are not accessed through any other path for `'a`.
#[allow(unsafe_code)]
pub(crate) unsafe fn direct_slice_mut<'a>(
    ptr: *mut f32,
    len: usize,
) -> Result<&'a mut [f32], TransferError> {
    check_pointer(ptr as usize, len)?;
    // SAFETY: non-null, aligned, size-checked; exclusivity per caller contract.
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

/// Region-copy callbacks for a runtime-owned array.
///
/// Each callback receives `user_data` first. `get_region_fn` copies `len`
/// samples starting at `start` out of the array into `buf`; `set_region_fn`
/// copies `len` samples from `buf` into the array at `start`. Both return 0
/// on success and any other value on failure. Only the callbacks the
/// requested direction needs must be set: writes need `length_fn` and
/// `get_region_fn`, reads need `length_fn` and `set_region_fn`.
#[repr(C)]
pub struct SluiceArrayOps {
    /// Opaque runtime pointer passed back to every callback.
    pub user_data: *mut c_void,
    /// Number of samples in the array: `(user_data) -> len`.
    pub length_fn: Option<unsafe extern "C" fn(*mut c_void) -> usize>,
    /// Copy out of the array: `(user_data, start, len, buf) -> status`.
    pub get_region_fn: Option<unsafe extern "C" fn(*mut c_void, usize, usize, *mut f32) -> i32>,
    /// Copy into the array: `(user_data, start, len, buf) -> status`.
    pub set_region_fn:
        Option<unsafe extern "C" fn(*mut c_void, usize, usize, *const f32) -> i32>,
}

/// Which way samples move through a [`CallbackArray`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Array → scratch (needs `get_region_fn`).
    IntoScratch,
    /// Scratch → array (needs `set_region_fn`).
    OutOfScratch,
}

/// [`ArrayAccess`] implementation dispatching to a [`SluiceArrayOps`] table.
pub(crate) struct CallbackArray<'a> {
    ops: &'a SluiceArrayOps,
    length_fn: unsafe extern "C" fn(*mut c_void) -> usize,
}

impl<'a> CallbackArray<'a> {
    /// Validate that `ops` carries the callbacks `direction` needs.
    ///
    /// # Safety
    ///
    /// If `ops` is non-null it must point to a valid `SluiceArrayOps` whose
    /// callbacks and `user_data` stay valid for `'a`.
    #[allow(unsafe_code)]
    pub(crate) unsafe fn resolve(
        ops: *const SluiceArrayOps,
        direction: Direction,
    ) -> Result<Self, TransferError> {
        if ops.is_null() {
            return Err(TransferError::InvalidRegion {
                reason: "array ops table is null".into(),
            });
        }
        // SAFETY: non-null; validity per caller contract.
        let ops = unsafe { &*ops };
        let length_fn = ops.length_fn.ok_or_else(|| TransferError::InvalidRegion {
            reason: "length_fn is not set".into(),
        })?;
        let copy_fn_set = match direction {
            Direction::IntoScratch => ops.get_region_fn.is_some(),
            Direction::OutOfScratch => ops.set_region_fn.is_some(),
        };
        if !copy_fn_set {
            return Err(TransferError::InvalidRegion {
                reason: format!("{direction:?} transfer requires its region callback"),
            });
        }
        Ok(Self { ops, length_fn })
    }
}

fn callback_result(name: &str, rc: i32) -> Result<(), TransferError> {
    if rc == 0 {
        Ok(())
    } else {
        Err(TransferError::ArrayAccess {
            reason: format!("{name} returned {rc}"),
        })
    }
}

impl ArrayAccess for CallbackArray<'_> {
    #[allow(unsafe_code)]
    fn length(&self) -> usize {
        // SAFETY: callback and user_data valid per resolve() contract.
        unsafe { (self.length_fn)(self.ops.user_data) }
    }

    #[allow(unsafe_code)]
    fn get_region(&self, start: usize, buf: &mut [f32]) -> Result<(), TransferError> {
        let get = self.ops.get_region_fn.ok_or_else(|| TransferError::InvalidRegion {
            reason: "get_region_fn is not set".into(),
        })?;
        // SAFETY: buf is a live Rust slice of buf.len() samples.
        let rc = unsafe { get(self.ops.user_data, start, buf.len(), buf.as_mut_ptr()) };
        callback_result("get_region_fn", rc)
    }

    #[allow(unsafe_code)]
    fn set_region(&mut self, start: usize, buf: &[f32]) -> Result<(), TransferError> {
        let set = self.ops.set_region_fn.ok_or_else(|| TransferError::InvalidRegion {
            reason: "set_region_fn is not set".into(),
        })?;
        // SAFETY: buf is a live Rust slice of buf.len() samples.
        let rc = unsafe { set(self.ops.user_data, start, buf.len(), buf.as_ptr()) };
        callback_result("set_region_fn", rc)
    }
}
