//! Scratch buffer FFI: create, destroy, capacity, and the four transfers.
//!
//! Each scratch buffer lives behind its own `Arc<Mutex<_>>` so the global
//! `SCRATCHES` table lock is only held for handle lookup. Two callers using
//! the same handle are serialised by the per-buffer lock; callers on
//! different handles never contend.
//!
//! Array-copy transfers run host callbacks while the buffer is locked. A
//! callback that calls back into Sluice must not wait on a lock: the same
//! handle is reported as `Busy` straight away, and any other handle is
//! only taken if it is free right now.
//!
//! Every transfer checks, in order: the handle, the count against the
//! scratch capacity, the external region, then the count against the
//! region length. A rejected call leaves the scratch buffer unchanged.

use std::cell::RefCell;
use std::sync::{Arc, Mutex, TryLockError};

use sluice_core::{
    ArrayRegion, DirectRegion, DirectRegionMut, ScratchBuffer, ScratchConfig, MAX_CYCLE_LENGTH,
};

use crate::handle::HandleTable;
use crate::raw::{direct_slice, direct_slice_mut, CallbackArray, Direction, SluiceArrayOps};
use crate::status::SluiceStatus;

type ScratchArc = Arc<Mutex<ScratchBuffer>>;

static SCRATCHES: Mutex<HandleTable<ScratchArc>> = Mutex::new(HandleTable::new());

thread_local! {
    /// Handles whose buffer lock this thread currently holds.
    static HELD: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Marks a handle as held by the current thread until dropped.
struct HeldMark(u64);

impl HeldMark {
    fn new(handle: u64) -> Self {
        HELD.with_borrow_mut(|held| held.push(handle));
        HeldMark(handle)
    }
}

impl Drop for HeldMark {
    fn drop(&mut self) {
        HELD.with_borrow_mut(|held| {
            if let Some(pos) = held.iter().rposition(|&h| h == self.0) {
                held.swap_remove(pos);
            }
        });
    }
}

/// Clone the Arc for a scratch handle, briefly locking the global table.
///
/// Returns `None` if the handle is invalid or the mutex is poisoned.
fn get_scratch(handle: u64) -> Option<ScratchArc> {
    SCRATCHES.lock().ok()?.get(handle).cloned()
}

/// Look up and lock `handle`, then run `body` on its buffer.
///
/// Returns `Busy` instead of blocking when this thread already holds the
/// handle, or when it holds some other handle and `handle` is taken.
fn with_scratch(handle: u64, body: impl FnOnce(&mut ScratchBuffer) -> i32) -> i32 {
    let scratch_arc = match get_scratch(handle) {
        Some(arc) => arc,
        None => return SluiceStatus::InvalidHandle as i32,
    };
    let (reentrant, nested) = HELD.with_borrow(|held| (held.contains(&handle), !held.is_empty()));
    if reentrant {
        log::debug!("sluice: handle {handle:#x} re-entered from its own callback");
        return SluiceStatus::Busy as i32;
    }
    let mut scratch = if nested {
        match scratch_arc.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                log::debug!("sluice: handle {handle:#x} is locked; not waiting inside a callback");
                return SluiceStatus::Busy as i32;
            }
            Err(TryLockError::Poisoned(_)) => return SluiceStatus::InternalError as i32,
        }
    } else {
        ffi_lock!(scratch_arc)
    };
    let _held = HeldMark::new(handle);
    body(&mut *scratch)
}

/// Create a zeroed scratch buffer holding `capacity` samples.
///
/// `capacity == 0` selects the default of 4096. On success writes the new
/// handle to `scratch_out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_scratch_create(capacity: usize, scratch_out: *mut u64) -> i32 {
    ffi_guard!({
        if scratch_out.is_null() {
            return SluiceStatus::InvalidArgument as i32;
        }
        let capacity = if capacity == 0 {
            MAX_CYCLE_LENGTH
        } else {
            capacity
        };
        let scratch = match ScratchBuffer::with_config(ScratchConfig::with_capacity(capacity)) {
            Ok(s) => s,
            Err(e) => {
                log::debug!("sluice: scratch creation rejected: {e}");
                return SluiceStatus::from(&e) as i32;
            }
        };
        let handle = ffi_lock!(SCRATCHES).insert(Arc::new(Mutex::new(scratch)));
        // SAFETY: scratch_out is non-null and valid per caller contract.
        unsafe { *scratch_out = handle };
        SluiceStatus::Ok as i32
    })
}

/// Destroy a scratch buffer. Destroying twice returns `InvalidHandle`.
///
/// A transfer already running on the handle finishes on its own reference
/// to the buffer.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_scratch_destroy(scratch_handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(SCRATCHES).remove(scratch_handle) {
            Some(_) => SluiceStatus::Ok as i32,
            None => SluiceStatus::InvalidHandle as i32,
        }
    })
}

/// Write the scratch buffer's fixed capacity to `*out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_scratch_capacity_get(scratch_handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return SluiceStatus::InvalidArgument as i32;
        }
        with_scratch(scratch_handle, |scratch| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = scratch.capacity() };
            SluiceStatus::Ok as i32
        })
    })
}

/// Copy `count` samples from the direct region `src[..src_len]` into the
/// scratch buffer.
///
/// Samples past `count` in the scratch buffer keep their previous values.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_write_direct(
    scratch_handle: u64,
    src: *const f32,
    src_len: usize,
    count: usize,
) -> i32 {
    ffi_guard!({
        with_scratch(scratch_handle, |scratch| {
            ffi_try!(scratch.check_count(count));
            // SAFETY: src points to src_len valid samples per caller contract.
            let view = ffi_try!(unsafe { direct_slice(src, src_len) });
            ffi_try!(scratch.write_from(&DirectRegion::new(view), count));
            SluiceStatus::Ok as i32
        })
    })
}

/// Copy the first `count` scratch samples into the direct region
/// `dst[..dst_len]`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_read_direct(
    scratch_handle: u64,
    dst: *mut f32,
    dst_len: usize,
    count: usize,
) -> i32 {
    ffi_guard!({
        with_scratch(scratch_handle, |scratch| {
            ffi_try!(scratch.check_count(count));
            // SAFETY: dst points to dst_len writable samples per caller contract.
            let view = ffi_try!(unsafe { direct_slice_mut(dst, dst_len) });
            ffi_try!(scratch.read_into(&mut DirectRegionMut::new(view), count));
            SluiceStatus::Ok as i32
        })
    })
}

/// Copy `count` samples from a runtime-owned array into the scratch buffer
/// through `ops.get_region_fn`.
///
/// The scratch buffer is only updated after the runtime reports success.
/// Calls made from inside the callbacks on the same handle return `Busy`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_write_array(
    scratch_handle: u64,
    ops: *const SluiceArrayOps,
    count: usize,
) -> i32 {
    ffi_guard!({
        with_scratch(scratch_handle, |scratch| {
            ffi_try!(scratch.check_count(count));
            // SAFETY: ops is valid for the duration of this call per caller contract.
            let array = ffi_try!(unsafe { CallbackArray::resolve(ops, Direction::IntoScratch) });
            ffi_try!(scratch.write_from(&ArrayRegion::new(array), count));
            SluiceStatus::Ok as i32
        })
    })
}

/// Copy the first `count` scratch samples into a runtime-owned array
/// through `ops.set_region_fn`.
///
/// Calls made from inside the callbacks on the same handle return `Busy`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn sluice_read_array(
    scratch_handle: u64,
    ops: *const SluiceArrayOps,
    count: usize,
) -> i32 {
    ffi_guard!({
        with_scratch(scratch_handle, |scratch| {
            ffi_try!(scratch.check_count(count));
            // SAFETY: ops is valid for the duration of this call per caller contract.
            let array = ffi_try!(unsafe { CallbackArray::resolve(ops, Direction::OutOfScratch) });
            ffi_try!(scratch.read_into(&mut ArrayRegion::new(array), count));
            SluiceStatus::Ok as i32
        })
    })
}
