//! A host-side array reachable only through a C callback table.
//!
//! [`HostArray`] plays the managed runtime in tests and benches of the C
//! entry points: `sluice_write_array` / `sluice_read_array` see nothing but
//! the [`SluiceArrayOps`] it hands out.

use std::ffi::c_void;

use sluice_ffi::SluiceArrayOps;

/// Samples owned by the "runtime", exposed through region-copy callbacks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HostArray {
    samples: Vec<f32>,
}

impl HostArray {
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0.0; len])
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Callback table pointing at `self`.
    ///
    /// The table holds a raw pointer: `self` must stay in place and must not
    /// be touched through any other path while a call uses the table.
    pub fn ops(&mut self) -> SluiceArrayOps {
        SluiceArrayOps {
            user_data: self as *mut HostArray as *mut c_void,
            length_fn: Some(host_len),
            get_region_fn: Some(host_get_region),
            set_region_fn: Some(host_set_region),
        }
    }
}

#[allow(unsafe_code)]
unsafe extern "C" fn host_len(user_data: *mut c_void) -> usize {
    // SAFETY: user_data comes from HostArray::ops.
    unsafe { (*(user_data as *const HostArray)).samples.len() }
}

#[allow(unsafe_code)]
unsafe extern "C" fn host_get_region(
    user_data: *mut c_void,
    start: usize,
    len: usize,
    buf: *mut f32,
) -> i32 {
    // SAFETY: user_data comes from HostArray::ops.
    let host = unsafe { &*(user_data as *const HostArray) };
    let Some(src) = start.checked_add(len).and_then(|end| host.samples.get(start..end)) else {
        return -1;
    };
    if len > 0 {
        // SAFETY: buf holds len writable samples per the callback contract.
        unsafe { std::slice::from_raw_parts_mut(buf, len) }.copy_from_slice(src);
    }
    0
}

#[allow(unsafe_code)]
unsafe extern "C" fn host_set_region(
    user_data: *mut c_void,
    start: usize,
    len: usize,
    buf: *const f32,
) -> i32 {
    // SAFETY: user_data comes from HostArray::ops.
    let host = unsafe { &mut *(user_data as *mut HostArray) };
    let Some(dst) = start
        .checked_add(len)
        .and_then(|end| host.samples.get_mut(start..end))
    else {
        return -1;
    };
    if len > 0 {
        // SAFETY: buf holds len readable samples per the callback contract.
        dst.copy_from_slice(unsafe { std::slice::from_raw_parts(buf, len) });
    }
    0
}
