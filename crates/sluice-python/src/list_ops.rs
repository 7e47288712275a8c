//! Python lists as runtime-owned sample arrays.
//!
//! A list is never read in place: the native side reaches it only through
//! the three C callbacks below, which re-acquire the GIL and copy one
//! region at a time. Any Python exception raised while converting an
//! element is parked in [`ListData`] and re-raised once the FFI call
//! returns.

use std::ffi::c_void;

use pyo3::prelude::*;
use pyo3::types::PyList;

use sluice_ffi::SluiceArrayOps;

/// Per-call state passed to the callbacks as `user_data`.
pub(crate) struct ListData {
    list: Py<PyList>,
    error: Option<PyErr>,
}

impl ListData {
    pub(crate) fn new(list: &Bound<'_, PyList>) -> Self {
        ListData {
            list: list.clone().unbind(),
            error: None,
        }
    }

    /// Callback table pointing at `self`. The table is only valid while
    /// `self` stays in place.
    pub(crate) fn ops(&mut self) -> SluiceArrayOps {
        SluiceArrayOps {
            user_data: self as *mut ListData as *mut c_void,
            length_fn: Some(list_len),
            get_region_fn: Some(list_get_region),
            set_region_fn: Some(list_set_region),
        }
    }

    /// The first Python exception raised inside a callback, if any.
    pub(crate) fn take_error(&mut self) -> Option<PyErr> {
        self.error.take()
    }
}

/// Turn a callback outcome into its C status, parking the first exception
/// in `parked`.
fn settle(parked: &mut Option<PyErr>, result: std::thread::Result<PyResult<()>>) -> i32 {
    match result {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            if parked.is_none() {
                *parked = Some(err);
            }
            -1
        }
        // Panic caught; report as a failed copy.
        Err(_) => -1,
    }
}

#[allow(unsafe_code)]
unsafe extern "C" fn list_len(user_data: *mut c_void) -> usize {
    if user_data.is_null() {
        return 0;
    }
    let data = unsafe { &*(user_data as *const ListData) };
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Python::attach(|py| data.list.bind(py).len())
    }))
    .unwrap_or(0)
}

/// Copy `list[start..start + len]` into `buf`, converting each element to f32.
#[allow(unsafe_code)]
unsafe extern "C" fn list_get_region(
    user_data: *mut c_void,
    start: usize,
    len: usize,
    buf: *mut f32,
) -> i32 {
    if user_data.is_null() || (buf.is_null() && len > 0) {
        return -1;
    }
    let data = unsafe { &mut *(user_data as *mut ListData) };
    let out: &mut [f32] = if len == 0 {
        &mut [][..]
    } else {
        unsafe { std::slice::from_raw_parts_mut(buf, len) }
    };

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Python::attach(|py| -> PyResult<()> {
            let list = data.list.bind(py);
            for (i, slot) in out.iter_mut().enumerate() {
                *slot = list.get_item(start + i)?.extract::<f32>()?;
            }
            Ok(())
        })
    }));
    settle(&mut data.error, result)
}

/// Overwrite `list[start..start + len]` with the samples in `buf`.
#[allow(unsafe_code)]
unsafe extern "C" fn list_set_region(
    user_data: *mut c_void,
    start: usize,
    len: usize,
    buf: *const f32,
) -> i32 {
    if user_data.is_null() || (buf.is_null() && len > 0) {
        return -1;
    }
    let data = unsafe { &mut *(user_data as *mut ListData) };
    let src: &[f32] = if len == 0 {
        &[][..]
    } else {
        unsafe { std::slice::from_raw_parts(buf, len) }
    };

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Python::attach(|py| -> PyResult<()> {
            let list = data.list.bind(py);
            for (i, &v) in src.iter().enumerate() {
                list.set_item(start + i, v)?;
            }
            Ok(())
        })
    }));
    settle(&mut data.error, result)
}
