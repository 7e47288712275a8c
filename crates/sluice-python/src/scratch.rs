//! Scratch: Python wrapper around a scratch transfer buffer handle.
//!
//! All FFI calls release the GIL via `py.detach()` so other Python threads
//! can run while samples move. This keeps the GIL and the FFI-internal
//! mutexes (SCRATCHES, per-buffer locks) from deadlocking each other.
//! List transfers re-acquire the GIL inside the region callbacks.

use numpy::{PyReadonlyArray1, PyReadwriteArray1, PyUntypedArrayMethods};
use pyo3::prelude::*;
use pyo3::types::PyList;

use sluice_ffi::{
    sluice_read_array, sluice_read_direct, sluice_scratch_capacity_get, sluice_scratch_create,
    sluice_scratch_destroy, sluice_write_array, sluice_write_direct, SluiceArrayOps,
};

use crate::error::check_status;
use crate::list_ops::ListData;

/// A fixed-capacity scratch buffer of float32 samples.
///
/// NumPy arrays are transferred in place (`write_direct` / `read_direct`);
/// Python lists are transferred element by element through region copies
/// (`write_array` / `read_array`). Samples past the last transfer's count
/// are left as they were.
#[pyclass]
pub(crate) struct Scratch {
    handle: Option<u64>,
}

#[pymethods]
impl Scratch {
    /// Create a scratch buffer.
    ///
    /// Args:
    ///     capacity: Number of samples. 0 selects MAX_CYCLE_LENGTH (4096).
    #[new]
    #[pyo3(signature = (capacity=0))]
    fn new(py: Python<'_>, capacity: usize) -> PyResult<Self> {
        // Release GIL: sluice_scratch_create locks SCRATCHES.
        let (status, handle) = py.detach(|| {
            let mut h: u64 = 0;
            let s = sluice_scratch_create(capacity, &mut h);
            (s, h)
        });
        check_status(status)?;
        Ok(Scratch {
            handle: Some(handle),
        })
    }

    /// Number of samples the buffer holds.
    #[getter]
    fn capacity(&self, py: Python<'_>) -> PyResult<usize> {
        let h = self.require_handle()?;
        let (status, capacity) = py.detach(|| {
            let mut c: usize = 0;
            let s = sluice_scratch_capacity_get(h, &mut c);
            (s, c)
        });
        check_status(status)?;
        Ok(capacity)
    }

    /// Copy the first `count` samples of a NumPy array into the buffer.
    ///
    /// Args:
    ///     samples: C-contiguous float32 array.
    ///     count: Samples to copy. Defaults to ``len(samples)``.
    ///
    /// Raises:
    ///     ValueError: If `count` exceeds the capacity or ``len(samples)``,
    ///         or if `samples` is not contiguous.
    #[pyo3(signature = (samples, count=None))]
    fn write_direct(
        &self,
        py: Python<'_>,
        samples: PyReadonlyArray1<'_, f32>,
        count: Option<usize>,
    ) -> PyResult<()> {
        let h = self.require_handle()?;
        // A non-contiguous array passes a null address; the FFI reports
        // it as an invalid region after the capacity check.
        let len = samples.len();
        let addr = match samples.as_slice() {
            Ok(s) => s.as_ptr() as usize,
            Err(_) => 0usize,
        };
        let count = count.unwrap_or(len);
        // Release GIL: sluice_write_direct locks SCRATCHES + the buffer.
        let status = py.detach(|| sluice_write_direct(h, addr as *const f32, len, count));
        check_status(status)
    }

    /// Copy the first `count` buffer samples into a NumPy array.
    ///
    /// Args:
    ///     out: Writable C-contiguous float32 array.
    ///     count: Samples to copy. Defaults to ``len(out)``.
    #[pyo3(signature = (out, count=None))]
    fn read_direct(
        &self,
        py: Python<'_>,
        mut out: PyReadwriteArray1<'_, f32>,
        count: Option<usize>,
    ) -> PyResult<()> {
        let h = self.require_handle()?;
        let len = out.len();
        let addr = match out.as_slice_mut() {
            Ok(s) => s.as_mut_ptr() as usize,
            Err(_) => 0usize,
        };
        let count = count.unwrap_or(len);
        // Release GIL: sluice_read_direct locks SCRATCHES + the buffer.
        let status = py.detach(|| sluice_read_direct(h, addr as *mut f32, len, count));
        check_status(status)
    }

    /// Copy the first `count` elements of a list into the buffer.
    ///
    /// Elements are converted to float32. If any element fails to convert
    /// the buffer is left unchanged and the conversion error is raised.
    #[pyo3(signature = (samples, count=None))]
    fn write_array(
        &self,
        py: Python<'_>,
        samples: &Bound<'_, PyList>,
        count: Option<usize>,
    ) -> PyResult<()> {
        let count = count.unwrap_or(samples.len());
        self.transfer_list(py, samples, |h, ops| sluice_write_array(h, ops, count))
    }

    /// Overwrite the first `count` elements of a list with buffer samples.
    #[pyo3(signature = (out, count=None))]
    fn read_array(
        &self,
        py: Python<'_>,
        out: &Bound<'_, PyList>,
        count: Option<usize>,
    ) -> PyResult<()> {
        let count = count.unwrap_or(out.len());
        self.transfer_list(py, out, |h, ops| sluice_read_array(h, ops, count))
    }

    /// Explicitly release the buffer. Further calls raise RuntimeError.
    fn close(&mut self, py: Python<'_>) {
        if let Some(h) = self.handle.take() {
            py.detach(|| sluice_scratch_destroy(h));
        }
    }

    fn __enter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    #[pyo3(signature = (_exc_type=None, _exc_val=None, _exc_tb=None))]
    fn __exit__(
        &mut self,
        py: Python<'_>,
        _exc_type: Option<&Bound<'_, PyAny>>,
        _exc_val: Option<&Bound<'_, PyAny>>,
        _exc_tb: Option<&Bound<'_, PyAny>>,
    ) {
        self.close(py);
    }
}

impl Scratch {
    fn require_handle(&self) -> PyResult<u64> {
        self.handle
            .ok_or_else(|| pyo3::exceptions::PyRuntimeError::new_err("Scratch already closed"))
    }

    /// Run an array-copy transfer against `list` with the GIL released.
    fn transfer_list(
        &self,
        py: Python<'_>,
        list: &Bound<'_, PyList>,
        call: impl FnOnce(u64, *const SluiceArrayOps) -> i32 + Send,
    ) -> PyResult<()> {
        let h = self.require_handle()?;
        let mut data = ListData::new(list);
        let ops = data.ops();
        let ops_addr = &ops as *const SluiceArrayOps as usize;
        // Release GIL: the callbacks re-acquire it per region.
        let status = py.detach(|| call(h, ops_addr as *const SluiceArrayOps));
        if let Some(err) = data.take_error() {
            return Err(err);
        }
        check_status(status)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if let Some(h) = self.handle.take() {
            // PyO3 Drop for #[pyclass] runs with GIL held.
            Python::attach(|py| {
                py.detach(|| sluice_scratch_destroy(h));
            });
        }
    }
}
