//! Direct-buffer helpers and the native Euclidean norm.

use numpy::{PyArray1, PyReadonlyArray1, PyReadwriteArray1, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use sluice_ffi::sluice_norm_direct;

use crate::error::check_status;

/// Allocate a zeroed, C-contiguous float32 array of `length` samples.
///
/// Arrays from this function can always be transferred in place.
#[pyfunction]
pub(crate) fn make_direct_buffer(py: Python<'_>, length: usize) -> Bound<'_, PyArray1<f32>> {
    PyArray1::<f32>::zeros(py, length, false)
}

/// Copy every sample of `src` into `dest`.
///
/// Raises:
///     ValueError: If the sizes differ or `dest` is not contiguous.
#[pyfunction]
pub(crate) fn fill_buffer_from_array(
    mut dest: PyReadwriteArray1<'_, f32>,
    src: Vec<f32>,
) -> PyResult<()> {
    if let Some(msg) = size_mismatch(dest.len(), src.len()) {
        return Err(PyValueError::new_err(msg));
    }
    let dest = dest
        .as_slice_mut()
        .map_err(|_| PyValueError::new_err("destination array must be C-contiguous"))?;
    dest.copy_from_slice(&src);
    Ok(())
}

/// Error message for a whole-array copy between differently sized arrays.
fn size_mismatch(dest_len: usize, src_len: usize) -> Option<String> {
    (dest_len != src_len).then(|| {
        format!(
            "source and destination shall be of the same size \
             (source {src_len}, destination {dest_len})"
        )
    })
}

/// Euclidean norm of the first `count` samples of a float32 array.
///
/// Args:
///     samples: C-contiguous float32 array, read in place.
///     count: Samples to include. Defaults to ``len(samples)``.
#[pyfunction]
#[pyo3(signature = (samples, count=None))]
pub(crate) fn norm_direct(
    py: Python<'_>,
    samples: PyReadonlyArray1<'_, f32>,
    count: Option<usize>,
) -> PyResult<f32> {
    let len = samples.len();
    let addr = match samples.as_slice() {
        Ok(s) => s.as_ptr() as usize,
        Err(_) => 0usize,
    };
    let count = count.unwrap_or(len);
    let (status, norm) = py.detach(|| {
        let mut out: f32 = 0.0;
        let s = sluice_norm_direct(addr as *const f32, len, count, &mut out);
        (s, out)
    });
    check_status(status)?;
    Ok(norm)
}
