//! Python bindings for the Sluice scratch transfer buffer.
//!
//! This crate provides PyO3 bindings wrapping the C FFI layer
//! (`sluice-ffi`). NumPy arrays play the role of direct buffers (the native
//! side reads their storage in place); Python lists play the role of
//! runtime-owned arrays reachable only through per-element region copies.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![allow(unsafe_code)]

use pyo3::prelude::*;

mod buffers;
mod error;
mod list_ops;
mod scratch;

/// The native `_sluice` extension module.
#[pymodule]
fn _sluice(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("MAX_CYCLE_LENGTH", sluice_core::MAX_CYCLE_LENGTH)?;

    m.add_class::<scratch::Scratch>()?;

    m.add_function(wrap_pyfunction!(buffers::make_direct_buffer, m)?)?;
    m.add_function(wrap_pyfunction!(buffers::fill_buffer_from_array, m)?)?;
    m.add_function(wrap_pyfunction!(buffers::norm_direct, m)?)?;

    Ok(())
}
