//! SluiceStatus -> Python exception mapping with recovery hints.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::PyResult;

/// Check an FFI status code. Returns `Ok(())` on success, raises a typed
/// Python exception with a recovery hint on error.
pub(crate) fn check_status(code: i32) -> PyResult<()> {
    if code == 0 {
        return Ok(());
    }
    let (msg, hint) = error_detail(code);
    let full = format!("sluice error {code}: {msg}\n  Hint: {hint}");
    match code {
        // Caller-supplied regions, counts, and config → ValueError
        -2 | -3 | -4 | -6 | -7 => Err(PyValueError::new_err(full)),

        // Closed handles, runtime copy failures, busy buffers, internal faults → RuntimeError
        _ => Err(PyRuntimeError::new_err(full)),
    }
}

/// Returns `(message, recovery_hint)` for each FFI status code.
fn error_detail(code: i32) -> (&'static str, &'static str) {
    match code {
        -1 => (
            "invalid scratch handle (already closed?)",
            "The Scratch object has been closed. Don't call .close() and then \
             keep using the object; create a new Scratch instead.",
        ),
        -2 => (
            "invalid region",
            "The array could not be read in place. Pass a C-contiguous \
             float32 NumPy array (np.ascontiguousarray(a, dtype=np.float32)) \
             or use make_direct_buffer() to allocate one.",
        ),
        -3 => (
            "count exceeds the scratch capacity",
            "Transfers are limited to scratch.capacity samples \
             (MAX_CYCLE_LENGTH by default). Split the block or create the \
             Scratch with a larger capacity.",
        ),
        -4 => (
            "count exceeds the array length",
            "The array holds fewer samples than requested. Pass count <= \
             len(array).",
        ),
        -5 => (
            "array region copy failed",
            "An element of the list could not be read or written as a float. \
             Check that the list contains only numbers.",
        ),
        -6 => (
            "configuration error",
            "Scratch capacity must be between 1 and 1048576 samples \
             (0 selects the default of 4096).",
        ),
        -7 => (
            "invalid argument",
            "An output argument was missing. This indicates a bug in the \
             bindings; please report it.",
        ),
        -8 => (
            "internal error",
            "A scratch buffer lock was poisoned by an earlier panic. Close \
             the Scratch and create a new one.",
        ),
        -9 => (
            "scratch buffer is busy",
            "The Scratch was used from inside one of its own list transfers \
             (for example from an element's __float__). Finish the transfer \
             first, or use a separate Scratch.",
        ),
        -128 => (
            "panic in native code",
            "The native library panicked and recovered. Close the Scratch \
             and create a new one, and please report the input that \
             triggered it.",
        ),
        _ => (
            "unknown sluice error",
            "An unrecognized error code was returned from the FFI layer. \
             This may indicate a version mismatch between the Python \
             bindings and the native library.",
        ),
    }
}
