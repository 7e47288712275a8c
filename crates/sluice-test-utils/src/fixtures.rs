//! Sample fixtures shared by tests and benches.
//!
//! - [`random_samples`]: seeded uniform samples in `[-1, 1)`.
//! - [`MockManagedArray`]: an [`ArrayAccess`] implementation that counts
//!   region calls and can be told to fail.

use std::cell::Cell;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use sluice_core::{ArrayAccess, TransferError};

/// `len` samples drawn uniformly from `[-1, 1)`, deterministic per `seed`.
pub fn random_samples(len: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..len).map(|_| rng.random_range(-1.0f32..1.0)).collect()
}

/// In-memory stand-in for a runtime-owned array.
///
/// Every access goes through `get_region` / `set_region`, and the number of
/// such calls is recorded so tests can assert the copy protocol was used.
pub struct MockManagedArray {
    data: Vec<f32>,
    get_calls: Cell<usize>,
    set_calls: usize,
    fail: bool,
}

impl MockManagedArray {
    pub fn new(data: Vec<f32>) -> Self {
        Self {
            data,
            get_calls: Cell::new(0),
            set_calls: 0,
            fail: false,
        }
    }

    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0.0; len])
    }

    /// Make every subsequent region call fail with `ArrayAccess`.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.get()
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls
    }

    fn check(&self, start: usize, len: usize) -> Result<(), TransferError> {
        if self.fail {
            return Err(TransferError::ArrayAccess {
                reason: "mock array configured to fail".into(),
            });
        }
        if start + len > self.data.len() {
            return Err(TransferError::RegionTooShort {
                requested: start + len,
                available: self.data.len(),
            });
        }
        Ok(())
    }
}

impl ArrayAccess for MockManagedArray {
    fn length(&self) -> usize {
        self.data.len()
    }

    fn get_region(&self, start: usize, buf: &mut [f32]) -> Result<(), TransferError> {
        self.get_calls.set(self.get_calls.get() + 1);
        self.check(start, buf.len())?;
        buf.copy_from_slice(&self.data[start..start + buf.len()]);
        Ok(())
    }

    fn set_region(&mut self, start: usize, buf: &[f32]) -> Result<(), TransferError> {
        self.set_calls += 1;
        self.check(start, buf.len())?;
        self.data[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}
