//! Sample-region capabilities: what the scratch buffer can copy to and from.
//!
//! A region is "a contiguous block of `f32` samples with a known length".
//! Two adapters cover what an external environment can hand over:
//!
//! - [`DirectRegion`] / [`DirectRegionMut`]: zero-copy views over memory the
//!   native side can address directly.
//! - [`ArrayRegion`]: copy-in/copy-out through a runtime-mediated
//!   [`ArrayAccess`] protocol, for arrays whose storage is owned by the
//!   managed runtime and only reachable through region-copy calls.

use crate::error::TransferError;

/// A readable block of samples.
pub trait SampleRegion {
    /// Number of samples the region holds.
    fn len(&self) -> usize;

    /// Whether the region holds no samples.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-copy view of the samples, if the region is directly addressable.
    ///
    /// The view should hold [`len`](Self::len) samples. Transfers reject a
    /// shorter view with `RegionTooShort` instead of reading past it.
    fn as_direct(&self) -> Option<&[f32]> {
        None
    }

    /// Copy the first `dst.len()` samples of the region into `dst`.
    ///
    /// Callers check `dst.len() <= self.len()` beforehand.
    fn copy_out(&self, dst: &mut [f32]) -> Result<(), TransferError>;
}

/// A writable block of samples.
pub trait SampleRegionMut: SampleRegion {
    /// Overwrite the first `src.len()` samples of the region with `src`.
    ///
    /// Callers check `src.len() <= self.len()` beforehand.
    fn copy_in(&mut self, src: &[f32]) -> Result<(), TransferError>;
}

// ── direct regions ──────────────────────────────────────────────

/// Read-only zero-copy view over directly addressable samples.
#[derive(Clone, Copy, Debug)]
pub struct DirectRegion<'a> {
    samples: &'a [f32],
}

impl<'a> DirectRegion<'a> {
    /// Wrap a slice.
    pub fn new(samples: &'a [f32]) -> Self {
        Self { samples }
    }
}

impl<'a> From<&'a [f32]> for DirectRegion<'a> {
    fn from(samples: &'a [f32]) -> Self {
        Self::new(samples)
    }
}

impl SampleRegion for DirectRegion<'_> {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn as_direct(&self) -> Option<&[f32]> {
        Some(self.samples)
    }

    fn copy_out(&self, dst: &mut [f32]) -> Result<(), TransferError> {
        dst.copy_from_slice(&self.samples[..dst.len()]);
        Ok(())
    }
}

/// Writable zero-copy view over directly addressable samples.
#[derive(Debug)]
pub struct DirectRegionMut<'a> {
    samples: &'a mut [f32],
}

impl<'a> DirectRegionMut<'a> {
    /// Wrap a mutable slice.
    pub fn new(samples: &'a mut [f32]) -> Self {
        Self { samples }
    }
}

impl<'a> From<&'a mut [f32]> for DirectRegionMut<'a> {
    fn from(samples: &'a mut [f32]) -> Self {
        Self::new(samples)
    }
}

impl SampleRegion for DirectRegionMut<'_> {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn as_direct(&self) -> Option<&[f32]> {
        Some(self.samples)
    }

    fn copy_out(&self, dst: &mut [f32]) -> Result<(), TransferError> {
        dst.copy_from_slice(&self.samples[..dst.len()]);
        Ok(())
    }
}

impl SampleRegionMut for DirectRegionMut<'_> {
    fn copy_in(&mut self, src: &[f32]) -> Result<(), TransferError> {
        self.samples[..src.len()].copy_from_slice(src);
        Ok(())
    }
}

// ── array-copy regions ──────────────────────────────────────────

/// Runtime-mediated access to an array the native side cannot address.
///
/// Mirrors the get-region / set-region pair a managed runtime exposes for
/// its primitive arrays: every sample crosses the boundary through one of
/// these calls.
pub trait ArrayAccess {
    /// Number of samples in the array.
    fn length(&self) -> usize;

    /// Copy `buf.len()` samples starting at `start` out of the array.
    fn get_region(&self, start: usize, buf: &mut [f32]) -> Result<(), TransferError>;

    /// Copy `buf` into the array starting at `start`.
    fn set_region(&mut self, start: usize, buf: &[f32]) -> Result<(), TransferError>;
}

fn region_bounds(start: usize, len: usize, available: usize) -> Result<(), TransferError> {
    match start.checked_add(len) {
        Some(end) if end <= available => Ok(()),
        _ => Err(TransferError::RegionTooShort {
            requested: start.saturating_add(len),
            available,
        }),
    }
}

impl ArrayAccess for Vec<f32> {
    fn length(&self) -> usize {
        self.len()
    }

    fn get_region(&self, start: usize, buf: &mut [f32]) -> Result<(), TransferError> {
        region_bounds(start, buf.len(), self.len())?;
        buf.copy_from_slice(&self[start..start + buf.len()]);
        Ok(())
    }

    fn set_region(&mut self, start: usize, buf: &[f32]) -> Result<(), TransferError> {
        region_bounds(start, buf.len(), self.len())?;
        self[start..start + buf.len()].copy_from_slice(buf);
        Ok(())
    }
}

impl<A: ArrayAccess + ?Sized> ArrayAccess for &mut A {
    fn length(&self) -> usize {
        (**self).length()
    }

    fn get_region(&self, start: usize, buf: &mut [f32]) -> Result<(), TransferError> {
        (**self).get_region(start, buf)
    }

    fn set_region(&mut self, start: usize, buf: &[f32]) -> Result<(), TransferError> {
        (**self).set_region(start, buf)
    }
}

/// Copy-in/copy-out adapter turning an [`ArrayAccess`] into a sample region.
#[derive(Debug)]
pub struct ArrayRegion<A> {
    array: A,
}

impl<A: ArrayAccess> ArrayRegion<A> {
    /// Wrap a runtime array.
    pub fn new(array: A) -> Self {
        Self { array }
    }

    /// Borrow the wrapped array.
    pub fn get_ref(&self) -> &A {
        &self.array
    }

    /// Unwrap the runtime array.
    pub fn into_inner(self) -> A {
        self.array
    }
}

impl<A: ArrayAccess> SampleRegion for ArrayRegion<A> {
    fn len(&self) -> usize {
        self.array.length()
    }

    fn copy_out(&self, dst: &mut [f32]) -> Result<(), TransferError> {
        self.array.get_region(0, dst)
    }
}

impl<A: ArrayAccess> SampleRegionMut for ArrayRegion<A> {
    fn copy_in(&mut self, src: &[f32]) -> Result<(), TransferError> {
        self.array.set_region(0, src)
    }
}
