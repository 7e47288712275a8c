//! The scratch transfer buffer.
//!
//! A [`ScratchBuffer`] holds the most recently transferred block of samples
//! so either side of the boundary can pick it up. It is created with a fixed
//! capacity and never resized. Writes overwrite only the first `count`
//! samples; anything past `count` keeps whatever an earlier, larger write
//! left there.
//!
//! Every operation validates in the same order (capacity, then region
//! resolution, then region length) and leaves the buffer untouched when
//! it fails.

use crate::config::ScratchConfig;
use crate::error::{ConfigError, TransferError};
use crate::region::{SampleRegion, SampleRegionMut};

/// Fixed-capacity block of `f32` samples owned by the native side.
#[derive(Clone, Debug)]
pub struct ScratchBuffer {
    samples: Box<[f32]>,
    /// Landing area for array-copy writes, so a runtime failure halfway
    /// through never leaves `samples` partially overwritten.
    staging: Box<[f32]>,
}

impl ScratchBuffer {
    /// A zeroed buffer with the default capacity
    /// ([`MAX_CYCLE_LENGTH`](crate::MAX_CYCLE_LENGTH)).
    pub fn new() -> Self {
        Self::zeroed(ScratchConfig::default().capacity)
    }

    /// A zeroed buffer built from a validated config.
    pub fn with_config(config: ScratchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::zeroed(config.capacity))
    }

    fn zeroed(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity].into_boxed_slice(),
            staging: vec![0.0; capacity].into_boxed_slice(),
        }
    }

    /// Fixed number of samples the buffer holds.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// The full buffer contents, including samples past the last write.
    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Copy `count` samples from `src` into the start of the buffer.
    ///
    /// Direct regions are copied straight from their view; array regions go
    /// through the runtime copy protocol into a staging area first.
    pub fn write_from<R>(&mut self, src: &R, count: usize) -> Result<(), TransferError>
    where
        R: SampleRegion + ?Sized,
    {
        self.check_request(src, count)?;
        match src.as_direct() {
            Some(view) => {
                // A view shorter than the region's declared length is
                // rejected rather than sliced past its end.
                let view = view.get(..count).ok_or(TransferError::RegionTooShort {
                    requested: count,
                    available: view.len(),
                })?;
                self.samples[..count].copy_from_slice(view);
            }
            None => {
                src.copy_out(&mut self.staging[..count])?;
                self.samples[..count].copy_from_slice(&self.staging[..count]);
            }
        }
        Ok(())
    }

    /// Copy the first `count` samples of the buffer into `dst`.
    ///
    /// Samples of `dst` past `count` are not touched.
    pub fn read_into<R>(&self, dst: &mut R, count: usize) -> Result<(), TransferError>
    where
        R: SampleRegionMut + ?Sized,
    {
        self.check_request(&*dst, count)?;
        dst.copy_in(&self.samples[..count])
    }

    /// Check `count` against the fixed capacity without touching any region.
    ///
    /// Boundary layers call this before resolving external handles so an
    /// oversized request is reported as such even when the handle is bad too.
    pub fn check_count(&self, count: usize) -> Result<(), TransferError> {
        if count > self.capacity() {
            log::debug!(
                "rejecting transfer of {count} samples: capacity is {}",
                self.capacity()
            );
            return Err(TransferError::CapacityExceeded {
                requested: count,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }

    fn check_request<R>(&self, region: &R, count: usize) -> Result<(), TransferError>
    where
        R: SampleRegion + ?Sized,
    {
        self.check_count(count)?;
        let available = region.len();
        if count > available {
            log::debug!("rejecting transfer of {count} samples: region holds {available}");
            return Err(TransferError::RegionTooShort {
                requested: count,
                available,
            });
        }
        Ok(())
    }
}

impl Default for ScratchBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{ArrayAccess, ArrayRegion, DirectRegion, DirectRegionMut, SampleRegion};
    use proptest::prelude::*;

    /// Array whose get/set calls always fail after the length check.
    struct BrokenArray(usize);

    impl ArrayAccess for BrokenArray {
        fn length(&self) -> usize {
            self.0
        }

        fn get_region(&self, _start: usize, buf: &mut [f32]) -> Result<(), TransferError> {
            // Scribble before failing to prove staging isolates the buffer.
            buf.fill(f32::NAN);
            Err(TransferError::ArrayAccess {
                reason: "runtime refused".into(),
            })
        }

        fn set_region(&mut self, _start: usize, _buf: &[f32]) -> Result<(), TransferError> {
            Err(TransferError::ArrayAccess {
                reason: "runtime refused".into(),
            })
        }
    }

    /// Region that claims more samples than its direct view holds.
    struct OverstatedRegion<'a> {
        claimed: usize,
        view: &'a [f32],
    }

    impl SampleRegion for OverstatedRegion<'_> {
        fn len(&self) -> usize {
            self.claimed
        }

        fn as_direct(&self) -> Option<&[f32]> {
            Some(self.view)
        }

        fn copy_out(&self, dst: &mut [f32]) -> Result<(), TransferError> {
            dst.copy_from_slice(&self.view[..dst.len()]);
            Ok(())
        }
    }

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 * 0.25 - 1.0).collect()
    }

    #[test]
    fn new_buffer_is_zeroed_with_default_capacity() {
        let buf = ScratchBuffer::new();
        assert_eq!(buf.capacity(), 4096);
        assert!(buf.as_slice().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn with_config_rejects_zero_capacity() {
        let err = ScratchBuffer::with_config(ScratchConfig::with_capacity(0)).unwrap_err();
        assert_eq!(err, ConfigError::ZeroCapacity);
    }

    #[test]
    fn direct_round_trip() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(13);
        buf.write_from(&DirectRegion::new(&data), 13).unwrap();

        let mut out = vec![0.0f32; 13];
        buf.read_into(&mut DirectRegionMut::new(&mut out), 13).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn array_round_trip() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(13);
        buf.write_from(&ArrayRegion::new(data.clone()), 13).unwrap();

        let mut out = ArrayRegion::new(vec![0.0f32; 13]);
        buf.read_into(&mut out, 13).unwrap();
        assert_eq!(out.into_inner(), data);
    }

    #[test]
    fn zero_count_is_a_no_op() {
        let mut buf = ScratchBuffer::new();
        buf.write_from(&DirectRegion::new(&[]), 0).unwrap();
        let mut out: [f32; 0] = [];
        buf.read_into(&mut DirectRegionMut::new(&mut out), 0).unwrap();
    }

    #[test]
    fn full_capacity_transfer_accepted() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(4096);
        buf.write_from(&DirectRegion::new(&data), 4096).unwrap();
        assert_eq!(buf.as_slice(), data.as_slice());
    }

    #[test]
    fn over_capacity_rejected_before_region_length() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(10);
        // Region is also too short, but capacity is checked first.
        let err = buf.write_from(&DirectRegion::new(&data), 4097).unwrap_err();
        assert_eq!(
            err,
            TransferError::CapacityExceeded {
                requested: 4097,
                capacity: 4096
            }
        );
    }

    #[test]
    fn short_region_rejected_without_mutation() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(4);
        buf.write_from(&DirectRegion::new(&data), 4).unwrap();

        let other = [5.0f32; 2];
        let err = buf.write_from(&DirectRegion::new(&other), 3).unwrap_err();
        assert_eq!(
            err,
            TransferError::RegionTooShort {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(&buf.as_slice()[..4], data.as_slice());
    }

    #[test]
    fn short_direct_view_rejected_without_panic() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(6);
        buf.write_from(&DirectRegion::new(&data), 6).unwrap();

        let view = [9.0f32; 2];
        let region = OverstatedRegion {
            claimed: 10,
            view: &view,
        };
        let err = buf.write_from(&region, 5).unwrap_err();
        assert_eq!(
            err,
            TransferError::RegionTooShort {
                requested: 5,
                available: 2
            }
        );
        assert_eq!(&buf.as_slice()[..6], data.as_slice());
    }

    #[test]
    fn failing_array_write_leaves_buffer_untouched() {
        let mut buf = ScratchBuffer::new();
        let data = ramp(8);
        buf.write_from(&DirectRegion::new(&data), 8).unwrap();

        let err = buf.write_from(&ArrayRegion::new(BrokenArray(8)), 8).unwrap_err();
        assert!(matches!(err, TransferError::ArrayAccess { .. }));
        assert_eq!(&buf.as_slice()[..8], data.as_slice());
    }

    #[test]
    fn failing_array_read_reports_error() {
        let buf = ScratchBuffer::new();
        let err = buf
            .read_into(&mut ArrayRegion::new(BrokenArray(4)), 4)
            .unwrap_err();
        assert!(matches!(err, TransferError::ArrayAccess { .. }));
    }

    #[test]
    fn smaller_write_keeps_trailing_samples() {
        let mut buf = ScratchBuffer::new();
        let first = vec![1.0f32; 10];
        let second = vec![2.0f32; 4];
        buf.write_from(&DirectRegion::new(&first), 10).unwrap();
        buf.write_from(&DirectRegion::new(&second), 4).unwrap();

        assert_eq!(&buf.as_slice()[..4], &[2.0; 4]);
        assert_eq!(&buf.as_slice()[4..10], &[1.0; 6]);
        assert_eq!(buf.as_slice()[10], 0.0);
    }

    #[test]
    fn read_leaves_destination_tail_alone() {
        let mut buf = ScratchBuffer::new();
        buf.write_from(&DirectRegion::new(&[3.0, 3.0]), 2).unwrap();
        let mut out = [7.0f32; 5];
        buf.read_into(&mut DirectRegionMut::new(&mut out), 2).unwrap();
        assert_eq!(out, [3.0, 3.0, 7.0, 7.0, 7.0]);
    }

    proptest! {
        #[test]
        fn round_trip_is_bit_exact(
            data in proptest::collection::vec(any::<f32>(), 0..=4096),
            via_array in any::<bool>(),
        ) {
            let mut buf = ScratchBuffer::new();
            let count = data.len();
            let mut out = vec![0.0f32; count];
            if via_array {
                buf.write_from(&ArrayRegion::new(data.clone()), count).unwrap();
                let mut region = ArrayRegion::new(&mut out);
                buf.read_into(&mut region, count).unwrap();
            } else {
                buf.write_from(&DirectRegion::new(&data), count).unwrap();
                buf.read_into(&mut DirectRegionMut::new(&mut out), count).unwrap();
            }
            let want: Vec<u32> = data.iter().map(|s| s.to_bits()).collect();
            let got: Vec<u32> = out.iter().map(|s| s.to_bits()).collect();
            prop_assert_eq!(want, got);
        }

        #[test]
        fn over_capacity_never_mutates(extra in 1usize..512, fill in -1.0f32..1.0) {
            let mut buf = ScratchBuffer::new();
            let before = buf.as_slice().to_vec();
            let count = buf.capacity() + extra;
            let data = vec![fill; count];

            let direct = buf.write_from(&DirectRegion::new(&data), count);
            let array = buf.write_from(&ArrayRegion::new(data.clone()), count);
            prop_assert!(
                matches!(direct, Err(TransferError::CapacityExceeded { .. })),
                "direct write was not rejected for capacity"
            );
            prop_assert!(
                matches!(array, Err(TransferError::CapacityExceeded { .. })),
                "array write was not rejected for capacity"
            );
            prop_assert_eq!(buf.as_slice(), before.as_slice());

            let mut out = vec![0.0f32; count];
            prop_assert!(buf.read_into(&mut DirectRegionMut::new(&mut out), count).is_err());
            prop_assert!(out.iter().all(|&s| s == 0.0));
        }

        #[test]
        fn second_smaller_write_preserves_gap(c1 in 1usize..=4096, frac in 0.0f64..1.0) {
            let c2 = ((c1 as f64) * frac) as usize;
            let mut buf = ScratchBuffer::new();
            let first = vec![1.5f32; c1];
            let second = vec![-0.5f32; c2];
            buf.write_from(&DirectRegion::new(&first), c1).unwrap();
            buf.write_from(&ArrayRegion::new(second), c2).unwrap();

            prop_assert!(buf.as_slice()[..c2].iter().all(|&s| s == -0.5));
            prop_assert!(buf.as_slice()[c2..c1].iter().all(|&s| s == 1.5));
        }
    }
}
