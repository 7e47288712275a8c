//! Euclidean norm over sample regions.

use crate::error::TransferError;
use crate::region::SampleRegion;

/// Square root of the sum of squares of `samples`.
///
/// Plain left-to-right `f32` accumulation: no compensated summation and no
/// overflow guard, so very large inputs saturate to infinity.
pub fn euclidean_norm(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &s| acc + s * s).sqrt()
}

/// Euclidean norm of the first `count` samples of a direct region.
///
/// Operates on the caller's region itself, never on a scratch buffer, so
/// `count` is bounded by the region length only. Regions without a
/// zero-copy view are rejected.
pub fn region_norm<R>(region: &R, count: usize) -> Result<f32, TransferError>
where
    R: SampleRegion + ?Sized,
{
    let view = region
        .as_direct()
        .ok_or_else(|| TransferError::invalid_region("region is not directly addressable"))?;
    if count > view.len() {
        return Err(TransferError::RegionTooShort {
            requested: count,
            available: view.len(),
        });
    }
    Ok(euclidean_norm(&view[..count]))
}
