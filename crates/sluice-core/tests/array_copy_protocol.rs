//! Integration test: array-copy transfers go through the runtime protocol.
//!
//! Uses `MockManagedArray` to check that write/read against an
//! `ArrayRegion` issue exactly one region call each, that runtime failures
//! surface as `ArrayAccess` without touching the scratch buffer, and that
//! both transfer variants agree sample for sample.

use sluice_core::{
    ArrayRegion, DirectRegion, DirectRegionMut, ScratchBuffer, ScratchConfig, TransferError,
};
use sluice_test_utils::{random_samples, MockManagedArray};

#[test]
fn write_then_read_uses_one_region_call_each() {
    let data = random_samples(256, 11);
    let mut buf = ScratchBuffer::new();

    let src = ArrayRegion::new(MockManagedArray::new(data.clone()));
    buf.write_from(&src, 256).unwrap();
    assert_eq!(src.get_ref().get_calls(), 1);

    let mut dst = ArrayRegion::new(MockManagedArray::zeroed(256));
    buf.read_into(&mut dst, 256).unwrap();
    let dst = dst.into_inner();
    assert_eq!(dst.set_calls(), 1);
    assert_eq!(dst.data(), data.as_slice());
}

#[test]
fn over_capacity_never_reaches_the_runtime() {
    let mut buf = ScratchBuffer::with_config(ScratchConfig::with_capacity(16)).unwrap();
    let src = ArrayRegion::new(MockManagedArray::zeroed(32));
    let err = buf.write_from(&src, 17).unwrap_err();
    assert_eq!(
        err,
        TransferError::CapacityExceeded {
            requested: 17,
            capacity: 16
        }
    );
    assert_eq!(src.get_ref().get_calls(), 0);
}

#[test]
fn runtime_failure_is_reported_and_buffer_kept() {
    let data = random_samples(64, 3);
    let mut buf = ScratchBuffer::new();
    buf.write_from(&DirectRegion::new(&data), 64).unwrap();

    let src = ArrayRegion::new(MockManagedArray::zeroed(64).failing());
    let err = buf.write_from(&src, 64).unwrap_err();
    assert!(matches!(err, TransferError::ArrayAccess { .. }));
    assert_eq!(&buf.as_slice()[..64], data.as_slice());
}

#[test]
fn direct_and_array_variants_agree() {
    let data = random_samples(4096, 99);
    let mut direct = ScratchBuffer::new();
    let mut array = ScratchBuffer::new();

    direct.write_from(&DirectRegion::new(&data), 4096).unwrap();
    array
        .write_from(&ArrayRegion::new(MockManagedArray::new(data.clone())), 4096)
        .unwrap();
    assert_eq!(direct.as_slice(), array.as_slice());

    let mut from_direct = vec![0.0f32; 4096];
    direct
        .read_into(&mut DirectRegionMut::new(&mut from_direct), 4096)
        .unwrap();
    let mut from_array = ArrayRegion::new(MockManagedArray::zeroed(4096));
    array.read_into(&mut from_array, 4096).unwrap();
    assert_eq!(from_direct.as_slice(), from_array.into_inner().data());
}

#[test]
fn independent_buffers_do_not_share_state() {
    let mut a = ScratchBuffer::new();
    let b = ScratchBuffer::new();
    a.write_from(&DirectRegion::new(&[1.0, 2.0, 3.0]), 3).unwrap();
    assert!(b.as_slice().iter().all(|&s| s == 0.0));
}
