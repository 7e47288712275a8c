//! Integration test: the C entry points as a host runtime would drive them.
//!
//! Covers the round-trip law for both transfer variants, the
//! no-zero-fill behaviour across calls, and rejection without mutation.
//! Also checks serialised access when threads share a handle, and host
//! callbacks that call back into the library.

use std::ffi::c_void;
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use sluice_ffi::{
    sluice_norm_direct, sluice_read_array, sluice_read_direct, sluice_scratch_capacity_get,
    sluice_scratch_create, sluice_scratch_destroy, sluice_write_array, sluice_write_direct,
    SluiceArrayOps, SluiceStatus,
};
use sluice_test_utils::{random_samples, HostArray};

const OK: i32 = SluiceStatus::Ok as i32;

struct Scratch(u64);

impl Scratch {
    fn new() -> Self {
        let mut h = 0u64;
        assert_eq!(sluice_scratch_create(0, &mut h), OK);
        Scratch(h)
    }

    fn snapshot(&self, count: usize) -> Vec<f32> {
        let mut out = vec![0.0f32; count];
        assert_eq!(sluice_read_direct(self.0, out.as_mut_ptr(), count, count), OK);
        out
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        sluice_scratch_destroy(self.0);
    }
}

proptest! {
    #[test]
    fn direct_round_trip_is_bit_exact(count in 0usize..=4096, seed in any::<u64>()) {
        let scratch = Scratch::new();
        let data = random_samples(count, seed);
        prop_assert_eq!(sluice_write_direct(scratch.0, data.as_ptr(), count, count), OK);

        let back = scratch.snapshot(count);
        let want: Vec<u32> = data.iter().map(|s| s.to_bits()).collect();
        let got: Vec<u32> = back.iter().map(|s| s.to_bits()).collect();
        prop_assert_eq!(want, got);
    }

    #[test]
    fn array_round_trip_is_bit_exact(count in 0usize..=4096, seed in any::<u64>()) {
        let scratch = Scratch::new();
        let data = random_samples(count, seed);

        let mut src = HostArray::new(data.clone());
        let ops = src.ops();
        prop_assert_eq!(sluice_write_array(scratch.0, &ops, count), OK);

        let mut dst = HostArray::zeroed(count);
        let ops = dst.ops();
        prop_assert_eq!(sluice_read_array(scratch.0, &ops, count), OK);
        prop_assert_eq!(dst.into_samples(), data);
    }

    #[test]
    fn shorter_write_leaves_tail(c1 in 1usize..=4096, c2_frac in 0.0f64..1.0) {
        let c2 = ((c1 as f64) * c2_frac) as usize;
        let scratch = Scratch::new();
        let first = vec![0.75f32; c1];
        let second = vec![-0.25f32; c2];
        prop_assert_eq!(sluice_write_direct(scratch.0, first.as_ptr(), c1, c1), OK);
        prop_assert_eq!(sluice_write_direct(scratch.0, second.as_ptr(), c2, c2), OK);

        let back = scratch.snapshot(c1);
        prop_assert!(back[..c2].iter().all(|&s| s == -0.25));
        prop_assert!(back[c2..].iter().all(|&s| s == 0.75));
    }
}

#[test]
fn host_failure_surfaces_as_array_access_failed() {
    let scratch = Scratch::new();
    let data = random_samples(32, 5);
    sluice_write_direct(scratch.0, data.as_ptr(), 32, 32);

    // Host array shorter than it claims: get_region fails inside the runtime.
    #[allow(unsafe_code)]
    unsafe extern "C" fn lying_len(_: *mut c_void) -> usize {
        64
    }
    let mut host = HostArray::new(vec![1.0; 8]);
    let mut ops = host.ops();
    ops.length_fn = Some(lying_len);

    assert_eq!(
        sluice_write_array(scratch.0, &ops, 32),
        SluiceStatus::ArrayAccessFailed as i32
    );
    assert_eq!(scratch.snapshot(32), data);
}

#[test]
fn norm_of_written_block_matches_reference() {
    let data = random_samples(3000, 17);
    let reference = data.iter().fold(0.0f32, |acc, &s| acc + s * s).sqrt();
    let mut out = 0.0f32;
    assert_eq!(sluice_norm_direct(data.as_ptr(), 3000, 3000, &mut out), OK);
    assert_eq!(out, reference);
}

#[test]
fn threads_sharing_a_handle_see_whole_blocks() {
    let scratch = Arc::new(Scratch::new());
    let workers: Vec<_> = (0..4)
        .map(|t| {
            let scratch = Arc::clone(&scratch);
            thread::spawn(move || {
                let block = vec![t as f32; 1024];
                for _ in 0..200 {
                    assert_eq!(
                        sluice_write_direct(scratch.0, block.as_ptr(), 1024, 1024),
                        OK
                    );
                    let back = scratch.snapshot(1024);
                    // Each read observes one writer's block in full.
                    assert!(back.iter().all(|&s| s == back[0]));
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }
}

// Host array whose get_region callback calls back into the library, the way
// a managed runtime running user code during a copy might.
struct ReentrantHost {
    scratch: u64,
    other: u64,
    samples: Vec<f32>,
    same_handle: Vec<i32>,
    other_handle: Vec<i32>,
}

#[allow(unsafe_code)]
unsafe extern "C" fn reentrant_len(user_data: *mut c_void) -> usize {
    (*(user_data as *const ReentrantHost)).samples.len()
}

#[allow(unsafe_code)]
unsafe extern "C" fn reentrant_get(
    user_data: *mut c_void,
    start: usize,
    len: usize,
    buf: *mut f32,
) -> i32 {
    let host = &mut *(user_data as *mut ReentrantHost);
    let mut cap = 0usize;
    host.same_handle
        .push(sluice_scratch_capacity_get(host.scratch, &mut cap));
    let nested = [0.5f32; 4];
    host.same_handle
        .push(sluice_write_direct(host.scratch, nested.as_ptr(), 4, 4));
    host.other_handle
        .push(sluice_write_direct(host.other, nested.as_ptr(), 4, 4));
    std::slice::from_raw_parts_mut(buf, len).copy_from_slice(&host.samples[start..start + len]);
    0
}

#[allow(unsafe_code)]
unsafe extern "C" fn reentrant_set(
    user_data: *mut c_void,
    _start: usize,
    _len: usize,
    _buf: *const f32,
) -> i32 {
    let host = &mut *(user_data as *mut ReentrantHost);
    let mut out = [0.0f32; 4];
    host.same_handle
        .push(sluice_read_direct(host.scratch, out.as_mut_ptr(), 4, 4));
    0
}

fn reentrant_ops(host: &mut ReentrantHost) -> SluiceArrayOps {
    SluiceArrayOps {
        user_data: host as *mut ReentrantHost as *mut c_void,
        length_fn: Some(reentrant_len),
        get_region_fn: Some(reentrant_get),
        set_region_fn: Some(reentrant_set),
    }
}

#[test]
fn callback_reentering_same_handle_gets_busy_instead_of_hanging() {
    let scratch = Scratch::new();
    let other = Scratch::new();
    let data = random_samples(16, 3);
    let mut host = ReentrantHost {
        scratch: scratch.0,
        other: other.0,
        samples: data.clone(),
        same_handle: Vec::new(),
        other_handle: Vec::new(),
    };
    let ops = reentrant_ops(&mut host);

    assert_eq!(sluice_write_array(scratch.0, &ops, 16), OK);
    let busy = SluiceStatus::Busy as i32;
    assert_eq!(host.same_handle, vec![busy, busy]);
    // An idle second handle is still usable from inside the callback.
    assert_eq!(host.other_handle, vec![OK]);
    assert_eq!(other.snapshot(4), vec![0.5; 4]);

    // The outer write completed with the host's samples, not the nested one.
    assert_eq!(scratch.snapshot(16), data);

    // Once the outer call returns the handle is free again.
    let mut cap = 0usize;
    assert_eq!(sluice_scratch_capacity_get(scratch.0, &mut cap), OK);
    assert_eq!(cap, 4096);
}

#[test]
fn read_array_callback_reentry_gets_busy() {
    let scratch = Scratch::new();
    let other = Scratch::new();
    let mut host = ReentrantHost {
        scratch: scratch.0,
        other: other.0,
        samples: vec![0.0; 8],
        same_handle: Vec::new(),
        other_handle: Vec::new(),
    };
    let ops = reentrant_ops(&mut host);

    assert_eq!(sluice_read_array(scratch.0, &ops, 8), OK);
    assert_eq!(host.same_handle, vec![SluiceStatus::Busy as i32]);
}
