//! Cycle-budget benchmark harness for Sluice transfers.
//!
//! Answers one question for an audio host: how many times per processing
//! cycle can a given transfer run? Each scenario times several ways of doing
//! the same job over a fixed element budget and reports:
//!
//! - [`write_direct_vs_array`]: filling a scratch buffer through the C
//!   entry points from a direct region vs from a callback-backed host array
//! - [`read_direct_vs_array`]: draining it the same two ways
//! - [`process_native_vs_managed`]: the norm through the C entry point, and
//!   over the same direct buffer from the managed side, each against a
//!   plain managed array

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use sluice_core::{euclidean_norm, region_norm, DirectRegion, TransferError, MAX_CYCLE_LENGTH};
use sluice_ffi::{
    sluice_norm_direct, sluice_read_array, sluice_read_direct, sluice_scratch_create,
    sluice_scratch_destroy, sluice_write_array, sluice_write_direct, SluiceStatus,
};
use sluice_test_utils::{random_samples, HostArray};

/// Samples per cycle when no cycle length is given.
pub const DEFAULT_CYCLE_LENGTH: usize = 256;

/// Sample rate the cycle time is derived from.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 44_100.0;

/// Cycle length, sample rate, and per-scenario element budgets.
///
/// A budget is the total number of samples a scenario moves; the
/// repetition count is `budget / cycle_length`, so every cycle length
/// does the same total work.
#[derive(Clone, Debug, PartialEq)]
pub struct CycleConfig {
    /// Samples per transfer.
    pub cycle_length: usize,
    /// Host sample rate in Hz.
    pub sample_rate_hz: f64,
    /// Element budget for the write comparison.
    pub write_budget: u64,
    /// Element budget for the read comparison.
    pub read_budget: u64,
    /// Element budget for the processing comparison.
    pub process_budget: u64,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            write_budget: 5_000_000_000,
            read_budget: 3_000_000_000,
            process_budget: 300_000_000,
        }
    }
}

impl CycleConfig {
    /// Build a config from an optional command-line argument.
    ///
    /// Malformed or zero values fall back to [`DEFAULT_CYCLE_LENGTH`];
    /// values above [`MAX_CYCLE_LENGTH`] are clamped.
    pub fn from_arg(arg: Option<&str>) -> Self {
        let cycle_length = match arg.map(|a| a.trim().parse::<usize>()) {
            None => DEFAULT_CYCLE_LENGTH,
            Some(Ok(n)) if n > 0 => n,
            Some(_) => {
                log::warn!(
                    "cycle length {:?} is not a positive integer; using {DEFAULT_CYCLE_LENGTH}",
                    arg.unwrap_or_default()
                );
                DEFAULT_CYCLE_LENGTH
            }
        };
        Self {
            cycle_length: cycle_length.min(MAX_CYCLE_LENGTH),
            ..Self::default()
        }
    }

    /// Divide every element budget by `divisor` (for quick runs).
    pub fn with_divisor(mut self, divisor: u64) -> Self {
        let divisor = divisor.max(1);
        self.write_budget /= divisor;
        self.read_budget /= divisor;
        self.process_budget /= divisor;
        self
    }

    /// Number of calls needed to move `budget` samples. At least one.
    pub fn repetitions(&self, budget: u64) -> u64 {
        (budget / self.cycle_length.max(1) as u64).max(1)
    }

    /// Wall-clock duration of one cycle in milliseconds.
    pub fn cycle_time_ms(&self) -> f64 {
        self.cycle_length as f64 / (self.sample_rate_hz / 1000.0)
    }
}

/// Timing of one subject over a fixed number of calls.
#[derive(Clone, Debug)]
pub struct Measurement {
    /// What was timed.
    pub subject: String,
    /// Samples moved per call.
    pub cycle_length: usize,
    /// Number of calls.
    pub repetitions: u64,
    /// Total time for all calls.
    pub elapsed: Duration,
    /// Cycle duration used for the per-cycle figure.
    pub cycle_time_ms: f64,
}

impl Measurement {
    /// Mean time of one call in nanoseconds.
    pub fn per_call_ns(&self) -> f64 {
        self.elapsed.as_nanos() as f64 / self.repetitions as f64
    }

    /// How many calls fit in one cycle.
    pub fn max_calls_per_cycle(&self) -> f64 {
        self.cycle_time_ms * 1e6 / self.per_call_ns()
    }

    /// Calls per second at the measured rate.
    pub fn calls_per_second(&self) -> f64 {
        1e9 / self.per_call_ns()
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "--- {}-{} takes {:.1} ns per call. (testing-time {:.0} ms)",
            self.subject,
            self.cycle_length,
            self.per_call_ns(),
            self.elapsed.as_secs_f64() * 1000.0
        )?;
        writeln!(
            f,
            "    maximum calls per cycle: {:.0}",
            self.max_calls_per_cycle()
        )?;
        write!(f, "    calls per second: {:.0}", self.calls_per_second())
    }
}

/// Relative speed of two measured subjects.
#[derive(Clone, Debug, PartialEq)]
pub struct Conclusion {
    /// Subject the percentage is about.
    pub subject: String,
    /// Subject it is compared against.
    pub baseline: String,
    /// `100 * speed(subject) / speed(baseline) - 100`. Negative when slower.
    pub percent_faster: f64,
}

/// Compare `subject` against `baseline` by total elapsed time.
pub fn conclusion(subject: &Measurement, baseline: &Measurement) -> Conclusion {
    Conclusion {
        subject: subject.subject.clone(),
        baseline: baseline.subject.clone(),
        percent_faster: percent_faster(subject.elapsed, baseline.elapsed),
    }
}

/// `100 * speed_a / speed_b - 100` where speed is the reciprocal of time.
pub fn percent_faster(a: Duration, b: Duration) -> f64 {
    100.0 * b.as_secs_f64() / a.as_secs_f64() - 100.0
}

impl fmt::Display for Conclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is by {:.2}% faster than {}.",
            self.subject, self.percent_faster, self.baseline
        )
    }
}

/// Measurements and conclusions of one scenario.
#[derive(Clone, Debug)]
pub struct Comparison {
    /// Scenario heading.
    pub title: &'static str,
    /// One entry per timed subject, in run order.
    pub measurements: Vec<Measurement>,
    /// Pairwise conclusions.
    pub conclusions: Vec<Conclusion>,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for m in &self.measurements {
            writeln!(f, "{m}")?;
        }
        for c in &self.conclusions {
            writeln!(f, "{c}")?;
        }
        Ok(())
    }
}

/// Errors that abort a benchmark scenario.
#[derive(Debug)]
pub enum BenchError {
    /// A transfer was rejected by the scratch buffer.
    Transfer(TransferError),
    /// A C entry point returned a non-OK status.
    Status {
        /// Entry point name.
        call: &'static str,
        /// Returned status code.
        code: i32,
    },
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer(e) => write!(f, "transfer failed: {e}"),
            Self::Status { call, code } => write!(f, "{call} returned status {code}"),
        }
    }
}

impl Error for BenchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transfer(e) => Some(e),
            Self::Status { .. } => None,
        }
    }
}

impl From<TransferError> for BenchError {
    fn from(e: TransferError) -> Self {
        Self::Transfer(e)
    }
}

fn time_calls(
    subject: &str,
    config: &CycleConfig,
    repetitions: u64,
    mut call: impl FnMut() -> Result<(), BenchError>,
) -> Result<Measurement, BenchError> {
    log::debug!("timing {subject}: {repetitions} calls of {}", config.cycle_length);
    let start = Instant::now();
    for _ in 0..repetitions {
        call()?;
    }
    Ok(Measurement {
        subject: subject.to_string(),
        cycle_length: config.cycle_length,
        repetitions,
        elapsed: start.elapsed(),
        cycle_time_ms: config.cycle_time_ms(),
    })
}

/// A scratch buffer created through the C entry points, destroyed on drop.
struct BoundaryScratch(u64);

impl BoundaryScratch {
    fn create() -> Result<Self, BenchError> {
        let mut handle = 0u64;
        check("sluice_scratch_create", sluice_scratch_create(0, &mut handle))?;
        Ok(Self(handle))
    }
}

impl Drop for BoundaryScratch {
    fn drop(&mut self) {
        sluice_scratch_destroy(self.0);
    }
}

fn check(call: &'static str, code: i32) -> Result<(), BenchError> {
    if code == SluiceStatus::Ok as i32 {
        Ok(())
    } else {
        Err(BenchError::Status { call, code })
    }
}

/// Fill a scratch buffer through the C boundary: from a direct region vs
/// from a host array reached through its region-copy callbacks.
pub fn write_direct_vs_array(config: &CycleConfig, seed: u64) -> Result<Comparison, BenchError> {
    let n = config.cycle_length;
    let reps = config.repetitions(config.write_budget);
    let samples = random_samples(n, seed);
    let scratch = BoundaryScratch::create()?;

    let direct_m = time_calls("DirectBuffer", config, reps, || {
        let code = sluice_write_direct(scratch.0, black_box(samples.as_ptr()), n, n);
        check("sluice_write_direct", code)
    })?;

    let mut host = HostArray::new(samples.clone());
    let ops = host.ops();
    let array_m = time_calls("Array", config, reps, || {
        check("sluice_write_array", sluice_write_array(scratch.0, black_box(&ops), n))
    })?;

    Ok(Comparison {
        title: "Writing using direct buffer vs writing using array",
        conclusions: vec![conclusion(&direct_m, &array_m)],
        measurements: vec![direct_m, array_m],
    })
}

/// Drain a scratch buffer through the C boundary: into a direct region vs
/// into a host array through its region-copy callbacks.
pub fn read_direct_vs_array(config: &CycleConfig) -> Result<Comparison, BenchError> {
    let n = config.cycle_length;
    let reps = config.repetitions(config.read_budget);
    let scratch = BoundaryScratch::create()?;

    let mut out = vec![0.0f32; n];
    let direct_m = time_calls("DirectBuffer", config, reps, || {
        let code = sluice_read_direct(scratch.0, black_box(out.as_mut_ptr()), n, n);
        check("sluice_read_direct", code)
    })?;

    let mut host = HostArray::zeroed(n);
    let ops = host.ops();
    let array_m = time_calls("Array", config, reps, || {
        check("sluice_read_array", sluice_read_array(scratch.0, black_box(&ops), n))
    })?;

    Ok(Comparison {
        title: "Reading using direct buffer vs reading using array",
        conclusions: vec![conclusion(&direct_m, &array_m)],
        measurements: vec![direct_m, array_m],
    })
}

/// The norm three ways: through the C entry point over a direct buffer,
/// from the managed side over the same direct buffer, and over a plain
/// managed array holding the same samples.
pub fn process_native_vs_managed(
    config: &CycleConfig,
    seed: u64,
) -> Result<Comparison, BenchError> {
    let n = config.cycle_length;
    let reps = config.repetitions(config.process_budget);
    let array = random_samples(n, seed);
    let direct = array.clone();
    let mut total = 0.0f32;

    let native_m = time_calls("process DirectBuffer natively", config, reps, || {
        let mut out = 0.0f32;
        let code = sluice_norm_direct(black_box(direct.as_ptr()), n, n, &mut out);
        check("sluice_norm_direct", code)?;
        total += out;
        Ok(())
    })?;

    let region = DirectRegion::new(&direct);
    let managed_direct_m = time_calls("process DirectBuffer from managed side", config, reps, || {
        total += region_norm(black_box(&region), n)?;
        Ok(())
    })?;

    let array_m = time_calls("process managed array", config, reps, || {
        total += euclidean_norm(black_box(&array));
        Ok(())
    })?;
    black_box(total);

    Ok(Comparison {
        title: "Processing using direct buffer vs processing an array",
        conclusions: vec![
            conclusion(&native_m, &array_m),
            conclusion(&managed_direct_m, &array_m),
        ],
        measurements: vec![native_m, managed_direct_m, array_m],
    })
}
