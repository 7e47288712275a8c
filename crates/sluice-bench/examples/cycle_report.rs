//! Per-cycle transfer report.
//!
//! Usage: `cycle_report [CYCLE_LENGTH] [BUDGET_DIVISOR]`
//!
//! Runs the three comparisons and prints, for each subject, the cost of one
//! call and how many calls fit in one audio cycle. The report goes to
//! stderr; set `RUST_LOG=debug` for per-subject progress.

use std::process::ExitCode;

use sluice_bench::{process_native_vs_managed, read_direct_vs_array, write_direct_vs_array};
use sluice_bench::{BenchError, Comparison, CycleConfig};

fn run(config: &CycleConfig) -> Result<Vec<Comparison>, BenchError> {
    Ok(vec![
        write_direct_vs_array(config, 42)?,
        read_direct_vs_array(config)?,
        process_native_vs_managed(config, 43)?,
    ])
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let divisor = args
        .get(1)
        .and_then(|d| d.parse::<u64>().ok())
        .unwrap_or(1);
    let config = CycleConfig::from_arg(args.first().map(String::as_str)).with_divisor(divisor);
    log::info!(
        "cycle length {} ({:.3} ms per cycle), budget divisor {divisor}",
        config.cycle_length,
        config.cycle_time_ms()
    );

    match run(&config) {
        Ok(comparisons) => {
            for cmp in comparisons {
                eprintln!("\n{cmp}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("benchmark aborted: {e}");
            ExitCode::FAILURE
        }
    }
}
