//! Sweep the capacity floor and print the match-rate trade-off.
//!
//! Run with: cargo run -p pool_experiments --example threshold_sweep

use chrono::{TimeZone, Utc};

use pool_experiments::{export_to_csv, export_to_json, run_experiment, ExperimentParams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    const SEED: u64 = 42;
    const PASSES: usize = 4;

    let first_trigger = Utc.with_ymd_and_hms(2024, 3, 15, 6, 0, 0).unwrap();

    let mut results = Vec::new();
    for minimum_passengers in 2..=6 {
        let run = run_experiment(&ExperimentParams {
            minimum_passengers,
            seed: SEED,
            passes: PASSES,
            first_trigger,
        })?;
        results.push(run.result);
    }

    println!("--- Capacity-floor sweep (seed {}, {} passes each) ---", SEED, PASSES);
    println!("min  requests  matched  canceled  match_rate  groups  avg_size  avg_stops");
    for r in &results {
        println!(
            "{:<4} {:<9} {:<8} {:<9} {:<11.2} {:<7} {:<9.2} {:.2}",
            r.minimum_passengers,
            r.total_requests,
            r.matched_requests,
            r.canceled_requests,
            r.match_rate,
            r.groups_committed,
            r.avg_group_size,
            r.avg_stops_per_group,
        );
    }

    export_to_csv(&results, "target/threshold_sweep.csv")?;
    export_to_json(&results, "target/threshold_sweep.json")?;
    println!("\nWrote target/threshold_sweep.csv and target/threshold_sweep.json");
    Ok(())
}
