//! Seed the default scenario and run one consolidation pass.
//!
//! Run with: cargo run -p pool_core --example pass_run

use chrono::Utc;

use pool_core::config::MatchPolicy;
use pool_core::engine::MatchingEngine;
use pool_core::scenario::{build_scenario, ScenarioParams};
use pool_core::store::InMemoryRequestStore;
use pool_core::telemetry::RegionResolution;
use pool_core::window::MatchWindow;

fn main() {
    env_logger::init();

    const MINIMUM_PASSENGERS: usize = 4;
    const SEED: u64 = 123;

    let policy = MatchPolicy::new(MINIMUM_PASSENGERS);
    let now = Utc::now();
    let central = MatchWindow::around(now, &policy).center();

    let store = InMemoryRequestStore::new();
    let ids = build_scenario(&store, &ScenarioParams::around(central).with_seed(SEED))
        .expect("seed scenario");

    let engine = MatchingEngine::new(store, policy).expect("engine");
    let summary = engine.run_pass(now).expect("pass");

    println!(
        "--- Consolidation pass over {} ({} requests seeded, seed {}) ---",
        summary.window, ids.len(), SEED
    );
    println!("Candidates: {}", summary.candidates);
    for outcome in &summary.outcomes {
        match &outcome.resolution {
            RegionResolution::Matched {
                group_id,
                final_departure_time,
                virtual_stops,
            } => println!(
                "  {:<9} {} riders -> group {} departing {} via {} stops",
                outcome.region.to_string(),
                outcome.riders,
                group_id,
                final_departure_time.format("%H:%M"),
                virtual_stops.len()
            ),
            RegionResolution::Canceled => println!(
                "  {:<9} {} riders -> canceled (minimum is {})",
                outcome.region.to_string(),
                outcome.riders,
                MINIMUM_PASSENGERS
            ),
        }
    }
}
