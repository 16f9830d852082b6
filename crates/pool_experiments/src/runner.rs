//! Experiment execution: seed a fresh store, drive successive hourly passes,
//! and hand the end state to metrics extraction.

use chrono::{DateTime, Duration, Utc};
use log::info;

use pool_core::config::MatchPolicy;
use pool_core::engine::MatchingEngine;
use pool_core::scenario::{build_scenario, ScenarioParams};
use pool_core::store::InMemoryRequestStore;
use pool_core::telemetry::PassSummary;
use pool_core::window::MatchWindow;

use crate::metrics::{extract_metrics, ExperimentResult};

/// One experiment: a capacity floor, a seed, and how many hourly passes to
/// drive. Fresh intake is seeded before every pass, simulating requests
/// arriving between triggers.
#[derive(Debug, Clone)]
pub struct ExperimentParams {
    pub minimum_passengers: usize,
    pub seed: u64,
    pub passes: usize,
    pub first_trigger: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ExperimentRun {
    pub summaries: Vec<PassSummary>,
    pub result: ExperimentResult,
}

pub fn run_experiment(
    params: &ExperimentParams,
) -> Result<ExperimentRun, Box<dyn std::error::Error>> {
    let policy = MatchPolicy::new(params.minimum_passengers);
    let engine = MatchingEngine::new(InMemoryRequestStore::new(), policy.clone())?;

    let mut summaries = Vec::with_capacity(params.passes);
    for pass in 0..params.passes {
        let trigger = params.first_trigger + Duration::hours(pass as i64);
        let central = MatchWindow::around(trigger, &policy).center();
        build_scenario(
            engine.store(),
            &ScenarioParams::around(central).with_seed(params.seed.wrapping_add(pass as u64)),
        )?;
        let summary = engine.run_pass(trigger)?;
        info!(
            "pass {}/{}: {} groups, {} matched, {} canceled",
            pass + 1,
            params.passes,
            summary.groups_committed(),
            summary.requests_matched(),
            summary.requests_canceled()
        );
        summaries.push(summary);
    }

    let result = extract_metrics(params, engine.store(), &engine.telemetry())?;
    Ok(ExperimentRun { summaries, result })
}
