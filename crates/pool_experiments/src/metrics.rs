//! Metrics extraction from a finished experiment.

use pool_core::request::RequestStatus;
use pool_core::store::{InMemoryRequestStore, StoreError};
use pool_core::telemetry::PassTelemetry;

use crate::runner::ExperimentParams;

/// Aggregated outcome of one experiment run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExperimentResult {
    pub minimum_passengers: usize,
    pub seed: u64,
    pub passes: usize,
    /// Requests seeded across all passes.
    pub total_requests: usize,
    pub matched_requests: usize,
    pub canceled_requests: usize,
    /// Requests never selected (should stay zero with default seeding).
    pub pending_requests: usize,
    /// Matched / (matched + canceled).
    pub match_rate: f64,
    pub groups_committed: usize,
    pub avg_group_size: f64,
    pub avg_stops_per_group: f64,
}

pub fn extract_metrics(
    params: &ExperimentParams,
    store: &InMemoryRequestStore,
    telemetry: &PassTelemetry,
) -> Result<ExperimentResult, StoreError> {
    let requests = store.requests()?;
    let groups = store.groups()?;

    let matched_requests = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Matched)
        .count();
    let canceled_requests = requests
        .iter()
        .filter(|r| r.status == RequestStatus::CanceledNoCapacity)
        .count();
    let pending_requests = requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .count();

    let resolved = matched_requests + canceled_requests;
    let match_rate = if resolved == 0 {
        0.0
    } else {
        matched_requests as f64 / resolved as f64
    };

    let avg_group_size = if groups.is_empty() {
        0.0
    } else {
        groups
            .iter()
            .map(|g| g.member_request_ids.len())
            .sum::<usize>() as f64
            / groups.len() as f64
    };
    let avg_stops_per_group = if groups.is_empty() {
        0.0
    } else {
        groups.iter().map(|g| g.virtual_stops.len()).sum::<usize>() as f64 / groups.len() as f64
    };

    debug_assert_eq!(telemetry.groups_committed as usize, groups.len());

    Ok(ExperimentResult {
        minimum_passengers: params.minimum_passengers,
        seed: params.seed,
        passes: params.passes,
        total_requests: requests.len(),
        matched_requests,
        canceled_requests,
        pending_requests,
        match_rate,
        groups_committed: groups.len(),
        avg_group_size,
        avg_stops_per_group,
    })
}
