//! The consolidation pass: select candidates in the match window, partition
//! by region, gate on the capacity floor, cluster destinations into virtual
//! stops, aggregate one departure time, and commit each region outcome
//! atomically through the store.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::cluster::{cluster_virtual_stops, ClusterError};
use crate::config::{ConfigError, MatchPolicy};
use crate::departure::aggregate_departure_time;
use crate::partition::partition_by_region;
use crate::request::{Region, RideRequest};
use crate::store::{GroupDraft, RegionCommit, RequestStore, StoreError};
use crate::telemetry::{PassSummary, PassTelemetry, RegionOutcome, RegionResolution};
use crate::window::MatchWindow;

#[derive(thiserror::Error, Debug)]
pub enum PassError {
    #[error("failed to fetch pending requests")]
    Fetch(#[source] StoreError),
    /// A region commit failed. Regions committed earlier in the pass stay
    /// committed; this region's members are still pending and will be
    /// re-selected by the next pass.
    #[error("failed to commit outcome for {region}")]
    Commit {
        region: Region,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// The consolidation engine. One instance owns the policy and the store
/// handle; [run_pass] is the single entry point for both the recurring timer
/// and on-demand triggers.
///
/// [run_pass]: MatchingEngine::run_pass
pub struct MatchingEngine<S> {
    policy: MatchPolicy,
    store: S,
    /// Serializes passes: overlapping triggers queue here instead of
    /// double-processing the same pending requests.
    pass_lock: Mutex<()>,
    telemetry: Mutex<PassTelemetry>,
}

impl<S: RequestStore> MatchingEngine<S> {
    /// Fails at construction if the policy is unusable (e.g. a zero capacity
    /// floor), mirroring a startup configuration error.
    pub fn new(store: S, policy: MatchPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        Ok(Self {
            policy,
            store,
            pass_lock: Mutex::new(()),
            telemetry: Mutex::new(PassTelemetry::default()),
        })
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the accumulated telemetry.
    pub fn telemetry(&self) -> PassTelemetry {
        self.telemetry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Run one consolidation pass triggered at `now`.
    ///
    /// An empty candidate window is a normal outcome and returns an empty
    /// summary. A store failure aborts the pass at the failing region;
    /// nothing in that region is partially written.
    pub fn run_pass(&self, now: DateTime<Utc>) -> Result<PassSummary, PassError> {
        let _guard = self
            .pass_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let window = MatchWindow::around(now, &self.policy);
        let candidates = self
            .store
            .fetch_pending(&window)
            .map_err(PassError::Fetch)?;
        info!(
            "consolidation pass over {}: {} pending candidates",
            window,
            candidates.len()
        );

        if candidates.is_empty() {
            let summary = PassSummary::empty(window);
            self.record(&summary);
            return Ok(summary);
        }

        // Requests with broken coordinates must not corrupt a centroid. They
        // are excluded from this pass and stay pending; the intake
        // collaborator owns fixing them.
        let candidate_count = candidates.len();
        let (valid, invalid): (Vec<RideRequest>, Vec<RideRequest>) = candidates
            .into_iter()
            .partition(|r| r.destination.is_valid());
        for request in &invalid {
            warn!(
                "request {} has invalid destination ({}, {}); leaving it pending",
                request.id, request.destination.lat, request.destination.lng
            );
        }

        let mut outcomes = Vec::new();
        for (region, bucket) in partition_by_region(valid) {
            debug!("{}: {} candidates", region, bucket.len());
            let outcome = if bucket.len() < self.policy.minimum_passengers {
                self.cancel_bucket(region, &bucket)?
            } else {
                self.match_bucket(region, &bucket)?
            };
            outcomes.push(outcome);
        }

        let summary = PassSummary {
            window,
            candidates: candidate_count,
            skipped_invalid: invalid.len(),
            outcomes,
        };
        info!(
            "pass complete: {} groups committed, {} riders matched, {} canceled",
            summary.groups_committed(),
            summary.requests_matched(),
            summary.requests_canceled()
        );
        self.record(&summary);
        Ok(summary)
    }

    /// Capacity shortfall: cancel the whole bucket in one commit. Terminal
    /// for these requests; riders must resubmit.
    fn cancel_bucket(
        &self,
        region: Region,
        bucket: &[RideRequest],
    ) -> Result<RegionOutcome, PassError> {
        warn!(
            "{}: {} riders below minimum of {}, canceling",
            region,
            bucket.len(),
            self.policy.minimum_passengers
        );
        let request_ids = bucket.iter().map(|r| r.id).collect();
        self.store
            .commit(RegionCommit::Cancel { request_ids })
            .map_err(|source| PassError::Commit { region, source })?;
        Ok(RegionOutcome {
            region,
            riders: bucket.len(),
            resolution: RegionResolution::Canceled,
        })
    }

    /// Consolidation: virtual stops from destination clusters, one shared
    /// departure time, one atomic group commit.
    fn match_bucket(
        &self,
        region: Region,
        bucket: &[RideRequest],
    ) -> Result<RegionOutcome, PassError> {
        let destinations: Vec<_> = bucket.iter().map(|r| r.destination).collect();
        let virtual_stops = cluster_virtual_stops(
            &destinations,
            self.policy.cluster_epsilon,
            self.policy.cluster_min_points,
        )?;

        let requested_times: Vec<_> = bucket.iter().map(|r| r.requested_time).collect();
        let final_departure_time =
            aggregate_departure_time(&requested_times, self.policy.time_bucket_minutes)
                .expect("gated bucket is non-empty");

        let member_request_ids: Vec<_> = bucket.iter().map(|r| r.id).collect();
        let receipt = self
            .store
            .commit(RegionCommit::Match {
                draft: GroupDraft {
                    final_departure_time,
                    virtual_stops: virtual_stops.clone(),
                    member_request_ids,
                },
            })
            .map_err(|source| PassError::Commit { region, source })?;
        let group_id = receipt.group_id.expect("match commit assigns a group id");

        info!(
            "{}: committed group {} departing {} with {} stops for {} riders",
            region,
            group_id,
            final_departure_time,
            virtual_stops.len(),
            bucket.len()
        );
        Ok(RegionOutcome {
            region,
            riders: bucket.len(),
            resolution: RegionResolution::Matched {
                group_id,
                final_departure_time,
                virtual_stops,
            },
        })
    }

    fn record(&self, summary: &PassSummary) {
        self.telemetry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record(summary);
    }
}
