//! Pass telemetry: records what each consolidation pass did, for analysis.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::{GroupId, Region, VirtualStop};
use crate::window::MatchWindow;

/// How one region bucket was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RegionResolution {
    Matched {
        group_id: GroupId,
        final_departure_time: DateTime<Utc>,
        virtual_stops: Vec<VirtualStop>,
    },
    /// Below the capacity floor; all members canceled.
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionOutcome {
    pub region: Region,
    /// Bucket size at gate time.
    pub riders: usize,
    pub resolution: RegionResolution,
}

/// The result of one completed pass, also the engine's return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassSummary {
    pub window: MatchWindow,
    /// Pending requests found in the window.
    pub candidates: usize,
    /// Candidates excluded for invalid destination coordinates (left pending).
    pub skipped_invalid: usize,
    pub outcomes: Vec<RegionOutcome>,
}

impl PassSummary {
    pub fn empty(window: MatchWindow) -> Self {
        Self {
            window,
            candidates: 0,
            skipped_invalid: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidates == 0
    }

    pub fn groups_committed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.resolution, RegionResolution::Matched { .. }))
            .count()
    }

    pub fn requests_matched(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.resolution, RegionResolution::Matched { .. }))
            .map(|o| o.riders)
            .sum()
    }

    pub fn requests_canceled(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.resolution, RegionResolution::Canceled))
            .map(|o| o.riders)
            .sum()
    }
}

/// Accumulated over the engine's lifetime; one [PassSummary] per completed
/// pass plus running counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassTelemetry {
    pub passes_completed: u64,
    pub empty_passes: u64,
    pub groups_committed: u64,
    pub requests_matched: u64,
    pub requests_canceled: u64,
    pub history: Vec<PassSummary>,
}

impl PassTelemetry {
    pub fn record(&mut self, summary: &PassSummary) {
        self.passes_completed += 1;
        if summary.is_empty() {
            self.empty_passes += 1;
        }
        self.groups_committed += summary.groups_committed() as u64;
        self.requests_matched += summary.requests_matched() as u64;
        self.requests_canceled += summary.requests_canceled() as u64;
        self.history.push(summary.clone());
    }
}
