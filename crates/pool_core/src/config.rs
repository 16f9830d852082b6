//! Matching policy: the explicit configuration struct handed to the engine at
//! construction. `minimum_passengers` has no default and must come from the
//! operator; everything else falls back to the default policy.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default half-width of the candidate window.
pub const DEFAULT_WINDOW_HALF_WIDTH_MINUTES: i64 = 30;
/// Default forward offset: the engine matches trips a few hours ahead, not
/// departures happening right now.
pub const DEFAULT_FORWARD_OFFSET_MINUTES: i64 = 180;
/// Default DBSCAN neighborhood radius in coordinate degrees (~500 m at the
/// service's operating latitude).
pub const DEFAULT_CLUSTER_EPSILON: f64 = 0.005;
/// Default DBSCAN density floor (a point counts itself as a neighbor).
pub const DEFAULT_CLUSTER_MIN_POINTS: usize = 2;
/// Default departure-time grid in minutes.
pub const DEFAULT_TIME_BUCKET_MINUTES: u32 = 10;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("minimum_passengers is required and was not provided")]
    MissingMinimumPassengers,
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

/// Resolved matching policy. Construct with [MatchPolicy::new] or resolve a
/// [RawMatchPolicy] loaded from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPolicy {
    /// Capacity-gate floor: a region bucket below this size is canceled.
    pub minimum_passengers: usize,
    pub window_half_width: Duration,
    pub forward_offset: Duration,
    pub cluster_epsilon: f64,
    pub cluster_min_points: usize,
    pub time_bucket_minutes: u32,
}

impl MatchPolicy {
    /// Default policy around the one required value.
    pub fn new(minimum_passengers: usize) -> Self {
        Self {
            minimum_passengers,
            window_half_width: Duration::minutes(DEFAULT_WINDOW_HALF_WIDTH_MINUTES),
            forward_offset: Duration::minutes(DEFAULT_FORWARD_OFFSET_MINUTES),
            cluster_epsilon: DEFAULT_CLUSTER_EPSILON,
            cluster_min_points: DEFAULT_CLUSTER_MIN_POINTS,
            time_bucket_minutes: DEFAULT_TIME_BUCKET_MINUTES,
        }
    }

    pub fn with_window_half_width(mut self, half_width: Duration) -> Self {
        self.window_half_width = half_width;
        self
    }

    pub fn with_forward_offset(mut self, offset: Duration) -> Self {
        self.forward_offset = offset;
        self
    }

    pub fn with_cluster_epsilon(mut self, epsilon: f64) -> Self {
        self.cluster_epsilon = epsilon;
        self
    }

    pub fn with_cluster_min_points(mut self, min_points: usize) -> Self {
        self.cluster_min_points = min_points;
        self
    }

    pub fn with_time_bucket_minutes(mut self, minutes: u32) -> Self {
        self.time_bucket_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.minimum_passengers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "minimum_passengers",
                reason: "must be at least 1".into(),
            });
        }
        if self.window_half_width <= Duration::zero() {
            return Err(ConfigError::InvalidValue {
                field: "window_half_width",
                reason: "must be positive".into(),
            });
        }
        if !(self.cluster_epsilon.is_finite() && self.cluster_epsilon > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "cluster_epsilon",
                reason: format!("must be a positive finite number, got {}", self.cluster_epsilon),
            });
        }
        if self.cluster_min_points < 2 {
            return Err(ConfigError::InvalidValue {
                field: "cluster_min_points",
                reason: "must be at least 2".into(),
            });
        }
        if self.time_bucket_minutes == 0 || 60 % self.time_bucket_minutes != 0 {
            return Err(ConfigError::InvalidValue {
                field: "time_bucket_minutes",
                reason: format!("must evenly divide 60, got {}", self.time_bucket_minutes),
            });
        }
        Ok(())
    }
}

/// Policy as it arrives from external configuration. Every field except
/// `minimum_passengers` is optional; [RawMatchPolicy::resolve] applies the
/// defaults and rejects an absent threshold at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawMatchPolicy {
    pub minimum_passengers: Option<usize>,
    pub window_half_width_minutes: Option<i64>,
    pub forward_offset_minutes: Option<i64>,
    pub cluster_epsilon: Option<f64>,
    pub cluster_min_points: Option<usize>,
    pub time_bucket_minutes: Option<u32>,
}

impl RawMatchPolicy {
    pub fn resolve(self) -> Result<MatchPolicy, ConfigError> {
        let minimum_passengers = self
            .minimum_passengers
            .ok_or(ConfigError::MissingMinimumPassengers)?;

        let mut policy = MatchPolicy::new(minimum_passengers);
        if let Some(minutes) = self.window_half_width_minutes {
            policy.window_half_width = Duration::minutes(minutes);
        }
        if let Some(minutes) = self.forward_offset_minutes {
            policy.forward_offset = Duration::minutes(minutes);
        }
        if let Some(epsilon) = self.cluster_epsilon {
            policy.cluster_epsilon = epsilon;
        }
        if let Some(min_points) = self.cluster_min_points {
            policy.cluster_min_points = min_points;
        }
        if let Some(minutes) = self.time_bucket_minutes {
            policy.time_bucket_minutes = minutes;
        }
        policy.validate()?;
        Ok(policy)
    }
}
