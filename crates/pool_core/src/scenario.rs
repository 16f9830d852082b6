//! Scenario setup: seed a store with plausible ride requests around each
//! region's anchor coordinates, spread across one match window.
//!
//! Used by examples, benches, and the experiments crate. Deterministic for a
//! fixed seed.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::request::{GeoPoint, NewRideRequest, Region, RequestId};
use crate::store::{InMemoryRequestStore, StoreError};

/// Default rider counts per region: one bucket comfortably above a typical
/// capacity floor, a couple near it, and one below.
const DEFAULT_RIDERS: [(Region, usize); 5] = [
    (Region::Downtown, 6),
    (Region::Mission, 5),
    (Region::Sunset, 4),
    (Region::Oakland, 3),
    (Region::Berkeley, 2),
];

/// Default coordinate jitter around a region anchor, in degrees. Slightly
/// below the default cluster epsilon so dense neighborhoods actually form.
const DEFAULT_JITTER_DEGREES: f64 = 0.004;

/// Default spread of requested times around the window center, in minutes.
/// Kept inside the default 30-minute half-width.
const DEFAULT_TIME_SPREAD_MINUTES: i64 = 25;

/// Anchor coordinate for each region's destination neighborhood.
pub fn region_anchor(region: Region) -> GeoPoint {
    match region {
        Region::Downtown => GeoPoint::new(37.789, -122.401),
        Region::Mission => GeoPoint::new(37.760, -122.419),
        Region::Sunset => GeoPoint::new(37.753, -122.494),
        Region::Oakland => GeoPoint::new(37.804, -122.271),
        Region::Berkeley => GeoPoint::new(37.871, -122.273),
    }
}

/// Parameters for seeding one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    /// Requested times are spread around this instant (typically the center
    /// of the window a later pass will select).
    pub center_time: DateTime<Utc>,
    pub riders: Vec<(Region, usize)>,
    /// Random seed for reproducibility (optional; if None, uses entropy).
    pub seed: Option<u64>,
    pub jitter_degrees: f64,
    pub time_spread: Duration,
}

impl ScenarioParams {
    pub fn around(center_time: DateTime<Utc>) -> Self {
        Self {
            center_time,
            riders: DEFAULT_RIDERS.to_vec(),
            seed: None,
            jitter_degrees: DEFAULT_JITTER_DEGREES,
            time_spread: Duration::minutes(DEFAULT_TIME_SPREAD_MINUTES),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_riders(mut self, riders: Vec<(Region, usize)>) -> Self {
        self.riders = riders;
        self
    }

    pub fn with_jitter_degrees(mut self, jitter: f64) -> Self {
        self.jitter_degrees = jitter;
        self
    }

    pub fn with_time_spread(mut self, spread: Duration) -> Self {
        self.time_spread = spread;
        self
    }
}

/// Submit the scenario's requests to `store`. Returns the assigned ids in
/// submission order.
pub fn build_scenario(
    store: &InMemoryRequestStore,
    params: &ScenarioParams,
) -> Result<Vec<RequestId>, StoreError> {
    let mut rng: StdRng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let spread_minutes = params.time_spread.num_minutes();
    let jitter = params.jitter_degrees;

    let mut ids = Vec::new();
    let mut rider_id = 0;
    for (region, count) in &params.riders {
        let anchor = region_anchor(*region);
        for _ in 0..*count {
            rider_id += 1;
            let offset = Duration::minutes(rng.gen_range(-spread_minutes..=spread_minutes));
            let destination = GeoPoint::new(
                anchor.lat + rng.gen_range(-jitter..=jitter),
                anchor.lng + rng.gen_range(-jitter..=jitter),
            );
            let id = store.submit(NewRideRequest {
                rider_id,
                region: *region,
                requested_time: params.center_time + offset,
                destination,
            })?;
            ids.push(id);
        }
    }
    Ok(ids)
}
