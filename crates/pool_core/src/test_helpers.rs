//! Test helpers for common setup across test files.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::config::MatchPolicy;
use crate::request::{GeoPoint, NewRideRequest, Region, RequestId};
use crate::store::InMemoryRequestStore;

/// Fixed trigger instant used across test files: 2024-03-15 08:00 UTC.
/// With the default policy the selected window is [10:30, 11:30).
pub fn trigger_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0)
        .single()
        .expect("fixed test instant is valid")
}

/// Center of the default window for [trigger_instant]: 11:00 UTC.
pub fn central_instant() -> DateTime<Utc> {
    trigger_instant() + Duration::hours(3)
}

/// Submit one pending request with its desired time given as a minute offset
/// from [central_instant].
pub fn seed_request(
    store: &InMemoryRequestStore,
    region: Region,
    minute_offset: i64,
    lat: f64,
    lng: f64,
) -> RequestId {
    store
        .submit(NewRideRequest {
            rider_id: 0,
            region,
            requested_time: central_instant() + Duration::minutes(minute_offset),
            destination: GeoPoint::new(lat, lng),
        })
        .expect("seed request")
}

/// Default policy with the capacity floor the end-to-end scenarios use.
pub fn test_policy() -> MatchPolicy {
    MatchPolicy::new(4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::MatchWindow;

    #[test]
    fn central_instant_is_the_window_center() {
        let window = MatchWindow::around(trigger_instant(), &test_policy());
        assert_eq!(window.center(), central_instant());
    }

    #[test]
    fn seeded_requests_fall_inside_the_default_window() {
        let store = InMemoryRequestStore::new();
        seed_request(&store, Region::Downtown, -20, 37.789, -122.401);
        seed_request(&store, Region::Downtown, 25, 37.790, -122.402);

        let window = MatchWindow::around(trigger_instant(), &test_policy());
        for request in store.requests().expect("requests") {
            assert!(window.contains(request.requested_time));
        }
    }
}
