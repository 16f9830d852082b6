use pool_core::config::MatchPolicy;
use pool_core::engine::MatchingEngine;
use pool_core::request::{Region, RequestId, RequestStatus};
use pool_core::store::InMemoryRequestStore;
use pool_core::telemetry::RegionResolution;
use pool_core::test_helpers::{seed_request, test_policy, trigger_instant};

/// Region Downtown: two tight spatial pairs plus two singletons, all inside
/// the window. Region Oakland: two riders, below the floor of four.
fn seed_mixed_scenario(store: &InMemoryRequestStore) -> (Vec<RequestId>, Vec<RequestId>) {
    let downtown = vec![
        seed_request(store, Region::Downtown, -20, 37.7890, -122.4010),
        seed_request(store, Region::Downtown, 10, 37.7895, -122.4012),
        seed_request(store, Region::Downtown, 15, 37.7760, -122.4140),
        seed_request(store, Region::Downtown, 25, 37.7762, -122.4142),
        seed_request(store, Region::Downtown, 0, 37.8000, -122.4300),
        seed_request(store, Region::Downtown, 5, 37.7820, -122.3900),
    ];
    let oakland = vec![
        seed_request(store, Region::Oakland, -5, 37.8040, -122.2710),
        seed_request(store, Region::Oakland, 5, 37.8045, -122.2712),
    ];
    (downtown, oakland)
}

#[test]
fn oversubscribed_region_commits_one_group_for_all_members() {
    let store = InMemoryRequestStore::new();
    let (downtown, _) = seed_mixed_scenario(&store);
    let engine = MatchingEngine::new(store, test_policy()).expect("engine");

    let summary = engine.run_pass(trigger_instant()).expect("pass");
    assert_eq!(summary.candidates, 8);
    assert_eq!(summary.groups_committed(), 1);
    assert_eq!(summary.requests_matched(), 6);
    assert_eq!(summary.requests_canceled(), 2);

    let groups = engine.store().groups().expect("groups");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].member_request_ids, downtown);

    for id in &downtown {
        let status = engine
            .store()
            .request(*id)
            .expect("request")
            .expect("exists")
            .status;
        assert_eq!(status, RequestStatus::Matched);
    }
}

#[test]
fn virtual_stops_cover_every_member_destination() {
    let store = InMemoryRequestStore::new();
    seed_mixed_scenario(&store);
    let policy = test_policy();
    let epsilon = policy.cluster_epsilon;
    let engine = MatchingEngine::new(store, policy).expect("engine");

    engine.run_pass(trigger_instant()).expect("pass");
    let groups = engine.store().groups().expect("groups");
    let stops = &groups[0].virtual_stops;

    // Two pair centroids plus one single-point stop per noise rider.
    assert_eq!(stops.len(), 4);

    for id in &groups[0].member_request_ids {
        let destination = engine
            .store()
            .request(*id)
            .expect("request")
            .expect("exists")
            .destination;
        let covered = stops.iter().any(|s| {
            let d_lat = destination.lat - s.lat;
            let d_lng = destination.lng - s.lng;
            (d_lat * d_lat + d_lng * d_lng).sqrt() <= epsilon
        });
        assert!(covered, "destination of request {id} has no nearby stop");
    }
}

#[test]
fn departure_time_is_the_rounded_mean_of_requested_times() {
    let store = InMemoryRequestStore::new();
    seed_mixed_scenario(&store);
    let engine = MatchingEngine::new(store, test_policy()).expect("engine");

    engine.run_pass(trigger_instant()).expect("pass");
    let groups = engine.store().groups().expect("groups");

    // Offsets -20, 10, 15, 25, 0, 5 average to +5:50 past the 11:00 center;
    // minute 5 is a tie and settles back onto the hour.
    assert_eq!(
        groups[0].final_departure_time,
        pool_core::test_helpers::central_instant()
    );
}

#[test]
fn undersubscribed_region_cancels_every_member() {
    let store = InMemoryRequestStore::new();
    let (_, oakland) = seed_mixed_scenario(&store);
    let engine = MatchingEngine::new(store, test_policy()).expect("engine");

    let summary = engine.run_pass(trigger_instant()).expect("pass");
    let oakland_outcome = summary
        .outcomes
        .iter()
        .find(|o| o.region == Region::Oakland)
        .expect("oakland outcome");
    assert_eq!(oakland_outcome.riders, 2);
    assert_eq!(oakland_outcome.resolution, RegionResolution::Canceled);

    for id in &oakland {
        let status = engine
            .store()
            .request(*id)
            .expect("request")
            .expect("exists")
            .status;
        assert_eq!(status, RequestStatus::CanceledNoCapacity);
    }

    // No group record exists for the canceled bucket.
    let groups = engine.store().groups().expect("groups");
    assert!(groups
        .iter()
        .all(|g| g.member_request_ids.iter().all(|id| !oakland.contains(id))));
}

#[test]
fn bucket_at_exactly_the_floor_is_matched() {
    let store = InMemoryRequestStore::new();
    seed_request(&store, Region::Sunset, -10, 37.7530, -122.4940);
    seed_request(&store, Region::Sunset, -5, 37.7532, -122.4941);
    seed_request(&store, Region::Sunset, 5, 37.7600, -122.5000);
    seed_request(&store, Region::Sunset, 10, 37.7601, -122.5001);
    let engine = MatchingEngine::new(store, MatchPolicy::new(4)).expect("engine");

    let summary = engine.run_pass(trigger_instant()).expect("pass");
    assert_eq!(summary.groups_committed(), 1);
    assert_eq!(summary.requests_matched(), 4);
    assert_eq!(summary.requests_canceled(), 0);
}

#[test]
fn requests_outside_the_window_are_untouched() {
    let store = InMemoryRequestStore::new();
    seed_mixed_scenario(&store);
    // 45 minutes past the center is outside the 30-minute half-width.
    let outside = seed_request(&store, Region::Downtown, 45, 37.7890, -122.4010);
    let engine = MatchingEngine::new(store, test_policy()).expect("engine");

    let summary = engine.run_pass(trigger_instant()).expect("pass");
    assert_eq!(summary.candidates, 8);

    let status = engine
        .store()
        .request(outside)
        .expect("request")
        .expect("exists")
        .status;
    assert_eq!(status, RequestStatus::Pending);
}
