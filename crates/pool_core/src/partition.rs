//! Regional partitioning: split the candidate set into disjoint buckets keyed
//! by destination region, preserving selector order within each bucket.

use std::collections::BTreeMap;

use crate::request::{Region, RideRequest};

/// Pure grouping. `BTreeMap` keeps per-pass region iteration deterministic.
pub fn partition_by_region(requests: Vec<RideRequest>) -> BTreeMap<Region, Vec<RideRequest>> {
    let mut buckets: BTreeMap<Region, Vec<RideRequest>> = BTreeMap::new();
    for request in requests {
        buckets.entry(request.region).or_default().push(request);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::request::{GeoPoint, RequestId, RequestStatus};

    fn request(id: u64, region: Region) -> RideRequest {
        RideRequest {
            id: RequestId(id),
            rider_id: id,
            region,
            status: RequestStatus::Pending,
            requested_time: Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap(),
            destination: GeoPoint::new(37.78, -122.41),
        }
    }

    #[test]
    fn partitions_are_disjoint_and_order_preserving() {
        let buckets = partition_by_region(vec![
            request(1, Region::Downtown),
            request(2, Region::Oakland),
            request(3, Region::Downtown),
            request(4, Region::Oakland),
            request(5, Region::Downtown),
        ]);

        assert_eq!(buckets.len(), 2);
        let downtown: Vec<u64> = buckets[&Region::Downtown].iter().map(|r| r.id.0).collect();
        let oakland: Vec<u64> = buckets[&Region::Oakland].iter().map(|r| r.id.0).collect();
        assert_eq!(downtown, vec![1, 3, 5]);
        assert_eq!(oakland, vec![2, 4]);

        let total: usize = buckets.values().map(Vec::len).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(partition_by_region(Vec::new()).is_empty());
    }
}
