use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Destination macro-areas used as the primary grouping key.
///
/// Buckets are coarse on purpose: riders heading into the same macro-area
/// share one vehicle, and virtual stops resolve their fine-grained
/// destinations within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Region {
    Downtown,
    Mission,
    Sunset,
    Oakland,
    Berkeley,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Downtown,
        Region::Mission,
        Region::Sunset,
        Region::Oakland,
        Region::Berkeley,
    ];
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Region::Downtown => "Downtown",
            Region::Mission => "Mission",
            Region::Sunset => "Sunset",
            Region::Oakland => "Oakland",
            Region::Berkeley => "Berkeley",
        };
        write!(f, "{}", name)
    }
}

/// Stable request identity, assigned by the store at submission. Immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a committed group, assigned by the store at commit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A destination coordinate in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the usual lat/lng bounds. Anything else came from a
    /// broken geocode and must not reach centroid math.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && self.lat.abs() <= 90.0
            && self.lng.abs() <= 180.0
    }
}

/// Request lifecycle. A request starts `Pending` and transitions exactly once,
/// by the consolidation engine, into one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Matched,
    CanceledNoCapacity,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// One rider's ask: where to, when, and for whom.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideRequest {
    pub id: RequestId,
    /// Id of the submitting rider, carried through for the intake collaborator.
    pub rider_id: u64,
    pub region: Region,
    pub status: RequestStatus,
    /// Desired departure on the shared UTC clock.
    pub requested_time: DateTime<Utc>,
    pub destination: GeoPoint,
}

/// Submission payload before the store has assigned an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRideRequest {
    pub rider_id: u64,
    pub region: Region,
    pub requested_time: DateTime<Utc>,
    pub destination: GeoPoint,
}

/// A computed shared pickup/drop-off coordinate representing a cluster of
/// nearby destinations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VirtualStop {
    pub lat: f64,
    pub lng: f64,
}

/// The output of one successful consolidation. Append-only: created once by
/// the committer and never mutated afterward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedGroup {
    pub id: GroupId,
    /// Single departure shared by all members, on the 10-minute grid.
    pub final_departure_time: DateTime<Utc>,
    /// One stop per spatial cluster, in clustering-result order.
    pub virtual_stops: Vec<VirtualStop>,
    /// Member ids in region-bucket iteration order.
    pub member_request_ids: Vec<RequestId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geo_point_rejects_non_finite_and_out_of_range() {
        assert!(GeoPoint::new(37.2, 127.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 127.0).is_valid());
        assert!(!GeoPoint::new(37.2, f64::INFINITY).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, -180.5).is_valid());
    }

    #[test]
    fn pending_is_the_only_non_terminal_status() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Matched.is_terminal());
        assert!(RequestStatus::CanceledNoCapacity.is_terminal());
    }
}
