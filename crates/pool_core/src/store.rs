//! The request-store seam between the engine and its persistence
//! collaborator.
//!
//! The engine never mutates rows ad hoc: each region outcome is expressed as
//! one [RegionCommit] value and handed to the store in a single [commit]
//! call, which must apply it atomically — all members transition together
//! with the group record, or nothing is written.
//!
//! [commit]: RequestStore::commit

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::request::{
    GroupId, MatchedGroup, NewRideRequest, RequestId, RequestStatus, RideRequest, VirtualStop,
};
use crate::window::MatchWindow;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("unknown request id {0}")]
    UnknownRequest(RequestId),
    #[error("request {id} is {status:?}, expected Pending")]
    InvalidTransition {
        id: RequestId,
        status: RequestStatus,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A matched group as computed by the engine, before the store has assigned
/// its id.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDraft {
    pub final_departure_time: DateTime<Utc>,
    pub virtual_stops: Vec<VirtualStop>,
    pub member_request_ids: Vec<RequestId>,
}

/// One atomic commit unit: the full outcome for one region bucket.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionCommit {
    /// Capacity shortfall: every member transitions to `CanceledNoCapacity`;
    /// no group record is created.
    Cancel { request_ids: Vec<RequestId> },
    /// Consolidation: persist the group, then transition every member to
    /// `Matched`, as one unit.
    Match { draft: GroupDraft },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Assigned id on the match path, `None` on the cancel path.
    pub group_id: Option<GroupId>,
    pub requests_updated: usize,
}

/// Operations the engine consumes from the persistence collaborator.
pub trait RequestStore: Send + Sync {
    /// All `Pending` requests whose requested time falls in `window`
    /// (inclusive start, exclusive end), in a stable order.
    fn fetch_pending(&self, window: &MatchWindow) -> Result<Vec<RideRequest>, StoreError>;

    /// Apply one region outcome atomically.
    fn commit(&self, commit: RegionCommit) -> Result<CommitReceipt, StoreError>;
}

/// Reference store backing tests, examples, and the experiments crate.
/// Ids are assigned monotonically, so id order is submission order.
#[derive(Debug, Default)]
pub struct InMemoryRequestStore {
    inner: Mutex<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    requests: BTreeMap<RequestId, RideRequest>,
    groups: Vec<MatchedGroup>,
    next_request_id: u64,
    next_group_id: u64,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intake surface: persist a new request as `Pending` and assign its id.
    pub fn submit(&self, new_request: NewRideRequest) -> Result<RequestId, StoreError> {
        let mut inner = self.lock()?;
        inner.next_request_id += 1;
        let id = RequestId(inner.next_request_id);
        inner.requests.insert(
            id,
            RideRequest {
                id,
                rider_id: new_request.rider_id,
                region: new_request.region,
                status: RequestStatus::Pending,
                requested_time: new_request.requested_time,
                destination: new_request.destination,
            },
        );
        Ok(id)
    }

    pub fn request(&self, id: RequestId) -> Result<Option<RideRequest>, StoreError> {
        Ok(self.lock()?.requests.get(&id).cloned())
    }

    /// All requests in id order.
    pub fn requests(&self) -> Result<Vec<RideRequest>, StoreError> {
        Ok(self.lock()?.requests.values().cloned().collect())
    }

    /// All committed groups in commit order.
    pub fn groups(&self) -> Result<Vec<MatchedGroup>, StoreError> {
        Ok(self.lock()?.groups.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".into()))
    }
}

impl StoreInner {
    /// Every referenced request must exist and still be `Pending`; checked
    /// before any write so a failure leaves the store untouched.
    fn check_all_pending(&self, ids: &[RequestId]) -> Result<(), StoreError> {
        for id in ids {
            let request = self
                .requests
                .get(id)
                .ok_or(StoreError::UnknownRequest(*id))?;
            if request.status != RequestStatus::Pending {
                return Err(StoreError::InvalidTransition {
                    id: *id,
                    status: request.status,
                });
            }
        }
        Ok(())
    }

    fn set_status(&mut self, ids: &[RequestId], status: RequestStatus) {
        for id in ids {
            if let Some(request) = self.requests.get_mut(id) {
                request.status = status;
            }
        }
    }
}

impl RequestStore for InMemoryRequestStore {
    fn fetch_pending(&self, window: &MatchWindow) -> Result<Vec<RideRequest>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending && window.contains(r.requested_time))
            .cloned()
            .collect())
    }

    fn commit(&self, commit: RegionCommit) -> Result<CommitReceipt, StoreError> {
        let mut inner = self.lock()?;
        match commit {
            RegionCommit::Cancel { request_ids } => {
                inner.check_all_pending(&request_ids)?;
                inner.set_status(&request_ids, RequestStatus::CanceledNoCapacity);
                Ok(CommitReceipt {
                    group_id: None,
                    requests_updated: request_ids.len(),
                })
            }
            RegionCommit::Match { draft } => {
                inner.check_all_pending(&draft.member_request_ids)?;
                inner.next_group_id += 1;
                let group_id = GroupId(inner.next_group_id);
                inner.groups.push(MatchedGroup {
                    id: group_id,
                    final_departure_time: draft.final_departure_time,
                    virtual_stops: draft.virtual_stops,
                    member_request_ids: draft.member_request_ids.clone(),
                });
                inner.set_status(&draft.member_request_ids, RequestStatus::Matched);
                Ok(CommitReceipt {
                    group_id: Some(group_id),
                    requests_updated: draft.member_request_ids.len(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::config::MatchPolicy;
    use crate::request::{GeoPoint, Region};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, m, 0).unwrap()
    }

    fn submit_at(store: &InMemoryRequestStore, requested_time: DateTime<Utc>) -> RequestId {
        store
            .submit(NewRideRequest {
                rider_id: 7,
                region: Region::Downtown,
                requested_time,
                destination: GeoPoint::new(37.78, -122.41),
            })
            .expect("submit")
    }

    #[test]
    fn fetch_pending_filters_on_status_and_window() {
        let store = InMemoryRequestStore::new();
        let policy = MatchPolicy::new(4);
        let window = MatchWindow::around(at(8, 0), &policy); // [10:30, 11:30)

        let inside = submit_at(&store, at(11, 0));
        let boundary_start = submit_at(&store, at(10, 30));
        let boundary_end = submit_at(&store, at(11, 30));
        submit_at(&store, at(9, 0));

        let matched = submit_at(&store, at(11, 10));
        store
            .commit(RegionCommit::Cancel {
                request_ids: vec![matched],
            })
            .expect("commit");

        let pending: Vec<RequestId> = store
            .fetch_pending(&window)
            .expect("fetch")
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(pending, vec![inside, boundary_start]);
        assert!(!pending.contains(&boundary_end));
    }

    #[test]
    fn match_commit_creates_group_and_flips_members_atomically() {
        let store = InMemoryRequestStore::new();
        let a = submit_at(&store, at(11, 0));
        let b = submit_at(&store, at(11, 10));

        let receipt = store
            .commit(RegionCommit::Match {
                draft: GroupDraft {
                    final_departure_time: at(11, 10),
                    virtual_stops: vec![VirtualStop {
                        lat: 37.78,
                        lng: -122.41,
                    }],
                    member_request_ids: vec![a, b],
                },
            })
            .expect("commit");

        assert_eq!(receipt.requests_updated, 2);
        let group_id = receipt.group_id.expect("group id assigned");

        let groups = store.groups().expect("groups");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].id, group_id);
        assert_eq!(groups[0].member_request_ids, vec![a, b]);
        for id in [a, b] {
            let status = store.request(id).expect("request").expect("exists").status;
            assert_eq!(status, RequestStatus::Matched);
        }
    }

    #[test]
    fn commit_referencing_a_resolved_request_writes_nothing() {
        let store = InMemoryRequestStore::new();
        let a = submit_at(&store, at(11, 0));
        let b = submit_at(&store, at(11, 10));
        store
            .commit(RegionCommit::Cancel {
                request_ids: vec![b],
            })
            .expect("first commit");

        let err = store
            .commit(RegionCommit::Match {
                draft: GroupDraft {
                    final_departure_time: at(11, 0),
                    virtual_stops: Vec::new(),
                    member_request_ids: vec![a, b],
                },
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition { .. }));

        // The unit failed as a whole: `a` is still pending and no group exists.
        let status = store.request(a).expect("request").expect("exists").status;
        assert_eq!(status, RequestStatus::Pending);
        assert!(store.groups().expect("groups").is_empty());
    }

    #[test]
    fn unknown_request_id_is_rejected() {
        let store = InMemoryRequestStore::new();
        let err = store
            .commit(RegionCommit::Cancel {
                request_ids: vec![RequestId(99)],
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownRequest(RequestId(99))));
    }
}
