//! Shared fixtures for engine integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use pool_core::request::RideRequest;
use pool_core::store::{
    CommitReceipt, InMemoryRequestStore, RegionCommit, RequestStore, StoreError,
};
use pool_core::window::MatchWindow;

/// Store wrapper that injects a commit failure after `fail_after` successful
/// commits, for exercising the per-region transaction boundary.
pub struct FailingStore {
    pub inner: InMemoryRequestStore,
    fail_fetch: bool,
    fail_after: usize,
    commits_attempted: AtomicUsize,
}

impl FailingStore {
    pub fn failing_after(fail_after: usize) -> Self {
        Self {
            inner: InMemoryRequestStore::new(),
            fail_fetch: false,
            fail_after,
            commits_attempted: AtomicUsize::new(0),
        }
    }

    pub fn failing_fetch() -> Self {
        Self {
            inner: InMemoryRequestStore::new(),
            fail_fetch: true,
            fail_after: usize::MAX,
            commits_attempted: AtomicUsize::new(0),
        }
    }
}

impl RequestStore for FailingStore {
    fn fetch_pending(&self, window: &MatchWindow) -> Result<Vec<RideRequest>, StoreError> {
        if self.fail_fetch {
            return Err(StoreError::Unavailable("injected fetch failure".into()));
        }
        self.inner.fetch_pending(window)
    }

    fn commit(&self, commit: RegionCommit) -> Result<CommitReceipt, StoreError> {
        let attempt = self.commits_attempted.fetch_add(1, Ordering::SeqCst);
        if attempt >= self.fail_after {
            return Err(StoreError::Unavailable("injected commit failure".into()));
        }
        self.inner.commit(commit)
    }
}
