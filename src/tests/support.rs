use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    BackstopError, CollectionName, ManualClock, OrderedStore, ScoreBound, ThrottlingConfiguration,
    local::LocalOrderedStore,
};

/// Arbitrary non-zero start so that window arithmetic never saturates at the epoch.
pub(super) const START_MS: u64 = 1_700_000_000_000;

pub(super) fn config(max_error_count: i64, window_size_seconds: f64) -> ThrottlingConfiguration {
    ThrottlingConfiguration {
        max_error_count,
        window_size_seconds,
    }
}

pub(super) fn collection(name: &str) -> CollectionName {
    CollectionName::try_from(name).unwrap()
}

pub(super) fn clock() -> ManualClock {
    ManualClock::new(START_MS)
}

/// Wraps a [`LocalOrderedStore`] and counts every call that reaches it.
#[derive(Debug, Clone, Default)]
pub(super) struct CountingStore {
    pub inner: LocalOrderedStore,
    calls: Arc<AtomicUsize>,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl OrderedStore for CountingStore {
    async fn insert(
        &self,
        collection: &CollectionName,
        score: u64,
        member: &str,
    ) -> Result<(), BackstopError> {
        self.hit();
        self.inner.insert(collection, score, member).await
    }

    async fn remove_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        self.hit();
        self.inner.remove_range(collection, min, max).await
    }

    async fn count_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        self.hit();
        self.inner.count_range(collection, min, max).await
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<(), BackstopError> {
        self.hit();
        self.inner.delete_collection(collection).await
    }
}

/// Which operation an [`UnreachableStore`] refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum FailOn {
    Everything,
    Count,
}

/// A store that cannot be reached, optionally only for counting.
#[derive(Debug, Clone)]
pub(super) struct UnreachableStore {
    pub inner: LocalOrderedStore,
    pub fail_on: FailOn,
}

impl UnreachableStore {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: LocalOrderedStore::new(),
            fail_on,
        }
    }

    fn refuse(&self) -> Result<(), BackstopError> {
        match self.fail_on {
            FailOn::Everything => Err(BackstopError::StoreUnavailable(
                "connection refused".to_string(),
            )),
            FailOn::Count => Ok(()),
        }
    }
}

#[async_trait]
impl OrderedStore for UnreachableStore {
    async fn insert(
        &self,
        collection: &CollectionName,
        score: u64,
        member: &str,
    ) -> Result<(), BackstopError> {
        self.refuse()?;
        self.inner.insert(collection, score, member).await
    }

    async fn remove_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        self.refuse()?;
        self.inner.remove_range(collection, min, max).await
    }

    async fn count_range(
        &self,
        _collection: &CollectionName,
        _min: ScoreBound,
        _max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        Err(BackstopError::StoreUnavailable(
            "connection reset".to_string(),
        ))
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<(), BackstopError> {
        self.refuse()?;
        self.inner.delete_collection(collection).await
    }
}
