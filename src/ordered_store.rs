//! The single external capability the throttling core needs: an ordered
//! collection of `(score, member)` pairs with atomic insert, range removal and
//! range count.
//!
//! Scores are event timestamps in milliseconds. Implementations must make each
//! individual operation atomic; no cross-operation transaction is expected.

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{BackstopError, CollectionName};

/// One end of a score range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreBound {
    /// Unbounded below.
    NegInfinity,
    /// Unbounded above.
    PosInfinity,
    /// The score itself is part of the range.
    Inclusive(u64),
    /// The score itself is not part of the range.
    Exclusive(u64),
}

impl ScoreBound {
    /// Resolve a `[min, max]` pair into an inclusive integer range.
    ///
    /// Returns `None` when the range holds no integer score.
    pub fn inclusive_range(min: ScoreBound, max: ScoreBound) -> Option<(u64, u64)> {
        let lo = match min {
            ScoreBound::NegInfinity => 0,
            ScoreBound::PosInfinity => return None,
            ScoreBound::Inclusive(n) => n,
            ScoreBound::Exclusive(n) => n.checked_add(1)?,
        };
        let hi = match max {
            ScoreBound::NegInfinity => return None,
            ScoreBound::PosInfinity => u64::MAX,
            ScoreBound::Inclusive(n) => n,
            ScoreBound::Exclusive(n) => n.checked_sub(1)?,
        };

        (lo <= hi).then_some((lo, hi))
    }
}

/// Renders the bound using Redis sorted-set syntax (`-inf`, `+inf`, `42`, `(42`).
impl fmt::Display for ScoreBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreBound::NegInfinity => f.write_str("-inf"),
            ScoreBound::PosInfinity => f.write_str("+inf"),
            ScoreBound::Inclusive(n) => write!(f, "{n}"),
            ScoreBound::Exclusive(n) => write!(f, "({n}"),
        }
    }
}

/// A persistent, time-ordered store shared by every recorder and evaluator of a
/// collection.
///
/// All failures (unreachable store, rejected command, timeout) are reported as
/// [`BackstopError::StoreUnavailable`].
#[async_trait]
pub trait OrderedStore: Send + Sync {
    /// Add `member` with `score`. Re-adding an existing member moves it to the new score.
    async fn insert(
        &self,
        collection: &CollectionName,
        score: u64,
        member: &str,
    ) -> Result<(), BackstopError>;

    /// Remove every member whose score lies in `[min, max]`, returning how many were removed.
    async fn remove_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError>;

    /// Count members whose score lies in `[min, max]`.
    async fn count_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError>;

    /// Drop the whole collection. Dropping a missing collection is not an error.
    async fn delete_collection(&self, collection: &CollectionName) -> Result<(), BackstopError>;
}

#[async_trait]
impl<T: OrderedStore + ?Sized> OrderedStore for Arc<T> {
    async fn insert(
        &self,
        collection: &CollectionName,
        score: u64,
        member: &str,
    ) -> Result<(), BackstopError> {
        (**self).insert(collection, score, member).await
    }

    async fn remove_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        (**self).remove_range(collection, min, max).await
    }

    async fn count_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        (**self).count_range(collection, min, max).await
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<(), BackstopError> {
        (**self).delete_collection(collection).await
    }
}
