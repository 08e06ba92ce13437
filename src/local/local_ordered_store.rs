use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{BackstopError, CollectionName, OrderedStore, ScoreBound};

/// Members of one collection, indexed both by score and by member.
#[derive(Debug, Default)]
pub(crate) struct SortedLog {
    by_score: BTreeMap<u64, BTreeSet<Arc<str>>>,
    scores: HashMap<Arc<str>, u64>,
}

impl SortedLog {
    fn insert(&mut self, score: u64, member: &str) {
        if let Some(previous) = self.scores.get(member).copied() {
            if previous == score {
                return;
            }
            self.detach(previous, member);
        }

        let member: Arc<str> = Arc::from(member);
        self.by_score
            .entry(score)
            .or_default()
            .insert(member.clone());
        self.scores.insert(member, score);
    }

    fn detach(&mut self, score: u64, member: &str) {
        if let Some(members) = self.by_score.get_mut(&score) {
            members.remove(member);
            if members.is_empty() {
                self.by_score.remove(&score);
            }
        }
    }

    fn count(&self, lo: u64, hi: u64) -> u64 {
        self.by_score
            .range(lo..=hi)
            .map(|(_, members)| members.len() as u64)
            .sum()
    }

    fn remove(&mut self, lo: u64, hi: u64) -> u64 {
        let expired: Vec<u64> = self.by_score.range(lo..=hi).map(|(score, _)| *score).collect();

        let mut removed = 0;
        for score in expired {
            if let Some(members) = self.by_score.remove(&score) {
                removed += members.len() as u64;
                for member in members {
                    self.scores.remove(&member);
                }
            }
        }

        removed
    }

    fn len(&self) -> usize {
        self.scores.len()
    }

    fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// In-process [`OrderedStore`].
///
/// Keeps every collection in a [`DashMap`](dashmap::DashMap). Each operation holds
/// the collection's shard lock for its whole duration, so inserts, range removals
/// and range counts are atomic with respect to each other, mirroring the
/// per-command atomicity of a Redis sorted set.
///
/// # Semantics
///
/// - Re-inserting an existing member moves it to the new score (`ZADD`).
/// - Empty or inverted ranges match nothing.
/// - A collection that becomes empty is dropped, like a Redis key.
///
/// Clones share the same state, so one store can be handed to any number of
/// recorders and evaluators, including across threads.
///
/// # Examples
///
/// ```
/// use backstop::{CollectionName, OrderedStore, ScoreBound};
/// use backstop::local::LocalOrderedStore;
///
/// futures::executor::block_on(async {
///     let store = LocalOrderedStore::new();
///     let log = CollectionName::default();
///
///     store.insert(&log, 1_000, "a").await.unwrap();
///     store.insert(&log, 2_000, "b").await.unwrap();
///
///     let live = store
///         .count_range(&log, ScoreBound::Inclusive(1_500), ScoreBound::PosInfinity)
///         .await
///         .unwrap();
///     assert_eq!(live, 1);
/// });
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalOrderedStore {
    collections: Arc<DashMap<CollectionName, SortedLog>>,
}

impl LocalOrderedStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    } // end constructor

    /// Number of members currently held in `collection`.
    pub fn len(&self, collection: &CollectionName) -> usize {
        self.collections
            .get(collection)
            .map(|log| log.len())
            .unwrap_or(0)
    }

    /// Whether `collection` holds no members.
    pub fn is_empty(&self, collection: &CollectionName) -> bool {
        self.len(collection) == 0
    }

    /// Score currently stored for `member`, if any.
    pub fn score(&self, collection: &CollectionName, member: &str) -> Option<u64> {
        self.collections
            .get(collection)
            .and_then(|log| log.scores.get(member).copied())
    }
}

#[async_trait]
impl OrderedStore for LocalOrderedStore {
    async fn insert(
        &self,
        collection: &CollectionName,
        score: u64,
        member: &str,
    ) -> Result<(), BackstopError> {
        self.collections
            .entry(collection.clone())
            .or_default()
            .insert(score, member);

        Ok(())
    }

    async fn remove_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        let Some((lo, hi)) = ScoreBound::inclusive_range(min, max) else {
            return Ok(0);
        };

        let removed = match self.collections.get_mut(collection) {
            Some(mut log) => log.remove(lo, hi),
            None => return Ok(0),
        };

        if removed > 0 {
            self.collections.remove_if(collection, |_, log| log.is_empty());
        }

        Ok(removed)
    }

    async fn count_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        let Some((lo, hi)) = ScoreBound::inclusive_range(min, max) else {
            return Ok(0);
        };

        Ok(self
            .collections
            .get(collection)
            .map(|log| log.count(lo, hi))
            .unwrap_or(0))
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<(), BackstopError> {
        self.collections.remove(collection);
        Ok(())
    }
}
