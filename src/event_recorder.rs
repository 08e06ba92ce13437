use crate::{BackstopError, Clock, CollectionName, EventId, OrderedStore, SystemClock};

/// Appends failure events to the shared log.
///
/// Each call inserts one member into the collection, scored with the clock's
/// current time. Recording is append-only and keeps no local state, so any number
/// of recorders may write to the same collection concurrently. Events recorded at
/// the same millisecond are all kept as long as their identifiers differ.
///
/// Store failures are returned as [`BackstopError::StoreUnavailable`] without any
/// retry; the caller owns the retry policy.
#[derive(Debug, Clone)]
pub struct EventRecorder<S, C = SystemClock> {
    store: S,
    collection: CollectionName,
    clock: C,
}

impl<S, C> EventRecorder<S, C>
where
    S: OrderedStore,
    C: Clock,
{
    /// Create a recorder writing to `collection` in `store`.
    pub fn new(store: S, collection: CollectionName, clock: C) -> Self {
        Self {
            store,
            collection,
            clock,
        }
    } // end constructor

    /// The collection this recorder appends to.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Record that the operation identified by `id` failed just now.
    pub async fn record(&self, id: &EventId) -> Result<(), BackstopError> {
        let occurred_at = self.clock.now_ms();

        tracing::trace!(collection = %self.collection, %id, occurred_at, "recording failure");

        self.store
            .insert(&self.collection, occurred_at, id.as_str())
            .await
    } // end method record

    /// Record a failure under a freshly generated random identifier.
    pub async fn record_new(&self) -> Result<EventId, BackstopError> {
        let id = EventId::random();
        self.record(&id).await?;

        Ok(id)
    }
}
