//! Top-level entrypoint that wires a store, a clock and a collection name into a
//! recorder and an evaluator.
//!
//! The store is any [`OrderedStore`]: the in-process [`LocalOrderedStore`](crate::local::LocalOrderedStore)
//! or, behind the `redis-tokio` / `redis-smol` features, a Redis sorted set.

use crate::{
    BackstopError, Clock, CollectionName, EventRecorder, OrderedStore, SystemClock,
    WindowEvaluator,
};

/// Top-level configuration for [`Backstop`].
#[derive(Clone, Debug, Default)]
pub struct BackstopOptions {
    /// Name of the shared failure log.
    ///
    /// If `None`, defaults to [`CollectionName::default_collection`]. Distinct
    /// limiters sharing a store need distinct names.
    pub collection: Option<CollectionName>,
}

/// Failure throttling entrypoint.
///
/// Producers report failures through [`Backstop::recorder`]; decision points ask
/// [`Backstop::evaluator`] whether to back off. Both hold clones of the same store
/// handle and clock.
pub struct Backstop<S, C = SystemClock> {
    store: S,
    recorder: EventRecorder<S, C>,
    evaluator: WindowEvaluator<S, C>,
}

impl<S> Backstop<S, SystemClock>
where
    S: OrderedStore + Clone,
{
    /// Create a [`Backstop`] timed by the system clock.
    pub fn new(store: S, options: BackstopOptions) -> Self {
        Self::with_clock(store, options, SystemClock)
    }
}

impl<S, C> Backstop<S, C>
where
    S: OrderedStore + Clone,
    C: Clock + Clone,
{
    /// Create a [`Backstop`] timed by `clock`.
    pub fn with_clock(store: S, options: BackstopOptions, clock: C) -> Self {
        let collection = options.collection.unwrap_or_default();

        Self {
            recorder: EventRecorder::new(store.clone(), collection.clone(), clock.clone()),
            evaluator: WindowEvaluator::new(store.clone(), collection, clock),
            store,
        }
    }

    /// Access the store handle shared by the recorder and the evaluator.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Access the event recorder.
    pub fn recorder(&self) -> &EventRecorder<S, C> {
        &self.recorder
    }

    /// Access the window evaluator.
    pub fn evaluator(&self) -> &WindowEvaluator<S, C> {
        &self.evaluator
    }

    /// The collection both halves operate on.
    pub fn collection(&self) -> &CollectionName {
        self.evaluator.collection()
    }

    /// Drop the whole failure log.
    ///
    /// Meant for starting independent runs from a clean slate, not for the steady
    /// state decision cycle.
    pub async fn reset(&self) -> Result<(), BackstopError> {
        tracing::debug!(collection = %self.collection(), "resetting failure log");
        self.store.delete_collection(self.collection()).await
    }
}
