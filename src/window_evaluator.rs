use crate::{
    BackstopError, Clock, CollectionName, OrderedStore, ScoreBound, SystemClock,
    ThrottleDecision, ThrottlingConfiguration, WindowEvaluation, WindowPolicy,
};

/// Decides whether the failure rate over the trailing window calls for backing off.
///
/// # Algorithm
///
/// 1. **Validate:** reject non-positive thresholds or windows before touching the store
/// 2. **Snapshot:** read `now` once; `lookback = now - window_size`
/// 3. **Prune:** remove every event scored strictly below `lookback`
/// 4. **Count:** count events scored at or above `lookback`
/// 5. **Decide:** `Throttle` if `count >= max_error_count`, `Proceed` otherwise
///
/// An event exactly at `lookback` survives the prune and is counted.
///
/// # Semantics & Limitations
///
/// **Level-triggered:**
/// - No "currently throttling" flag is kept; every call re-derives the decision
/// - As long as enough events stay inside the window every call returns `Throttle`
/// - Detecting transitions is up to the consumer comparing consecutive results
///
/// **Approximate at the boundary:**
/// - Prune and count are two separate store operations sharing one `now`
/// - A failure recorded concurrently may or may not be pruned or counted in this cycle
/// - The decision is consistent within one evaluation cycle, not exact to the millisecond
///
/// **Pruning is unconditional:**
/// - It bounds the size of the log over time
/// - It is idempotent; a prune that failed or timed out is simply redone next call
///
/// # Examples
///
/// ```
/// use backstop::{CollectionName, ManualClock, ThrottleDecision, ThrottlingConfiguration};
/// use backstop::{EventRecorder, WindowEvaluator};
/// use backstop::local::LocalOrderedStore;
///
/// futures::executor::block_on(async {
///     let store = LocalOrderedStore::new();
///     let clock = ManualClock::new(1_000_000);
///     let log = CollectionName::default();
///
///     let recorder = EventRecorder::new(store.clone(), log.clone(), clock.clone());
///     let evaluator = WindowEvaluator::new(store, log, clock);
///
///     let config = ThrottlingConfiguration {
///         max_error_count: 2,
///         window_size_seconds: 10.0,
///     };
///
///     recorder.record_new().await.unwrap();
///     recorder.record_new().await.unwrap();
///
///     let evaluation = evaluator.evaluate(&config).await.unwrap();
///     assert_eq!(evaluation.decision, ThrottleDecision::Throttle);
///     assert_eq!(evaluation.count, 2);
/// });
/// ```
#[derive(Debug, Clone)]
pub struct WindowEvaluator<S, C = SystemClock> {
    store: S,
    collection: CollectionName,
    clock: C,
}

impl<S, C> WindowEvaluator<S, C>
where
    S: OrderedStore,
    C: Clock,
{
    /// Create an evaluator reading `collection` in `store`.
    pub fn new(store: S, collection: CollectionName, clock: C) -> Self {
        Self {
            store,
            collection,
            clock,
        }
    } // end constructor

    /// The collection this evaluator prunes and counts.
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Validate `configuration`, then prune, count and decide.
    ///
    /// # Errors
    ///
    /// - [`BackstopError::Configuration`] if either field is not strictly positive;
    ///   the store is not contacted
    /// - [`BackstopError::StoreUnavailable`] if the prune or the count fails
    pub async fn evaluate(
        &self,
        configuration: &ThrottlingConfiguration,
    ) -> Result<WindowEvaluation, BackstopError> {
        let policy = configuration.validate()?;
        self.evaluate_policy(&policy).await
    }

    /// Prune, count and decide for an already validated policy.
    pub async fn evaluate_policy(
        &self,
        policy: &WindowPolicy,
    ) -> Result<WindowEvaluation, BackstopError> {
        let now = self.clock.now_ms();
        let lookback = now.saturating_sub(policy.window_size.as_millis());

        let pruned = self
            .store
            .remove_range(
                &self.collection,
                ScoreBound::NegInfinity,
                ScoreBound::Exclusive(lookback),
            )
            .await?;

        let count = self
            .store
            .count_range(
                &self.collection,
                ScoreBound::Inclusive(lookback),
                ScoreBound::PosInfinity,
            )
            .await?;

        let max_error_count = *policy.max_error_count;
        let decision = if count >= max_error_count {
            ThrottleDecision::Throttle
        } else {
            ThrottleDecision::Proceed
        };

        tracing::debug!(
            collection = %self.collection,
            pruned,
            count,
            max_error_count,
            lookback,
            "checked for throttling"
        );

        if decision == ThrottleDecision::Throttle {
            tracing::info!(
                collection = %self.collection,
                count,
                max_error_count,
                window_size_seconds = policy.window_size.as_secs_f64(),
                "failure threshold reached, backing off"
            );
        }

        Ok(WindowEvaluation {
            decision,
            count,
            max_error_count,
            lookback_ms: lookback,
            evaluated_at_ms: now,
        })
    } // end method evaluate_policy
}
