use futures::executor::block_on;

use super::support::{
    CountingStore, FailOn, UnreachableStore, clock, collection, config,
};
use crate::{BackstopError, EventId, EventRecorder, ScoreBound, WindowEvaluator};

#[test]
fn invalid_configuration_never_contacts_the_store() {
    let store = CountingStore::default();
    let evaluator = WindowEvaluator::new(store.clone(), collection("log"), clock());

    let invalid = [
        config(10, 0.0),
        config(10, -10.0),
        config(-1, 10.0),
        config(0, 10.0),
        config(10, f64::NAN),
    ];

    for configuration in invalid {
        let err = block_on(evaluator.evaluate(&configuration)).unwrap_err();
        assert!(
            matches!(err, BackstopError::Configuration(_)),
            "{configuration:?} gave {err:?}"
        );
    }

    assert_eq!(store.calls(), 0);
}

#[test]
fn valid_evaluation_prunes_then_counts() {
    let store = CountingStore::default();
    let evaluator = WindowEvaluator::new(store.clone(), collection("log"), clock());

    block_on(evaluator.evaluate(&config(1, 1.0))).unwrap();

    assert_eq!(store.calls(), 2);
}

#[test]
fn record_surfaces_store_unavailable() {
    let store = UnreachableStore::new(FailOn::Everything);
    let recorder = EventRecorder::new(store.clone(), collection("log"), clock());

    let err = block_on(recorder.record(&EventId::from("job"))).unwrap_err();
    assert!(matches!(err, BackstopError::StoreUnavailable(_)));

    let err = block_on(recorder.record_new()).unwrap_err();
    assert!(matches!(err, BackstopError::StoreUnavailable(_)));
}

#[test]
fn evaluate_surfaces_store_unavailable_from_prune() {
    let store = UnreachableStore::new(FailOn::Everything);
    let evaluator = WindowEvaluator::new(store, collection("log"), clock());

    let err = block_on(evaluator.evaluate(&config(1, 1.0))).unwrap_err();
    assert!(matches!(err, BackstopError::StoreUnavailable(_)));
}

#[test]
fn evaluate_surfaces_store_unavailable_from_count() {
    let store = UnreachableStore::new(FailOn::Count);
    let log = collection("log");
    let clock = clock();
    let recorder = EventRecorder::new(store.clone(), log.clone(), clock.clone());
    let evaluator = WindowEvaluator::new(store.clone(), log.clone(), clock);

    block_on(recorder.record_new()).unwrap();

    let err = block_on(evaluator.evaluate(&config(1, 1.0))).unwrap_err();
    assert!(matches!(err, BackstopError::StoreUnavailable(_)));

    // The prune ran before the failing count and kept the live event.
    let remaining = block_on(crate::OrderedStore::count_range(
        &store.inner,
        &log,
        ScoreBound::NegInfinity,
        ScoreBound::PosInfinity,
    ))
    .unwrap();
    assert_eq!(remaining, 1);
}

#[test]
fn error_messages_name_the_failure() {
    let err = BackstopError::StoreUnavailable("connection refused".to_string());
    assert_eq!(err.to_string(), "store unavailable: connection refused");

    let err = BackstopError::Configuration("Window size must be greater than 0".to_string());
    assert_eq!(
        err.to_string(),
        "configuration error: Window size must be greater than 0"
    );
}
