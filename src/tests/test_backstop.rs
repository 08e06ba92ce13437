use std::time::Duration;

use futures::executor::block_on;

use super::support::{clock, collection, config};
use crate::{Backstop, BackstopOptions, ThrottleDecision, local::LocalOrderedStore};

#[test]
fn default_options_use_the_well_known_collection() {
    let backstop = Backstop::new(LocalOrderedStore::new(), BackstopOptions::default());

    assert_eq!(&**backstop.collection(), "rate_limit_error_log");
    assert_eq!(backstop.recorder().collection(), backstop.collection());
    assert_eq!(backstop.evaluator().collection(), backstop.collection());
}

#[test]
fn recorder_and_evaluator_share_the_log() {
    let clock = clock();
    let backstop = Backstop::with_clock(
        LocalOrderedStore::new(),
        BackstopOptions {
            collection: Some(collection("jobs")),
        },
        clock.clone(),
    );
    let config = config(10, 10.0);

    block_on(async {
        let before = backstop.evaluator().evaluate(&config).await.unwrap();
        assert_eq!(before.decision, ThrottleDecision::Proceed);
        assert_eq!(before.count, 0);

        for _ in 0..10 {
            backstop.recorder().record_new().await.unwrap();
        }

        let after = backstop.evaluator().evaluate(&config).await.unwrap();
        assert_eq!(after.decision, ThrottleDecision::Throttle);
        assert_eq!(after.count, 10);

        clock.advance(Duration::from_secs(11));

        let expired = backstop.evaluator().evaluate(&config).await.unwrap();
        assert_eq!(expired.decision, ThrottleDecision::Proceed);
        assert_eq!(expired.count, 0);
    });
}

#[test]
fn reset_clears_the_log() {
    let clock = clock();
    let backstop = Backstop::with_clock(LocalOrderedStore::new(), BackstopOptions::default(), clock);

    block_on(async {
        for _ in 0..3 {
            backstop.recorder().record_new().await.unwrap();
        }
        assert_eq!(backstop.store().len(backstop.collection()), 3);

        backstop.reset().await.unwrap();
        // Resetting twice is harmless.
        backstop.reset().await.unwrap();

        let evaluation = backstop.evaluator().evaluate(&config(1, 10.0)).await.unwrap();
        assert_eq!(evaluation.count, 0);
    });
}

#[test]
fn limiters_with_distinct_collections_are_independent() {
    let store = LocalOrderedStore::new();
    let clock = clock();

    let uploads = Backstop::with_clock(
        store.clone(),
        BackstopOptions {
            collection: Some(collection("uploads")),
        },
        clock.clone(),
    );
    let downloads = Backstop::with_clock(
        store,
        BackstopOptions {
            collection: Some(collection("downloads")),
        },
        clock,
    );

    block_on(async {
        uploads.recorder().record_new().await.unwrap();

        let config = config(1, 10.0);
        assert!(uploads.evaluator().evaluate(&config).await.unwrap().is_throttled());
        assert!(!downloads.evaluator().evaluate(&config).await.unwrap().is_throttled());
    });
}
