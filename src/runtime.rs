use std::{future::Future, time::Duration};

/// Run `fut` to completion unless `duration` elapses first.
///
/// Returns `None` on expiry; the future is dropped and may or may not have taken effect.
#[cfg(feature = "redis-tokio")]
pub(crate) async fn with_timeout<F>(duration: Duration, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::time::timeout(duration, fut).await.ok()
}

#[cfg(all(feature = "redis-smol", not(feature = "redis-tokio")))]
pub(crate) async fn with_timeout<F>(duration: Duration, fut: F) -> Option<F::Output>
where
    F: Future,
{
    let timer = smol::Timer::after(duration);

    futures::pin_mut!(fut);
    futures::pin_mut!(timer);

    match futures::future::select(fut, timer).await {
        futures::future::Either::Left((output, _timer)) => Some(output),
        futures::future::Either::Right((_elapsed, _fut)) => None,
    }
}
