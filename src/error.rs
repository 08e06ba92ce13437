/// Error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum BackstopError {
    /// Invalid throttling configuration or store options.
    ///
    /// Always raised before the backing store is contacted.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The backing store could not be reached, rejected a command, or timed out.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

#[cfg(any(feature = "redis-tokio", feature = "redis-smol"))]
impl From<redis::RedisError> for BackstopError {
    fn from(err: redis::RedisError) -> Self {
        Self::StoreUnavailable(format!("redis error: {err}"))
    }
}
