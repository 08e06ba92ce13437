use std::{future::Future, time::Duration};

use async_trait::async_trait;
use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{
    BackstopError, CollectionName, OrderedStore, ScoreBound, redis::RedisKeyGenerator,
    runtime::with_timeout,
};

/// Configuration for [`RedisOrderedStore`].
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use backstop::CollectionName;
/// use backstop::redis::{RedisOrderedStore, RedisOrderedStoreOptions};
///
/// let client = redis::Client::open("redis://127.0.0.1:6379/")?;
/// let connection_manager = client.get_connection_manager().await?;
///
/// let store = RedisOrderedStore::new(RedisOrderedStoreOptions {
///     connection_manager,
///     prefix: Some(CollectionName::try_from("myapp")?), // Keys: myapp:<collection>
///     timeout: Some(Duration::from_millis(250)),
/// })?;
/// ```
#[derive(Clone, Debug)]
pub struct RedisOrderedStoreOptions {
    /// Redis connection manager from the `redis` crate.
    ///
    /// Use `ConnectionManager` for automatic reconnection.
    pub connection_manager: ConnectionManager,

    /// Optional prefix for all Redis keys.
    ///
    /// Collections are stored under `<prefix>:<collection>`.
    /// If `None`, defaults to `"backstop"`.
    pub prefix: Option<CollectionName>,

    /// Upper bound for a single store round-trip.
    ///
    /// On expiry the operation fails with [`BackstopError::StoreUnavailable`] and must
    /// not be assumed to have taken effect. `None` waits for as long as the connection
    /// manager does. A zero duration is rejected.
    pub timeout: Option<Duration>,
}

/// [`OrderedStore`] backed by a Redis sorted set.
///
/// | Operation           | Command            |
/// |---------------------|--------------------|
/// | `insert`            | `ZADD`             |
/// | `remove_range`      | `ZREMRANGEBYSCORE` |
/// | `count_range`       | `ZCOUNT`           |
/// | `delete_collection` | `DEL`              |
///
/// Each command is atomic in Redis; nothing spans more than one command, so any
/// number of processes may record and evaluate against the same collection.
///
/// # Requirements
///
/// - **Runtime:** Tokio or Smol (via `redis-tokio` or `redis-smol` features)
/// - All processes sharing a collection must use clocks that agree on the Unix epoch.
#[derive(Clone, Debug)]
pub struct RedisOrderedStore {
    connection_manager: ConnectionManager,
    key_generator: RedisKeyGenerator,
    timeout: Option<Duration>,
}

impl RedisOrderedStore {
    /// Create a store from `options`.
    pub fn new(options: RedisOrderedStoreOptions) -> Result<Self, BackstopError> {
        if options.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(BackstopError::Configuration(
                "Store timeout must be greater than 0".to_string(),
            ));
        }

        let prefix = options
            .prefix
            .unwrap_or_else(CollectionName::default_prefix);

        Ok(Self {
            connection_manager: options.connection_manager,
            key_generator: RedisKeyGenerator::new(prefix),
            timeout: options.timeout,
        })
    } // end constructor

    /// The Redis key that holds `collection`.
    pub fn key_for(&self, collection: &CollectionName) -> String {
        self.key_generator.get_key(collection).to_string()
    }

    async fn round_trip<T, F>(&self, command: &'static str, fut: F) -> Result<T, BackstopError>
    where
        F: Future<Output = Result<T, redis::RedisError>> + Send,
    {
        bounded_round_trip(command, self.timeout, fut).await
    }
}

/// Await one Redis command, giving up after `timeout`.
///
/// Expiry and command errors both surface as [`BackstopError::StoreUnavailable`]
/// naming `command`.
pub(crate) async fn bounded_round_trip<T, F>(
    command: &'static str,
    timeout: Option<Duration>,
    fut: F,
) -> Result<T, BackstopError>
where
    F: Future<Output = Result<T, redis::RedisError>>,
{
    let result = match timeout {
        None => fut.await,
        Some(timeout) => match with_timeout(timeout, fut).await {
            Some(result) => result,
            None => {
                tracing::debug!(command, ?timeout, "redis.timeout");
                return Err(BackstopError::StoreUnavailable(format!(
                    "{command} timed out after {timeout:?}"
                )));
            }
        },
    };

    result.map_err(|err| {
        tracing::debug!(command, error = ?err, "redis.error");
        BackstopError::StoreUnavailable(format!("{command} failed: {err}"))
    })
}

#[async_trait]
impl OrderedStore for RedisOrderedStore {
    async fn insert(
        &self,
        collection: &CollectionName,
        score: u64,
        member: &str,
    ) -> Result<(), BackstopError> {
        let key = self.key_generator.get_key(collection);
        let mut connection_manager = self.connection_manager.clone();

        let _added: i64 = self
            .round_trip("ZADD", connection_manager.zadd(&*key, member, score))
            .await?;

        Ok(())
    }

    async fn remove_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        let key = self.key_generator.get_key(collection);
        let mut connection_manager = self.connection_manager.clone();

        self.round_trip(
            "ZREMRANGEBYSCORE",
            connection_manager.zrembyscore(&*key, min.to_string(), max.to_string()),
        )
        .await
    }

    async fn count_range(
        &self,
        collection: &CollectionName,
        min: ScoreBound,
        max: ScoreBound,
    ) -> Result<u64, BackstopError> {
        let key = self.key_generator.get_key(collection);
        let mut connection_manager = self.connection_manager.clone();

        self.round_trip(
            "ZCOUNT",
            connection_manager.zcount(&*key, min.to_string(), max.to_string()),
        )
        .await
    }

    async fn delete_collection(&self, collection: &CollectionName) -> Result<(), BackstopError> {
        let key = self.key_generator.get_key(collection);
        let mut connection_manager = self.connection_manager.clone();

        let _deleted: i64 = self
            .round_trip("DEL", connection_manager.del(&*key))
            .await?;

        Ok(())
    }
}
