use std::sync::Arc;

use dashmap::DashMap;

use crate::CollectionName;

/// Maps collection names onto namespaced Redis keys (`<prefix>:<collection>`).
#[derive(Clone, Debug)]
pub(crate) struct RedisKeyGenerator {
    pub prefix: CollectionName,

    // caches
    key_cache: Arc<DashMap<CollectionName, Arc<str>>>,
}

impl RedisKeyGenerator {
    pub(crate) fn new(prefix: CollectionName) -> Self {
        Self {
            prefix,
            key_cache: Arc::new(DashMap::new()),
        }
    }

    pub(crate) fn get_key(&self, collection: &CollectionName) -> Arc<str> {
        match self.key_cache.get(collection) {
            Some(value) => value.clone(),
            None => {
                let value: Arc<str> = Arc::from(format!("{}:{}", self.prefix, collection));
                self.key_cache.insert(collection.clone(), value.clone());

                value
            }
        }
    }
}
