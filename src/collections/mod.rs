// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Repository adapters over native Redis collections.
//!
//! Every adapter implements [`CollectionRepository`] with one native command
//! per operation:
//!
//! ```text
//!               add      members           remove   len     clear
//! hash          HSET     HGETALL           HDEL     HLEN    DEL
//! list          RPUSH    LRANGE 0 -1       LREM 0   LLEN    DEL
//! set           SADD     SMEMBERS          SREM     SCARD   DEL
//! sorted set    ZADD     ZRANGE WITHSCORES ZREM     ZCARD   DEL
//! ```
//!
//! Keys pass through the adapter's [`KeyPrefix`] before they reach Redis.

mod hash;
mod list;
mod set;
mod sorted_set;

pub use hash::HashRepository;
pub use list::ListRepository;
pub use set::SetRepository;
pub use sorted_set::{ScoredMember, SortedSetRepository};

use async_trait::async_trait;
use redis::{from_redis_value, FromRedisValue, Value};
use tracing::trace;

use crate::search::parse_count;
use crate::storage::prefix::KeyPrefix;
use crate::storage::traits::{RepositoryError, SharedExecutor};

/// Uniform CRUD contract over one Redis collection type
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    type Item: Send + Sync;

    /// Insert an item into the collection at `key`
    async fn add(&self, key: &str, item: Self::Item) -> Result<(), RepositoryError>;

    /// Every item of the collection (empty when the key does not exist)
    async fn members(&self, key: &str) -> Result<Vec<Self::Item>, RepositoryError>;

    /// Remove an item; returns whether anything was removed
    async fn remove(&self, key: &str, item: &Self::Item) -> Result<bool, RepositoryError>;

    /// Number of items
    async fn len(&self, key: &str) -> Result<u64, RepositoryError>;

    /// Delete the whole collection; returns whether the key existed
    async fn clear(&self, key: &str) -> Result<bool, RepositoryError>;
}

/// Executor + key prefix shared by the adapters
#[derive(Clone)]
pub(crate) struct CollectionBase {
    executor: SharedExecutor,
    prefix: KeyPrefix,
}

impl CollectionBase {
    pub(crate) fn new(executor: SharedExecutor, prefix: KeyPrefix) -> Self {
        Self { executor, prefix }
    }

    pub(crate) fn key(&self, key: &str) -> String {
        self.prefix.apply(key)
    }

    pub(crate) async fn run(&self, tokens: Vec<String>) -> Result<Value, RepositoryError> {
        trace!(command = ?tokens.first(), "Collection command");
        self.executor.execute(&tokens).await
    }

    pub(crate) async fn run_as<T: FromRedisValue>(&self, tokens: Vec<String>) -> Result<T, RepositoryError> {
        let reply = self.run(tokens).await?;
        from_redis_value(&reply)
            .map_err(|e| RepositoryError::UnexpectedReply(format!("{}: {:?}", e, reply)))
    }

    pub(crate) async fn run_count(&self, tokens: Vec<String>) -> Result<u64, RepositoryError> {
        parse_count(&self.run(tokens).await?)
    }

    pub(crate) async fn delete_key(&self, key: &str) -> Result<bool, RepositoryError> {
        Ok(self.run_count(vec!["DEL".into(), self.key(key)]).await? > 0)
    }
}
