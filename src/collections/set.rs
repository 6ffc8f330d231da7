// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;

use super::{CollectionBase, CollectionRepository};
use crate::storage::prefix::KeyPrefix;
use crate::storage::traits::{RepositoryError, SharedExecutor};

pub struct SetRepository {
    base: CollectionBase,
}

impl SetRepository {
    pub fn new(executor: SharedExecutor, prefix: KeyPrefix) -> Self {
        Self {
            base: CollectionBase::new(executor, prefix),
        }
    }

    /// SISMEMBER
    pub async fn contains(&self, key: &str, member: &str) -> Result<bool, RepositoryError> {
        self.base
            .run_as(vec!["SISMEMBER".into(), self.base.key(key), member.into()])
            .await
    }
}

#[async_trait]
impl CollectionRepository for SetRepository {
    type Item = String;

    async fn add(&self, key: &str, item: String) -> Result<(), RepositoryError> {
        self.base
            .run(vec!["SADD".into(), self.base.key(key), item])
            .await?;
        Ok(())
    }

    /// Redis set order is unspecified.
    async fn members(&self, key: &str) -> Result<Vec<String>, RepositoryError> {
        self.base.run_as(vec!["SMEMBERS".into(), self.base.key(key)]).await
    }

    async fn remove(&self, key: &str, item: &String) -> Result<bool, RepositoryError> {
        let removed = self
            .base
            .run_count(vec!["SREM".into(), self.base.key(key), item.clone()])
            .await?;
        Ok(removed > 0)
    }

    async fn len(&self, key: &str) -> Result<u64, RepositoryError> {
        self.base.run_count(vec!["SCARD".into(), self.base.key(key)]).await
    }

    async fn clear(&self, key: &str) -> Result<bool, RepositoryError> {
        self.base.delete_key(key).await
    }
}
