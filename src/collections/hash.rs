// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{CollectionBase, CollectionRepository};
use crate::search::parse_pairs;
use crate::storage::prefix::KeyPrefix;
use crate::storage::traits::{RepositoryError, SharedExecutor};

/// Hash adapter. Items are `(field, value)` pairs.
pub struct HashRepository {
    base: CollectionBase,
}

impl HashRepository {
    pub fn new(executor: SharedExecutor, prefix: KeyPrefix) -> Self {
        Self {
            base: CollectionBase::new(executor, prefix),
        }
    }

    /// HGET
    pub async fn get(&self, key: &str, field: &str) -> Result<Option<String>, RepositoryError> {
        self.base
            .run_as(vec!["HGET".into(), self.base.key(key), field.into()])
            .await
    }

    /// HEXISTS
    pub async fn contains(&self, key: &str, field: &str) -> Result<bool, RepositoryError> {
        self.base
            .run_as(vec!["HEXISTS".into(), self.base.key(key), field.into()])
            .await
    }

    /// HGETALL as a map
    pub async fn get_all(&self, key: &str) -> Result<BTreeMap<String, String>, RepositoryError> {
        parse_pairs(&self.base.run(vec!["HGETALL".into(), self.base.key(key)]).await?)
    }
}

#[async_trait]
impl CollectionRepository for HashRepository {
    type Item = (String, String);

    async fn add(&self, key: &str, (field, value): Self::Item) -> Result<(), RepositoryError> {
        self.base
            .run(vec!["HSET".into(), self.base.key(key), field, value])
            .await?;
        Ok(())
    }

    async fn members(&self, key: &str) -> Result<Vec<Self::Item>, RepositoryError> {
        Ok(self.get_all(key).await?.into_iter().collect())
    }

    /// Removes by field; the value half of the item is not compared.
    async fn remove(&self, key: &str, (field, _): &Self::Item) -> Result<bool, RepositoryError> {
        let removed = self
            .base
            .run_count(vec!["HDEL".into(), self.base.key(key), field.clone()])
            .await?;
        Ok(removed > 0)
    }

    async fn len(&self, key: &str) -> Result<u64, RepositoryError> {
        self.base.run_count(vec!["HLEN".into(), self.base.key(key)]).await
    }

    async fn clear(&self, key: &str) -> Result<bool, RepositoryError> {
        self.base.delete_key(key).await
    }
}
