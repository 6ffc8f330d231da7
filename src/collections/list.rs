// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;

use super::{CollectionBase, CollectionRepository};
use crate::storage::prefix::KeyPrefix;
use crate::storage::traits::{RepositoryError, SharedExecutor};

/// List adapter. `add` appends to the tail.
pub struct ListRepository {
    base: CollectionBase,
}

impl ListRepository {
    pub fn new(executor: SharedExecutor, prefix: KeyPrefix) -> Self {
        Self {
            base: CollectionBase::new(executor, prefix),
        }
    }

    pub async fn push_front(&self, key: &str, value: impl Into<String>) -> Result<u64, RepositoryError> {
        self.base
            .run_count(vec!["LPUSH".into(), self.base.key(key), value.into()])
            .await
    }

    pub async fn pop_front(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        self.base.run_as(vec!["LPOP".into(), self.base.key(key)]).await
    }

    pub async fn pop_back(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        self.base.run_as(vec!["RPOP".into(), self.base.key(key)]).await
    }

    /// Inclusive range; negative indexes count from the tail.
    pub async fn range(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, RepositoryError> {
        self.base
            .run_as(vec![
                "LRANGE".into(),
                self.base.key(key),
                start.to_string(),
                stop.to_string(),
            ])
            .await
    }
}

#[async_trait]
impl CollectionRepository for ListRepository {
    type Item = String;

    async fn add(&self, key: &str, item: String) -> Result<(), RepositoryError> {
        self.base
            .run(vec!["RPUSH".into(), self.base.key(key), item])
            .await?;
        Ok(())
    }

    async fn members(&self, key: &str) -> Result<Vec<String>, RepositoryError> {
        self.range(key, 0, -1).await
    }

    /// Removes every occurrence of `item`.
    async fn remove(&self, key: &str, item: &String) -> Result<bool, RepositoryError> {
        let removed = self
            .base
            .run_count(vec!["LREM".into(), self.base.key(key), "0".into(), item.clone()])
            .await?;
        Ok(removed > 0)
    }

    async fn len(&self, key: &str) -> Result<u64, RepositoryError> {
        self.base.run_count(vec!["LLEN".into(), self.base.key(key)]).await
    }

    async fn clear(&self, key: &str) -> Result<bool, RepositoryError> {
        self.base.delete_key(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::test_support::{bulk, tokens};
    use crate::storage::ScriptedExecutor;
    use redis::Value;
    use std::sync::Arc;

    fn repo(executor: &Arc<ScriptedExecutor>) -> ListRepository {
        ListRepository::new(executor.clone(), KeyPrefix::new("q:"))
    }

    #[tokio::test]
    async fn test_add_appends() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Int(1)]));
        repo(&executor).add("jobs", "job-1".into()).await.unwrap();
        assert_eq!(executor.last_command().unwrap(), tokens(&["RPUSH", "q:jobs", "job-1"]));
    }

    #[tokio::test]
    async fn test_members_full_range() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Array(vec![
            bulk("a"),
            bulk("b"),
        ])]));
        let members = repo(&executor).members("jobs").await.unwrap();

        assert_eq!(members, vec!["a", "b"]);
        assert_eq!(executor.last_command().unwrap(), tokens(&["LRANGE", "q:jobs", "0", "-1"]));
    }

    #[tokio::test]
    async fn test_members_missing_key_is_empty() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Array(vec![])]));
        assert!(repo(&executor).members("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_all_occurrences() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Int(0)]));
        let removed = repo(&executor).remove("jobs", &"job-9".to_string()).await.unwrap();

        assert!(!removed);
        assert_eq!(executor.last_command().unwrap(), tokens(&["LREM", "q:jobs", "0", "job-9"]));
    }

    #[tokio::test]
    async fn test_push_and_pop() {
        let executor = Arc::new(ScriptedExecutor::with_replies([
            Value::Int(2),
            bulk("first"),
            Value::Nil,
        ]));
        let list = repo(&executor);

        assert_eq!(list.push_front("jobs", "first").await.unwrap(), 2);
        assert_eq!(list.pop_front("jobs").await.unwrap().as_deref(), Some("first"));
        assert_eq!(list.pop_back("jobs").await.unwrap(), None);
    }
}
