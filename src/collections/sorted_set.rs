// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use redis::{from_redis_value, Value};
use serde::{Deserialize, Serialize};

use super::{CollectionBase, CollectionRepository};
use crate::storage::prefix::KeyPrefix;
use crate::storage::traits::{RepositoryError, SharedExecutor};

/// A sorted set member with its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMember {
    pub member: String,
    pub score: f64,
}

impl ScoredMember {
    pub fn new(member: impl Into<String>, score: f64) -> Self {
        Self {
            member: member.into(),
            score,
        }
    }
}

/// Sorted set adapter. `members` returns ascending score order.
pub struct SortedSetRepository {
    base: CollectionBase,
}

fn unexpected(reply: &Value) -> RepositoryError {
    RepositoryError::UnexpectedReply(format!("expected WITHSCORES reply, got {:?}", reply))
}

fn parse_score(value: &Value) -> Result<f64, RepositoryError> {
    match value {
        Value::Double(score) => Ok(*score),
        other => from_redis_value(other).map_err(|_| unexpected(other)),
    }
}

/// `WITHSCORES` replies are flat `[member, score, ...]` on RESP2 and
/// nested `[[member, score], ...]` on RESP3.
fn parse_scored(reply: &Value) -> Result<Vec<ScoredMember>, RepositoryError> {
    let items = match reply {
        Value::Nil => return Ok(Vec::new()),
        Value::Array(items) => items,
        other => return Err(unexpected(other)),
    };

    if items.iter().all(|item| matches!(item, Value::Array(_))) {
        return items
            .iter()
            .map(|item| match item {
                Value::Array(pair) if pair.len() == 2 => Ok(ScoredMember {
                    member: from_redis_value(&pair[0]).map_err(|_| unexpected(item))?,
                    score: parse_score(&pair[1])?,
                }),
                other => Err(unexpected(other)),
            })
            .collect();
    }

    if items.len() % 2 != 0 {
        return Err(unexpected(reply));
    }
    items
        .chunks(2)
        .map(|pair| {
            Ok(ScoredMember {
                member: from_redis_value(&pair[0]).map_err(|_| unexpected(reply))?,
                score: parse_score(&pair[1])?,
            })
        })
        .collect()
}

impl SortedSetRepository {
    pub fn new(executor: SharedExecutor, prefix: KeyPrefix) -> Self {
        Self {
            base: CollectionBase::new(executor, prefix),
        }
    }

    /// ZSCORE; None when the member is absent
    pub async fn score(&self, key: &str, member: &str) -> Result<Option<f64>, RepositoryError> {
        let reply = self
            .base
            .run(vec!["ZSCORE".into(), self.base.key(key), member.into()])
            .await?;
        match reply {
            Value::Nil => Ok(None),
            other => parse_score(&other).map(Some),
        }
    }

    /// Members with `min <= score <= max`, ascending.
    pub async fn range_by_score(&self, key: &str, min: f64, max: f64) -> Result<Vec<ScoredMember>, RepositoryError> {
        let reply = self
            .base
            .run(vec![
                "ZRANGEBYSCORE".into(),
                self.base.key(key),
                min.to_string(),
                max.to_string(),
                "WITHSCORES".into(),
            ])
            .await?;
        parse_scored(&reply)
    }
}

#[async_trait]
impl CollectionRepository for SortedSetRepository {
    type Item = ScoredMember;

    /// Inserts or updates the member's score.
    async fn add(&self, key: &str, item: ScoredMember) -> Result<(), RepositoryError> {
        self.base
            .run(vec![
                "ZADD".into(),
                self.base.key(key),
                item.score.to_string(),
                item.member,
            ])
            .await?;
        Ok(())
    }

    async fn members(&self, key: &str) -> Result<Vec<ScoredMember>, RepositoryError> {
        let reply = self
            .base
            .run(vec![
                "ZRANGE".into(),
                self.base.key(key),
                "0".into(),
                "-1".into(),
                "WITHSCORES".into(),
            ])
            .await?;
        parse_scored(&reply)
    }

    /// Removes by member; the score is ignored.
    async fn remove(&self, key: &str, item: &ScoredMember) -> Result<bool, RepositoryError> {
        let removed = self
            .base
            .run_count(vec!["ZREM".into(), self.base.key(key), item.member.clone()])
            .await?;
        Ok(removed > 0)
    }

    async fn len(&self, key: &str) -> Result<u64, RepositoryError> {
        self.base.run_count(vec!["ZCARD".into(), self.base.key(key)]).await
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
    use std::sync::Arc;

    fn repo(executor: &Arc<ScriptedExecutor>) -> SortedSetRepository {
        SortedSetRepository::new(executor.clone(), KeyPrefix::new("lb:"))
    }

    #[tokio::test]
    async fn test_add_formats_score() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Int(1)]));
        repo(&executor).add("scores", ScoredMember::new("alice", 12.5)).await.unwrap();
        assert_eq!(
            executor.last_command().unwrap(),
            tokens(&["ZADD", "lb:scores", "12.5", "alice"])
        );
    }

    #[tokio::test]
    async fn test_members_resp2_flat() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Array(vec![
            bulk("bob"),
            bulk("3"),
            bulk("alice"),
            bulk("12.5"),
        ])]));
        let members = repo(&executor).members("scores").await.unwrap();

        assert_eq!(
            members,
            vec![ScoredMember::new("bob", 3.0), ScoredMember::new("alice", 12.5)]
        );
        assert_eq!(
            executor.last_command().unwrap(),
            tokens(&["ZRANGE", "lb:scores", "0", "-1", "WITHSCORES"])
        );
    }

    #[tokio::test]
    async fn test_members_resp3_nested() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Array(vec![Value::Array(vec![
            bulk("bob"),
            Value::Double(3.0),
        ])])]));
        let members = repo(&executor).members("scores").await.unwrap();
        assert_eq!(members, vec![ScoredMember::new("bob", 3.0)]);
    }

    #[tokio::test]
    async fn test_members_odd_reply_rejected() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Array(vec![bulk("bob")])]));
        assert!(matches!(
            repo(&executor).members("scores").await,
            Err(RepositoryError::UnexpectedReply(_))
        ));
    }

    #[tokio::test]
    async fn test_score_and_range() {
        let executor = Arc::new(ScriptedExecutor::with_replies([
            bulk("7"),
            Value::Nil,
            Value::Array(vec![bulk("carol"), bulk("7")]),
        ]));
        let zset = repo(&executor);

        assert_eq!(zset.score("scores", "carol").await.unwrap(), Some(7.0));
        assert_eq!(zset.score("scores", "dave").await.unwrap(), None);

        let ranged = zset.range_by_score("scores", 5.0, 10.0).await.unwrap();
        assert_eq!(ranged, vec![ScoredMember::new("carol", 7.0)]);
        assert_eq!(
            executor.last_command().unwrap(),
            tokens(&["ZRANGEBYSCORE", "lb:scores", "5", "10", "WITHSCORES"])
        );
    }

    #[tokio::test]
    async fn test_remove_and_len() {
        let executor = Arc::new(ScriptedExecutor::with_replies([Value::Int(1), Value::Int(4)]));
        let zset = repo(&executor);

        assert!(zset.remove("scores", &ScoredMember::new("bob", 0.0)).await.unwrap());
        assert_eq!(zset.len("scores").await.unwrap(), 4);
    }
}
