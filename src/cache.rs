// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! JSON Value Cache
//!
//! Stores serde-serializable values as JSON strings under a key prefix.
//!
//! ```text
//! set("user:1", &v, ttl)  → SET cache:user:1 <json> [EX secs]
//! get("user:1")           → GET cache:user:1       → Option<T>
//! delete("user:1")        → DEL cache:user:1
//! clear()                 → SCAN MATCH cache:* ... → DEL batch
//! ```
//!
//! `clear` walks the keyspace with `SCAN` rather than `KEYS` so a large cache
//! never blocks the server.

use std::time::Duration;

use redis::{from_redis_value, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::RedisConfig;
use crate::metrics;
use crate::search::parse_count;
use crate::storage::prefix::KeyPrefix;
use crate::storage::traits::{RepositoryError, SharedExecutor};

const SCAN_BATCH: usize = 100;

pub struct CacheManager {
    executor: SharedExecutor,
    prefix: KeyPrefix,
    default_ttl: Option<Duration>,
}

impl CacheManager {
    pub fn new(executor: SharedExecutor, prefix: KeyPrefix) -> Self {
        Self {
            executor,
            prefix,
            default_ttl: None,
        }
    }

    /// Prefix and default TTL from `cache_prefix` / `cache_ttl_secs`
    pub fn from_config(executor: SharedExecutor, config: &RedisConfig) -> Self {
        Self::new(executor, KeyPrefix::new(config.cache_prefix.clone()))
            .with_default_ttl(config.cache_ttl_secs.map(Duration::from_secs))
    }

    #[must_use]
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn prefix(&self) -> &KeyPrefix {
        &self.prefix
    }

    /// Cached value, or None when the key is absent or expired.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let reply = self
            .executor
            .execute(&["GET".to_string(), self.prefix.apply(key)])
            .await?;

        let raw: Option<String> = from_redis_value(&reply)
            .map_err(|e| RepositoryError::UnexpectedReply(format!("{}: {:?}", e, reply)))?;
        metrics::record_cache_lookup(raw.is_some());

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Store `value`; `ttl` overrides the default TTL for this entry.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), RepositoryError> {
        let json = serde_json::to_string(value)?;
        let mut tokens = vec!["SET".to_string(), self.prefix.apply(key), json];

        // EX takes whole seconds, minimum 1
        if let Some(ttl) = ttl.or(self.default_ttl) {
            tokens.push("EX".into());
            tokens.push(ttl.as_secs().max(1).to_string());
        }

        self.executor.execute(&tokens).await?;
        Ok(())
    }

    /// Returns whether the key existed.
    pub async fn delete(&self, key: &str) -> Result<bool, RepositoryError> {
        let reply = self
            .executor
            .execute(&["DEL".to_string(), self.prefix.apply(key)])
            .await?;
        Ok(parse_count(&reply)? > 0)
    }

    /// Delete every key under the prefix; returns the number removed.
    ///
    /// An empty prefix would match the whole database and is rejected.
    pub async fn clear(&self) -> Result<u64, RepositoryError> {
        if self.prefix.is_empty() {
            return Err(RepositoryError::Config(
                "refusing to clear cache without a key prefix".into(),
            ));
        }

        let pattern = self.prefix.pattern();
        let mut cursor = "0".to_string();
        let mut removed = 0u64;

        loop {
            let reply = self
                .executor
                .execute(&[
                    "SCAN".to_string(),
                    cursor.clone(),
                    "MATCH".into(),
                    pattern.clone(),
                    "COUNT".into(),
                    SCAN_BATCH.to_string(),
                ])
                .await?;
            let (next, keys) = parse_scan(&reply)?;

            if !keys.is_empty() {
                let mut tokens = Vec::with_capacity(keys.len() + 1);
                tokens.push("DEL".to_string());
                tokens.extend(keys);
                removed += parse_count(&self.executor.execute(&tokens).await?)?;
            }

            cursor = next;
            if cursor == "0" {
                break;
            }
            debug!(cursor = %cursor, removed, "Cache clear continuing");
        }

        info!(prefix = %self.prefix.as_str(), removed, "Cache cleared");
        Ok(removed)
    }
}

fn parse_scan(reply: &Value) -> Result<(String, Vec<String>), RepositoryError> {
    from_redis_value(reply)
        .map_err(|e| RepositoryError::UnexpectedReply(format!("SCAN: {}: {:?}", e, reply)))
}
