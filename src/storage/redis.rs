// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis connection - the production [`CommandExecutor`].
//!
//! Wraps a [`ConnectionManager`], which reconnects on its own after a dropped
//! connection. Commands that fail with an I/O, timeout or dropped-connection
//! error are retried with [`RetryConfig::command`]; server errors (bad query
//! syntax, unknown index, wrong type) are returned immediately.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Cmd, RedisError, Value};
use tracing::{debug, info};

use super::traits::{CommandExecutor, RepositoryError};
use crate::config::RedisConfig;
use crate::metrics::{self, CommandTimer};
use crate::resilience::retry::{retry, retry_when, RetryConfig};

#[derive(Clone)]
pub struct RedisConnection {
    connection: ConnectionManager,
    retry: RetryConfig,
}

fn is_transient(err: &RedisError) -> bool {
    err.is_io_error() || err.is_timeout() || err.is_connection_dropped() || err.is_connection_refusal()
}

impl RedisConnection {
    /// Connect using a [`RedisConfig`].
    pub async fn connect(config: &RedisConfig) -> Result<Self, RepositoryError> {
        Self::open(&config.connection_url()).await
    }

    /// Connect to a `redis://` / `rediss://` URL.
    ///
    /// Uses the startup retry preset: fast-fail after a handful of attempts
    /// rather than hanging on a bad address.
    pub async fn open(connection_string: &str) -> Result<Self, RepositoryError> {
        let client = Client::open(connection_string)?;

        let connection = retry("redis_connect", &RetryConfig::startup(), || async {
            ConnectionManager::new(client.clone()).await
        })
        .await?;

        info!(addr = %client.get_connection_info().addr, "Connected to Redis");

        Ok(Self {
            connection,
            retry: RetryConfig::command(),
        })
    }

    /// Override the per-command retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Get a clone of the connection manager (for callers needing raw access)
    pub fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }
}

fn build_cmd(name: &str, args: &[String]) -> Cmd {
    let mut cmd = redis::cmd(name);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

#[async_trait]
impl CommandExecutor for RedisConnection {
    async fn execute(&self, tokens: &[String]) -> Result<Value, RepositoryError> {
        let (name, args) = tokens.split_first().ok_or(RepositoryError::EmptyCommand)?;
        let cmd = build_cmd(name, args);
        let conn = self.connection.clone();

        debug!(command = %name, argc = args.len(), "Executing Redis command");
        let _timer = CommandTimer::new(name.as_str());

        let result = retry_when(
            name,
            &self.retry,
            || {
                let mut conn = conn.clone();
                let cmd = cmd.clone();
                async move { cmd.query_async::<Value>(&mut conn).await }
            },
            is_transient,
        )
        .await;

        match result {
            Ok(value) => {
                metrics::record_command(name, "success");
                Ok(value)
            }
            Err(e) => {
                metrics::record_command(name, "error");
                debug!(command = %name, error = %e, "Redis command failed");
                Err(e.into())
            }
        }
    }
}
