// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::sync::Arc;

use async_trait::async_trait;
use redis::Value;
use thiserror::Error;

use crate::search::QueryError;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
    #[error("Refusing to send an empty command")]
    EmptyCommand,
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Sends one command to the store and hands back the raw reply.
///
/// `tokens[0]` is the command name, the rest are its arguments in protocol
/// order. Everything above this trait builds tokens and parses replies;
/// everything below it owns the network.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn execute(&self, tokens: &[String]) -> Result<Value, RepositoryError>;
}

/// Shared handle used by every repository
pub type SharedExecutor = Arc<dyn CommandExecutor>;
