// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::Value;

use super::traits::{CommandExecutor, RepositoryError};

/// In-process executor that records every command and answers from a queue
/// of scripted replies.
///
/// When the queue runs dry it answers `Nil`. Useful for exercising the
/// repositories without a Redis server.
#[derive(Default)]
pub struct ScriptedExecutor {
    replies: Mutex<VecDeque<Value>>,
    commands: Mutex<Vec<Vec<String>>>,
}

impl ScriptedExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a list of replies, served in order
    #[must_use]
    pub fn with_replies(replies: impl IntoIterator<Item = Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, reply: Value) {
        self.replies.lock().push_back(reply);
    }

    /// Every command executed so far, oldest first
    #[must_use]
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.commands.lock().clone()
    }

    /// The most recent command, if any
    #[must_use]
    pub fn last_command(&self) -> Option<Vec<String>> {
        self.commands.lock().last().cloned()
    }

    /// Replies not yet consumed
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.replies.lock().len()
    }
}

#[async_trait]
impl CommandExecutor for ScriptedExecutor {
    async fn execute(&self, tokens: &[String]) -> Result<Value, RepositoryError> {
        if tokens.is_empty() {
            return Err(RepositoryError::EmptyCommand);
        }
        self.commands.lock().push(tokens.to_vec());
        Ok(self.replies.lock().pop_front().unwrap_or(Value::Nil))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_records_commands_in_order() {
        let executor = ScriptedExecutor::new();
        executor.execute(&tokens(&["SET", "a", "1"])).await.unwrap();
        executor.execute(&tokens(&["GET", "a"])).await.unwrap();

        assert_eq!(
            executor.commands(),
            vec![tokens(&["SET", "a", "1"]), tokens(&["GET", "a"])]
        );
        assert_eq!(executor.last_command(), Some(tokens(&["GET", "a"])));
    }

    #[tokio::test]
    async fn test_replies_served_in_order_then_nil() {
        let executor = ScriptedExecutor::with_replies([Value::Okay, Value::Int(7)]);

        assert_eq!(executor.execute(&tokens(&["PING"])).await.unwrap(), Value::Okay);
        assert_eq!(executor.execute(&tokens(&["PING"])).await.unwrap(), Value::Int(7));
        assert_eq!(executor.execute(&tokens(&["PING"])).await.unwrap(), Value::Nil);
        assert_eq!(executor.pending_replies(), 0);
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let executor = ScriptedExecutor::new();
        assert!(matches!(
            executor.execute(&[]).await,
            Err(RepositoryError::EmptyCommand)
        ));
        assert!(executor.commands().is_empty());
    }
}
