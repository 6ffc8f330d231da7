// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Command execution backends.
//!
//! - [`redis::RedisConnection`] - real server, retried on transient failures
//! - [`memory::ScriptedExecutor`] - records commands, replays scripted replies

pub mod memory;
pub mod prefix;
pub mod redis;
pub mod traits;

pub use memory::ScriptedExecutor;
pub use prefix::KeyPrefix;
pub use self::redis::RedisConnection;
pub use traits::{CommandExecutor, RepositoryError, SharedExecutor};
