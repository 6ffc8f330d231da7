//! # Redis Repository
//!
//! Typed repositories over Redis: RediSearch queries built from condition
//! trees, CRUD adapters for the native collection types, and a JSON cache.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Condition Trees                         │
//! │  • Condition / ConditionGroup / ConditionBuilder            │
//! │  • Decoded from JSON or built in code                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                    (ConditionCompiler)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      QueryFactory                           │
//! │  • FT.SEARCH find / count                                   │
//! │  • FT.AGGREGATE group + reduce                              │
//! │  • DEL by key list                                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!       SearchRepository / collection adapters / CacheManager
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CommandExecutor                          │
//! │  • RedisConnection (ConnectionManager + retry)              │
//! │  • ScriptedExecutor (in-process, for tests)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use redis_repository::{
//!     Condition, QueryFactory, QuerySpec, RedisConfig, RedisConnection, SearchRepository,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RedisConfig::from_env().expect("Invalid config");
//!     let connection = RedisConnection::connect(&config).await.expect("Failed to connect");
//!
//!     let repo = SearchRepository::new(
//!         Arc::new(connection),
//!         QueryFactory::new(config.query_factory_config()),
//!     );
//!
//!     let adults = QuerySpec::new()
//!         .filter(Condition::gte("age", 18))
//!         .sort_by("age", -1)
//!         .limit(20);
//!
//!     for hit in repo.find(&adults).await.expect("Search failed") {
//!         println!("{} => {:?}", hit.key, hit.fields);
//!     }
//! }
//! ```
//!
//! ## Modules
//!
//! - [`search`]: Condition trees, the query compiler, factory and repository
//! - [`collections`]: Hash, list, set and sorted set adapters
//! - [`cache`]: JSON value cache with prefix-scoped clear
//! - [`storage`]: Command executors and key prefixing
//! - [`resilience`]: Retry with exponential backoff
//! - [`config`]: Connection settings, from struct literals or the environment

pub mod cache;
pub mod collections;
pub mod config;
pub mod metrics;
pub mod resilience;
pub mod search;
pub mod storage;

// Note: We don't expose a `tracing` module to avoid conflict with the tracing crate

pub use cache::CacheManager;
pub use collections::{
    CollectionRepository, HashRepository, ListRepository, ScoredMember, SetRepository,
    SortedSetRepository,
};
pub use config::RedisConfig;
pub use metrics::CommandTimer;
pub use resilience::retry::RetryConfig;
pub use search::{
    Combinator, Condition, ConditionBuilder, ConditionCompiler, ConditionGroup, ConditionNode,
    ConditionValue, Operator, QueryError, QueryFactory, QuerySpec, SearchRepository, WhereClause,
};
pub use storage::{
    CommandExecutor, KeyPrefix, RedisConnection, RepositoryError, ScriptedExecutor, SharedExecutor,
};
