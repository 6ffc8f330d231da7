// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Infrastructure
//!
//! Condition trees compiled to RediSearch queries.
//!
//! # Architecture
//!
//! ```text
//! ConditionNode / ConditionBuilder / resolved wrapper
//!     ↓ WhereClause::resolve
//! ConditionCompiler → query string
//!     ↓
//! QueryFactory → FT.SEARCH / FT.AGGREGATE / DEL tokens
//!     ↓
//! SearchRepository → CommandExecutor → parsed replies
//! ```
//!
//! # Example
//!
//! ```rust
//! use redis_repository::search::{Condition, ConditionNode, QueryFactory, QuerySpec};
//!
//! let factory = QueryFactory::for_index("idx:users");
//! let spec = QuerySpec::new()
//!     .filter(ConditionNode::from(Condition::gte("age", 18)).and(Condition::lt("age", 65)))
//!     .sort_by("age", -1)
//!     .limit(10);
//!
//! let tokens = factory.build_find_query(&spec).unwrap();
//! assert_eq!(tokens[2], "(@age:[18 +inf] AND @age:[-inf (65)])");
//! ```

mod compiler;
mod condition;
mod error;
mod query_factory;
mod reply;
mod repository;

pub use compiler::{ConditionCompiler, MATCH_ALL};
pub use condition::{
    BuildCondition, Combinator, Condition, ConditionBuilder, ConditionGroup, ConditionNode,
    ConditionValue, Operator, Scalar, WhereClause,
};
pub use error::QueryError;
pub use query_factory::{
    QueryFactory, QueryFactoryConfig, QuerySpec, Reducer, ReducerAliases, SortOrder,
    AGGREGATE_COMMAND, DELETE_COMMAND, FIND_COMMAND,
};
pub use reply::{parse_aggregate_reply, parse_search_reply, SearchHit, SearchReply};
pub use repository::SearchRepository;

pub(crate) use reply::{parse_count, parse_pairs};
